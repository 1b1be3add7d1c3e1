use thiserror::Error;

/// Reasons a candidate journey is rejected before ranking.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedJourney {
    #[error("journey has no legs")]
    EmptyLegs,

    #[error("journey declares {declared} min but its legs sum to {legs_total} min")]
    DurationMismatch { declared: u32, legs_total: u32 },

    #[error("journey could not be decoded: {0}")]
    InvalidPayload(String),
}
