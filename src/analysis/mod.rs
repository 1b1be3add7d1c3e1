//! Disruption-impact aggregation and journey ranking.
//!
//! Every function in this module is a pure computation over an in-memory
//! snapshot: raw statuses are normalized to a [`Severity`](crate::model::Severity),
//! rolled up per station into KPIs, filtered for alerts, and candidate
//! journeys are validated and ranked for presentation.

pub mod error;
pub mod filter;
pub mod impact;
pub mod journey;
pub mod severity;
pub mod summary;
pub mod utility;

pub use error::MalformedJourney;
pub use filter::{FilteredDisruptions, filter};
pub use impact::{NetworkImpact, NetworkKpis, aggregate};
pub use journey::{JourneyCandidate, RankCriteria, RankOutcome, RejectedJourney, rank, rank_candidates};
pub use severity::normalize;
