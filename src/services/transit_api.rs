//! Trait for the upstream transit data provider.

use anyhow::Result;
use tfl_pulse::analysis::JourneyCandidate;
use tfl_pulse::model::{BusDisruption, LineStatus, Station};

/// Source of the snapshots the analysis core runs over.
///
/// Implementations own all network I/O; every call returns a fresh,
/// already-parsed snapshot.
#[async_trait::async_trait]
pub trait TransitApi {
    /// Current status of every line in `modes`.
    async fn line_statuses(&self, modes: &[String]) -> Result<Vec<LineStatus>>;

    /// Current status of every bus route.
    async fn bus_disruptions(&self) -> Result<Vec<BusDisruption>>;

    /// Station reference data for `mode`.
    async fn stations(&self, mode: &str) -> Result<Vec<Station>>;

    /// Candidate journeys between two stop ids. Journeys that could not be
    /// decoded come back as per-item errors.
    async fn journeys(&self, from: &str, to: &str) -> Result<Vec<JourneyCandidate>>;
}
