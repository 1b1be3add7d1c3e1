use anyhow::{Context, Result};
use async_trait::async_trait;
use tfl_pulse::analysis::JourneyCandidate;
use tfl_pulse::config::Settings;
use tfl_pulse::fetch::auth::UrlParam;
use tfl_pulse::fetch::{BasicClient, HttpClient, fetch_bytes};
use tfl_pulse::model::{BusDisruption, LineStatus, Station};
use tfl_pulse::parser::{parse_bus_disruptions, parse_journeys, parse_line_statuses, parse_stop_points};
use tracing::debug;

use crate::services::transit_api::TransitApi;

/// Client for the TfL unified API.
pub struct TflClient {
    base_url: String,
    http: Box<dyn HttpClient>,
}

impl TflClient {
    /// Builds a client from settings, adding the `app_key` parameter when a
    /// key is configured.
    pub fn new(settings: &Settings) -> Result<Self> {
        let basic = BasicClient::new(settings.timeout())?;
        let http: Box<dyn HttpClient> = match &settings.app_key {
            Some(key) => Box::new(UrlParam::app_key(basic, key.clone())),
            None => Box::new(basic),
        };
        Ok(Self::with_client(&settings.api_base, http))
    }

    pub fn with_client(base_url: &str, http: Box<dyn HttpClient>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, path);
        debug!(path, "TfL request");
        fetch_bytes(self.http.as_ref(), &url)
            .await
            .with_context(|| format!("TfL request for '{path}' failed"))
    }
}

#[async_trait]
impl TransitApi for TflClient {
    #[tracing::instrument(skip(self))]
    async fn line_statuses(&self, modes: &[String]) -> Result<Vec<LineStatus>> {
        let bytes = self.get(&format!("/Line/Mode/{}/Status", modes.join(","))).await?;
        parse_line_statuses(&bytes)
    }

    #[tracing::instrument(skip(self))]
    async fn bus_disruptions(&self) -> Result<Vec<BusDisruption>> {
        let bytes = self.get("/Line/Mode/bus/Status").await?;
        parse_bus_disruptions(&bytes)
    }

    #[tracing::instrument(skip(self))]
    async fn stations(&self, mode: &str) -> Result<Vec<Station>> {
        let bytes = self.get(&format!("/StopPoint/Mode/{mode}")).await?;
        parse_stop_points(&bytes)
    }

    #[tracing::instrument(skip(self))]
    async fn journeys(&self, from: &str, to: &str) -> Result<Vec<JourneyCandidate>> {
        let bytes = self
            .get(&format!("/Journey/JourneyResults/{from}/to/{to}"))
            .await?;
        parse_journeys(&bytes)
    }
}
