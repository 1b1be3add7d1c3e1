//! Runtime settings.
//!
//! Values come from an optional JSON file, then the environment:
//! ```json
//! {
//!   "api_base": "https://api.tfl.gov.uk",
//!   "line_modes": ["tube", "overground", "dlr", "river-bus"],
//!   "tube_lines": ["bakerloo", "central"]
//! }
//! ```
//! Missing fields fall back to defaults and unknown fields are ignored.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.tfl.gov.uk";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base: String,
    /// TfL `app_key`. Requests go out unauthenticated when unset.
    pub app_key: Option<String>,
    /// Modes whose line statuses feed the summary and alerts.
    pub line_modes: Vec<String>,
    /// Mode whose stop points make up the station reference data.
    pub station_mode: String,
    /// Line ids counted as Tube in the per-mode breakdown.
    pub tube_lines: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_base: DEFAULT_API_BASE.to_string(),
            app_key: None,
            line_modes: ["tube", "overground", "dlr", "river-bus", "elizabeth-line"]
                .map(String::from)
                .to_vec(),
            station_mode: "tube".to_string(),
            tube_lines: [
                "bakerloo",
                "central",
                "circle",
                "district",
                "hammersmith-city",
                "jubilee",
                "metropolitan",
                "northern",
                "piccadilly",
                "victoria",
                "waterloo-city",
            ]
            .map(String::from)
            .to_vec(),
            timeout_secs: 10,
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("failed to read '{path}'"))?;
        Self::from_json(&content).with_context(|| format!("failed to parse '{path}'"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Overrides fields from `TFL_KEY`, `TFL_API_BASE` and `TFL_TIMEOUT_SECS`.
    pub fn with_env(self) -> Result<Self> {
        self.with_vars(|name| std::env::var(name).ok())
    }

    fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(key) = var("TFL_KEY").filter(|k| !k.trim().is_empty()) {
            self.app_key = Some(key);
        }
        if let Some(base) = var("TFL_API_BASE") {
            self.api_base = base;
        }
        if let Some(secs) = var("TFL_TIMEOUT_SECS") {
            self.timeout_secs = secs
                .parse()
                .with_context(|| format!("TFL_TIMEOUT_SECS must be a number, got '{secs}'"))?;
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn tube_line_set(&self) -> HashSet<String> {
        self.tube_lines.iter().cloned().collect()
    }
}
