//! Parse boundary between raw TfL JSON and the typed model.
//!
//! Payloads are deserialized into strict wire structs first: unknown fields
//! are ignored and missing required fields are rejected. Only then are they
//! converted into [`crate::model`] entities. Journeys are rejected one at a
//! time; the other payloads fail as a whole.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::analysis::error::MalformedJourney;
use crate::analysis::journey::JourneyCandidate;
use crate::analysis::severity::normalize;
use crate::model::{BusDisruption, JourneyLeg, JourneyOption, LineStatus, Mode, Severity, Station};

const METRO_STATION: &str = "NaptanMetroStation";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLine {
    id: String,
    name: String,
    #[serde(default)]
    line_statuses: Vec<RawLineStatus>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLineStatus {
    status_severity_description: String,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStopPoints {
    stop_points: Vec<RawStopPoint>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStopPoint {
    naptan_id: Option<String>,
    #[serde(default)]
    common_name: String,
    #[serde(default)]
    stop_type: String,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    lines: Vec<RawIdentifier>,
}

#[derive(Deserialize)]
struct RawIdentifier {
    id: String,
}

#[derive(Deserialize)]
struct RawJourneys {
    journeys: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawJourney {
    duration: u32,
    legs: Vec<RawLeg>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLeg {
    duration: u32,
    mode: RawIdentifier,
    #[serde(default)]
    route_options: Vec<RawRouteOption>,
    departure_point: RawPoint,
    arrival_point: RawPoint,
    departure_time: Option<NaiveDateTime>,
    arrival_time: Option<NaiveDateTime>,
    #[serde(default)]
    disruptions: Vec<RawDisruption>,
}

#[derive(Deserialize)]
struct RawRouteOption {
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPoint {
    common_name: String,
}

#[derive(Deserialize)]
struct RawDisruption {
    #[serde(default)]
    description: String,
}

/// Worst normalized status of a line, with the reason attached to it.
///
/// A line with no statuses is reported as Good Service.
fn worst_status(line: &RawLine) -> (Severity, Option<&RawLineStatus>) {
    let mut worst: (Severity, Option<&RawLineStatus>) = (Severity::GoodService, None);

    for status in &line.line_statuses {
        let severity = normalize(&status.status_severity_description);
        if severity == Severity::Unknown {
            warn!(
                line_id = %line.id,
                status = %status.status_severity_description,
                "Unrecognised line status, treating as Unknown"
            );
        }
        if worst.1.is_none() || severity > worst.0 {
            worst = (severity, Some(status));
        }
    }

    worst
}

fn non_empty(text: Option<&str>) -> Option<String> {
    text.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
}

/// Parses a `/Line/Mode/{modes}/Status` response.
///
/// # Errors
///
/// Returns an error if the body is not a JSON array of lines carrying `id`
/// and `name`.
pub fn parse_line_statuses(bytes: &[u8]) -> Result<Vec<LineStatus>> {
    let raw: Vec<RawLine> = serde_json::from_slice(bytes).context("invalid line status payload")?;

    Ok(raw
        .iter()
        .map(|line| {
            let (severity, status) = worst_status(line);
            LineStatus {
                line_id: line.id.clone(),
                line_name: line.name.clone(),
                severity,
                disruption_reason: non_empty(status.and_then(|s| s.reason.as_deref())),
            }
        })
        .collect())
}

/// Parses a `/Line/Mode/bus/Status` response into per-route entries.
///
/// The route is keyed by its public name; the description is the reason
/// text when present, otherwise the status description.
pub fn parse_bus_disruptions(bytes: &[u8]) -> Result<Vec<BusDisruption>> {
    let raw: Vec<RawLine> = serde_json::from_slice(bytes).context("invalid bus status payload")?;

    Ok(raw
        .iter()
        .map(|line| {
            let (severity, status) = worst_status(line);
            let description = status
                .and_then(|s| non_empty(s.reason.as_deref()))
                .or_else(|| status.map(|s| s.status_severity_description.clone()))
                .unwrap_or_else(|| Severity::GoodService.label().to_string());
            BusDisruption {
                route_id: line.name.clone(),
                description,
                severity,
            }
        })
        .collect())
}

/// Parses a `/StopPoint/Mode/{mode}` response into metro stations.
///
/// Stop points that are not metro stations, or lack an id or coordinates,
/// are skipped.
pub fn parse_stop_points(bytes: &[u8]) -> Result<Vec<Station>> {
    let raw: RawStopPoints = serde_json::from_slice(bytes).context("invalid stop point payload")?;

    let stations: Vec<Station> = raw
        .stop_points
        .into_iter()
        .filter(|stop| stop.stop_type == METRO_STATION)
        .filter_map(|stop| {
            let (Some(naptan_id), Some(lat), Some(lon)) = (non_empty(stop.naptan_id.as_deref()), stop.lat, stop.lon)
            else {
                debug!(name = %stop.common_name, "Skipping stop point without id or coordinates");
                return None;
            };

            Some(Station {
                station_id: naptan_id,
                name: stop.common_name,
                coordinates: (lat, lon),
                served_lines: stop.lines.into_iter().map(|l| l.id).collect(),
            })
        })
        .collect();

    debug!(count = stations.len(), "Parsed stations");
    Ok(stations)
}

/// Parses a `/Journey/JourneyResults` response into candidate journeys.
///
/// Each journey is decoded on its own: one that is missing required fields
/// becomes a [`MalformedJourney::InvalidPayload`] entry at its position
/// while its siblings still decode. Decoded candidates are not validated
/// here; see [`crate::analysis::journey::validate`].
///
/// # Errors
///
/// Returns an error only if the body has no `journeys` array.
pub fn parse_journeys(bytes: &[u8]) -> Result<Vec<JourneyCandidate>> {
    let raw: RawJourneys = serde_json::from_slice(bytes).context("invalid journey payload")?;

    Ok(raw
        .journeys
        .into_iter()
        .enumerate()
        .map(|(index, value)| -> JourneyCandidate {
            let journey: RawJourney = serde_json::from_value(value).map_err(|e| {
                warn!(index, error = %e, "Skipping undecodable journey");
                MalformedJourney::InvalidPayload(e.to_string())
            })?;
            let legs = journey.legs.into_iter().map(into_leg).collect();
            Ok(JourneyOption::new(legs, journey.duration))
        })
        .collect())
}

fn into_leg(leg: RawLeg) -> JourneyLeg {
    let line_name = leg
        .route_options
        .iter()
        .find_map(|option| non_empty(Some(option.name.as_str())));

    JourneyLeg {
        mode: Mode::from_id(&leg.mode.id),
        line_name,
        duration_minutes: leg.duration,
        from_stop: leg.departure_point.common_name,
        to_stop: leg.arrival_point.common_name,
        departure: leg.departure_time,
        arrival: leg.arrival_time,
        disruption: leg
            .disruptions
            .first()
            .and_then(|d| non_empty(Some(d.description.as_str()))),
    }
}
