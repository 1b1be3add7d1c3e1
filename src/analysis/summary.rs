//! Presentation-side summaries built on top of the core snapshot.

use crate::model::{BusDisruption, JourneyOption, LineStatus, Mode, Severity, Station, StationImpact};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Number of lines at each severity, ordered from Good Service upwards.
///
/// Severities with no lines are omitted.
pub fn severity_summary(lines: &[LineStatus]) -> BTreeMap<Severity, usize> {
    let mut counts = BTreeMap::new();
    for line in lines {
        *counts.entry(line.severity).or_insert(0) += 1;
    }
    counts
}

/// Disrupted-line counts split by whether the line is a Tube line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModeBreakdown {
    pub tube: usize,
    pub other: usize,
}

pub fn disruption_by_mode(lines: &[LineStatus], tube_lines: &HashSet<String>) -> ModeBreakdown {
    lines
        .iter()
        .filter(|line| line.severity.is_disrupted())
        .fold(ModeBreakdown::default(), |mut acc, line| {
            if tube_lines.contains(&line.line_id) {
                acc.tube += 1;
            } else {
                acc.other += 1;
            }
            acc
        })
}

/// Banner styling for a single line status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tone {
    Ok,
    Warning,
    Alert,
}

/// Banner tone for a normalized severity.
///
/// Only Minor Delays is a warning. A closure ("Service Closed", "Closed",
/// "Planned Closure") normalizes to Suspended and is shown as an alert, the
/// same as any other suspension, not with a warning tone.
pub fn tone(severity: Severity) -> Tone {
    match severity {
        Severity::GoodService => Tone::Ok,
        Severity::MinorDelays => Tone::Warning,
        _ => Tone::Alert,
    }
}

/// Looks up each selected id in the full, unfiltered line list.
///
/// Keeps the selection order and drops repeated ids. Ids that match no line
/// are returned with `None`.
pub fn selected_statuses<'a>(
    lines: &'a [LineStatus],
    selected: &'a [String],
) -> Vec<(&'a str, Option<&'a LineStatus>)> {
    let mut seen = HashSet::new();
    selected
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .map(|id| {
            let status = lines.iter().find(|line| line.line_id == *id);
            (id.as_str(), status)
        })
        .collect()
}

/// Bus entries whose route id contains `query`, ignoring case.
pub fn search_bus_routes<'a>(buses: &'a [BusDisruption], query: &str) -> Vec<&'a BusDisruption> {
    let query = query.to_lowercase();
    buses
        .iter()
        .filter(|bus| bus.route_id.to_lowercase().contains(&query))
        .collect()
}

/// Bus entries sorted by route id for tabular display.
pub fn bus_table(buses: &[BusDisruption]) -> Vec<&BusDisruption> {
    let mut rows: Vec<_> = buses.iter().collect();
    rows.sort_by(|a, b| a.route_id.cmp(&b.route_id));
    rows
}

/// Map marker for one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub station_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub color: &'static str,
    pub radius: usize,
}

/// Colours a station by its worst severity and sizes it by line count.
///
/// Stations without served lines are not drawn.
pub fn marker_style(station: &Station, impact: &StationImpact) -> Option<MarkerStyle> {
    if station.served_lines.is_empty() {
        return None;
    }

    let color = match impact.worst_severity {
        Severity::GoodService => "green",
        Severity::MinorDelays => "orange",
        Severity::SevereDelays => "red",
        Severity::PartClosure => "darkred",
        _ => "gray",
    };

    Some(MarkerStyle {
        station_id: station.station_id.clone(),
        name: station.name.clone(),
        lat: station.coordinates.0,
        lon: station.coordinates.1,
        color,
        radius: 5 + station.served_lines.len(),
    })
}

/// First station whose name matches `name`, ignoring case.
pub fn find_station<'a>(stations: &'a [Station], name: &str) -> Option<&'a Station> {
    let name = name.trim();
    stations
        .iter()
        .find(|station| station.name.eq_ignore_ascii_case(name))
}

/// Total minutes spent in each mode, in order of first appearance.
pub fn mode_summary(option: &JourneyOption) -> Vec<(Mode, u32)> {
    let mut totals: Vec<(Mode, u32)> = Vec::new();
    for leg in option.legs() {
        match totals.iter_mut().find(|(mode, _)| *mode == leg.mode) {
            Some((_, minutes)) => *minutes += leg.duration_minutes,
            None => totals.push((leg.mode.clone(), leg.duration_minutes)),
        }
    }
    totals
}

pub fn format_clock(time: Option<NaiveDateTime>) -> String {
    time.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::severity::normalize;
    use crate::model::JourneyLeg;
    use chrono::NaiveDate;

    #[test]
    fn test_severity_summary_counts() {
        let lines = vec![
            line("a", Severity::GoodService),
            line("b", Severity::SevereDelays),
            line("c", Severity::GoodService),
        ];
        let summary = severity_summary(&lines);

        assert_eq!(
            summary.into_iter().collect::<Vec<_>>(),
            vec![(Severity::GoodService, 2), (Severity::SevereDelays, 1)]
        );
    }

    #[test]
    fn test_disruption_by_mode() {
        let tube: HashSet<String> = ["central".to_string()].into_iter().collect();
        let lines = vec![
            line("central", Severity::MinorDelays),
            line("dlr", Severity::PartClosure),
            line("london-overground", Severity::GoodService),
        ];

        assert_eq!(
            disruption_by_mode(&lines, &tube),
            ModeBreakdown { tube: 1, other: 1 }
        );
    }

    #[test]
    fn test_tone() {
        assert_eq!(tone(Severity::GoodService), Tone::Ok);
        assert_eq!(tone(Severity::MinorDelays), Tone::Warning);
        assert_eq!(tone(Severity::Suspended), Tone::Alert);
        assert_eq!(tone(Severity::Unknown), Tone::Alert);
    }

    #[test]
    fn test_service_closed_is_an_alert() {
        assert_eq!(tone(normalize("Service Closed")), Tone::Alert);
        assert_eq!(tone(normalize("Planned Closure")), Tone::Alert);
        assert_eq!(tone(normalize("Minor Delays")), Tone::Warning);
    }

    #[test]
    fn test_selected_statuses_ignore_severity_filter() {
        let lines = vec![
            line("victoria", Severity::SevereDelays),
            line("central", Severity::GoodService),
        ];
        let selected = vec![
            "central".to_string(),
            "waterloo-city".to_string(),
            "central".to_string(),
            "victoria".to_string(),
        ];

        let found: Vec<_> = selected_statuses(&lines, &selected)
            .into_iter()
            .map(|(id, status)| (id, status.map(|s| s.severity)))
            .collect();

        assert_eq!(
            found,
            vec![
                ("central", Some(Severity::GoodService)),
                ("waterloo-city", None),
                ("victoria", Some(Severity::SevereDelays)),
            ]
        );
    }

    #[test]
    fn test_bus_search_and_table() {
        let buses = vec![bus("N25"), bus("25"), bus("73")];

        let found: Vec<_> = search_bus_routes(&buses, "n2").iter().map(|b| b.route_id.as_str()).collect();
        assert_eq!(found, vec!["N25"]);

        let found: Vec<_> = search_bus_routes(&buses, "25").iter().map(|b| b.route_id.as_str()).collect();
        assert_eq!(found, vec!["N25", "25"]);

        let table: Vec<_> = bus_table(&buses).iter().map(|b| b.route_id.as_str()).collect();
        assert_eq!(table, vec!["25", "73", "N25"]);
    }

    #[test]
    fn test_marker_style() {
        let station = station("940GZZLUOXC", "Oxford Circus", &["bakerloo", "central", "victoria"]);
        let marker = marker_style(&station, &impact(&station, Severity::SevereDelays)).unwrap();

        assert_eq!(marker.color, "red");
        assert_eq!(marker.radius, 8);

        let unknown = marker_style(&station, &impact(&station, Severity::Unknown)).unwrap();
        assert_eq!(unknown.color, "gray");

        let bare = self::station("X", "Nowhere", &[]);
        assert!(marker_style(&bare, &impact(&bare, Severity::GoodService)).is_none());
    }

    #[test]
    fn test_find_station() {
        let stations = vec![
            station("1", "Bank", &["central"]),
            station("2", "Oxford Circus", &["central"]),
        ];

        assert_eq!(find_station(&stations, "oxford circus").map(|s| s.station_id.as_str()), Some("2"));
        assert!(find_station(&stations, "Oxford").is_none());
    }

    #[test]
    fn test_mode_summary() {
        let option = JourneyOption::new(
            vec![
                JourneyLeg::new(Mode::Walking, None, 4, "A", "B"),
                JourneyLeg::new(Mode::Tube, Some("Central"), 10, "B", "C"),
                JourneyLeg::new(Mode::Walking, None, 2, "C", "D"),
            ],
            16,
        );

        assert_eq!(mode_summary(&option), vec![(Mode::Walking, 6), (Mode::Tube, 10)]);
    }

    #[test]
    fn test_format_clock() {
        let t = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 5, 0)
            .unwrap();

        assert_eq!(format_clock(Some(t)), "08:05");
        assert_eq!(format_clock(None), "--:--");
    }

    // Helper functions for tests
    fn line(id: &str, severity: Severity) -> LineStatus {
        LineStatus {
            line_id: id.to_string(),
            line_name: id.to_string(),
            severity,
            disruption_reason: None,
        }
    }

    fn bus(route: &str) -> BusDisruption {
        BusDisruption {
            route_id: route.to_string(),
            description: "Good Service".to_string(),
            severity: Severity::GoodService,
        }
    }

    fn station(id: &str, name: &str, lines: &[&str]) -> Station {
        Station {
            station_id: id.to_string(),
            name: name.to_string(),
            coordinates: (51.515, -0.142),
            served_lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    fn impact(station: &Station, worst: Severity) -> StationImpact {
        StationImpact {
            station_id: station.station_id.clone(),
            worst_severity: worst,
            affected_line_ids: Default::default(),
            reason_line_id: None,
        }
    }
}
