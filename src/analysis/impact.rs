use crate::analysis::utility::pct;
use crate::model::{LineStatus, Severity, Station, StationImpact};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Network-wide summary metrics for one refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkKpis {
    pub total_stations: usize,
    pub affected_stations: usize,
    pub percent_impacted: f64,
    pub total_lines: usize,
    pub disrupted_line_count: usize,
    pub percent_disrupted_lines: f64,
}

/// Per-station impacts plus the KPIs derived from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkImpact {
    pub stations: BTreeMap<String, StationImpact>,
    pub kpis: NetworkKpis,
}

impl NetworkImpact {
    pub fn station(&self, station_id: &str) -> Option<&StationImpact> {
        self.stations.get(station_id)
    }
}

/// Collapses a line snapshot into `line_id -> severity`.
///
/// If a line id appears more than once the worst severity is kept.
pub fn severity_map(lines: &[LineStatus]) -> HashMap<String, Severity> {
    let mut map: HashMap<String, Severity> = HashMap::new();
    for line in lines {
        map.entry(line.line_id.clone())
            .and_modify(|s| *s = (*s).max(line.severity))
            .or_insert(line.severity);
    }
    map
}

/// Computes the worst severity at every station and the network KPIs.
///
/// A station whose lines are all missing from `line_statuses` is reported
/// with Good Service and does not count as affected. Stations sharing an id
/// are counted once, the later entry winning.
pub fn aggregate(stations: &[Station], line_statuses: &HashMap<String, Severity>) -> NetworkImpact {
    let mut impacts = BTreeMap::new();

    for station in stations {
        impacts.insert(station.station_id.clone(), station_impact(station, line_statuses));
    }

    let total_stations = impacts.len();
    let affected_stations = impacts
        .values()
        .filter(|impact| impact.worst_severity.is_disrupted())
        .count();

    let total_lines = line_statuses.len();
    let disrupted_line_count = line_statuses.values().filter(|s| s.is_disrupted()).count();

    NetworkImpact {
        stations: impacts,
        kpis: NetworkKpis {
            total_stations,
            affected_stations,
            percent_impacted: pct(affected_stations, total_stations),
            total_lines,
            disrupted_line_count,
            percent_disrupted_lines: pct(disrupted_line_count, total_lines),
        },
    }
}

fn station_impact(station: &Station, line_statuses: &HashMap<String, Severity>) -> StationImpact {
    let mut worst_severity = Severity::GoodService;
    let mut reason_line_id: Option<&String> = None;
    let mut affected_line_ids = BTreeSet::new();

    // served_lines is a BTreeSet, so the first line seen at a severity is
    // also the lexicographically smallest.
    for line_id in &station.served_lines {
        let Some(&severity) = line_statuses.get(line_id) else {
            continue;
        };

        if severity.is_disrupted() {
            affected_line_ids.insert(line_id.clone());
        }

        if severity > worst_severity {
            worst_severity = severity;
            reason_line_id = Some(line_id);
        }
    }

    StationImpact {
        station_id: station.station_id.clone(),
        worst_severity,
        affected_line_ids,
        reason_line_id: reason_line_id.cloned(),
    }
}
