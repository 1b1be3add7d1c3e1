use crate::model::{BusDisruption, LineStatus, Severity};
use serde::Serialize;
use std::collections::HashSet;

/// Line and bus entries that passed the user's selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilteredDisruptions {
    pub lines: Vec<LineStatus>,
    pub buses: Vec<BusDisruption>,
}

impl FilteredDisruptions {
    /// Filtered lines that are worse than Good Service, in input order.
    pub fn alerts(&self) -> impl Iterator<Item = &LineStatus> {
        self.lines.iter().filter(|line| line.severity.is_disrupted())
    }
}

/// Keeps entries at or above `min_severity` whose id is in `selected_lines`.
///
/// An empty `selected_lines` selects every id. Line ids are matched against
/// `line_id` and bus entries against `route_id`. Input order is preserved.
pub fn filter(
    line_statuses: &[LineStatus],
    bus_disruptions: &[BusDisruption],
    selected_lines: &HashSet<String>,
    min_severity: Severity,
) -> FilteredDisruptions {
    let passes = |id: &str, severity: Severity| {
        severity >= min_severity && (selected_lines.is_empty() || selected_lines.contains(id))
    };

    FilteredDisruptions {
        lines: line_statuses
            .iter()
            .filter(|line| passes(&line.line_id, line.severity))
            .cloned()
            .collect(),
        buses: bus_disruptions
            .iter()
            .filter(|bus| passes(&bus.route_id, bus.severity))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filter_returns_everything_in_order() {
        let lines = sample_lines();
        let buses = sample_buses();

        let out = filter(&lines, &buses, &HashSet::new(), Severity::GoodService);

        assert_eq!(out.lines, lines);
        assert_eq!(out.buses, buses);
    }

    #[test]
    fn test_min_severity() {
        let out = filter(
            &sample_lines(),
            &sample_buses(),
            &HashSet::new(),
            Severity::SevereDelays,
        );

        let ids: Vec<_> = out.lines.iter().map(|l| l.line_id.as_str()).collect();
        assert_eq!(ids, vec!["central", "waterloo-city"]);
        let routes: Vec<_> = out.buses.iter().map(|b| b.route_id.as_str()).collect();
        assert_eq!(routes, vec!["25"]);
    }

    #[test]
    fn test_selected_lines() {
        let selected: HashSet<String> = ["victoria", "central", "73"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let out = filter(&sample_lines(), &sample_buses(), &selected, Severity::GoodService);

        let ids: Vec<_> = out.lines.iter().map(|l| l.line_id.as_str()).collect();
        assert_eq!(ids, vec!["central", "victoria"]);
        let routes: Vec<_> = out.buses.iter().map(|b| b.route_id.as_str()).collect();
        assert_eq!(routes, vec!["73"]);
    }

    #[test]
    fn test_selection_and_severity_combined() {
        let selected: HashSet<String> = ["victoria", "central"].iter().map(|s| s.to_string()).collect();

        let out = filter(&sample_lines(), &[], &selected, Severity::MinorDelays);

        assert_eq!(out.lines.len(), 1);
        assert_eq!(out.lines[0].line_id, "central");
        assert!(out.buses.is_empty());
    }

    #[test]
    fn test_alerts_skip_good_service() {
        let out = filter(&sample_lines(), &[], &HashSet::new(), Severity::GoodService);
        let alerts: Vec<_> = out.alerts().map(|l| l.line_id.as_str()).collect();

        assert_eq!(alerts, vec!["central", "northern", "waterloo-city"]);
    }

    // Helper functions for tests
    fn sample_lines() -> Vec<LineStatus> {
        vec![
            line("central", Severity::Suspended),
            line("victoria", Severity::GoodService),
            line("northern", Severity::MinorDelays),
            line("waterloo-city", Severity::Unknown),
        ]
    }

    fn sample_buses() -> Vec<BusDisruption> {
        vec![
            bus("73", Severity::GoodService),
            bus("25", Severity::SevereDelays),
        ]
    }

    fn line(id: &str, severity: Severity) -> LineStatus {
        LineStatus {
            line_id: id.to_string(),
            line_name: id.to_string(),
            severity,
            disruption_reason: None,
        }
    }

    fn bus(route: &str, severity: Severity) -> BusDisruption {
        BusDisruption {
            route_id: route.to_string(),
            description: severity.label().to_string(),
            severity,
        }
    }
}
