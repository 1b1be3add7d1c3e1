//! Typed entities shared by the parse boundary, the analysis core and the CLI.
//!
//! Every value here is a snapshot built fresh from an upstream response; none
//! of them is mutated after construction.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Disruption impact level, ordered from least to most severe.
///
/// `Unknown` sorts above `Suspended` so that an unrecognised status is always
/// treated as the worst case when severities are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    GoodService,
    MinorDelays,
    SevereDelays,
    PartClosure,
    Suspended,
    Unknown,
}

impl Severity {
    pub const ALL: [Severity; 6] = [
        Severity::GoodService,
        Severity::MinorDelays,
        Severity::SevereDelays,
        Severity::PartClosure,
        Severity::Suspended,
        Severity::Unknown,
    ];

    /// Returns `true` for anything worse than Good Service.
    pub fn is_disrupted(self) -> bool {
        self > Severity::GoodService
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::GoodService => "Good Service",
            Severity::MinorDelays => "Minor Delays",
            Severity::SevereDelays => "Severe Delays",
            Severity::PartClosure => "Part Closure",
            Severity::Suspended => "Suspended",
            Severity::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Current status of one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStatus {
    pub line_id: String,
    pub line_name: String,
    pub severity: Severity,
    pub disruption_reason: Option<String>,
}

/// A station from the static reference data set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub station_id: String,
    pub name: String,
    pub coordinates: (f64, f64),
    pub served_lines: BTreeSet<String>,
}

/// Worst-case severity for one station, derived from the lines serving it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationImpact {
    pub station_id: String,
    pub worst_severity: Severity,
    /// Lines serving the station that are currently worse than Good Service.
    pub affected_line_ids: BTreeSet<String>,
    /// Lexicographically first line at the worst severity, when disrupted.
    pub reason_line_id: Option<String>,
}

/// Status of one bus route, keyed by route only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusDisruption {
    pub route_id: String,
    pub description: String,
    pub severity: Severity,
}

/// Transport mode of a single journey leg.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Mode {
    Tube,
    Bus,
    Dlr,
    Walking,
    Overground,
    ElizabethLine,
    Other(String),
}

impl Mode {
    /// Maps a TfL mode id such as `"tube"` or `"elizabeth-line"`.
    pub fn from_id(id: &str) -> Self {
        match id.trim().to_ascii_lowercase().as_str() {
            "tube" => Mode::Tube,
            "bus" => Mode::Bus,
            "dlr" => Mode::Dlr,
            "walking" => Mode::Walking,
            "overground" => Mode::Overground,
            "elizabeth-line" => Mode::ElizabethLine,
            other => Mode::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Tube => f.write_str("Tube"),
            Mode::Bus => f.write_str("Bus"),
            Mode::Dlr => f.write_str("DLR"),
            Mode::Walking => f.write_str("Walking"),
            Mode::Overground => f.write_str("Overground"),
            Mode::ElizabethLine => f.write_str("Elizabeth line"),
            Mode::Other(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneyLeg {
    pub mode: Mode,
    pub line_name: Option<String>,
    pub duration_minutes: u32,
    pub from_stop: String,
    pub to_stop: String,
    pub departure: Option<NaiveDateTime>,
    pub arrival: Option<NaiveDateTime>,
    pub disruption: Option<String>,
}

impl JourneyLeg {
    pub fn new(
        mode: Mode,
        line_name: Option<&str>,
        duration_minutes: u32,
        from_stop: &str,
        to_stop: &str,
    ) -> Self {
        JourneyLeg {
            mode,
            line_name: line_name.map(str::to_string),
            duration_minutes,
            from_stop: from_stop.to_string(),
            to_stop: to_stop.to_string(),
            departure: None,
            arrival: None,
            disruption: None,
        }
    }

    /// Two consecutive legs form a change when mode or line differs.
    fn is_change_from(&self, previous: &JourneyLeg) -> bool {
        self.mode != previous.mode || self.line_name != previous.line_name
    }
}

/// One candidate journey between two stations.
///
/// `change_count` is derived from the legs on construction so it always
/// equals the number of adjacent leg pairs that differ in mode or line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneyOption {
    legs: Vec<JourneyLeg>,
    total_duration_minutes: u32,
    change_count: u32,
}

impl JourneyOption {
    pub fn new(legs: Vec<JourneyLeg>, total_duration_minutes: u32) -> Self {
        let change_count = legs
            .windows(2)
            .filter(|pair| pair[1].is_change_from(&pair[0]))
            .count() as u32;

        JourneyOption {
            legs,
            total_duration_minutes,
            change_count,
        }
    }

    pub fn legs(&self) -> &[JourneyLeg] {
        &self.legs
    }

    pub fn total_duration_minutes(&self) -> u32 {
        self.total_duration_minutes
    }

    pub fn change_count(&self) -> u32 {
        self.change_count
    }

    pub fn leg_duration_sum(&self) -> u32 {
        self.legs.iter().map(|leg| leg.duration_minutes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering_is_total() {
        for (i, a) in Severity::ALL.iter().enumerate() {
            for (j, b) in Severity::ALL.iter().enumerate() {
                assert_eq!(a.cmp(b), i.cmp(&j), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_unknown_is_worst() {
        assert!(Severity::Unknown > Severity::Suspended);
        assert_eq!(Severity::ALL.iter().max(), Some(&Severity::Unknown));
    }

    #[test]
    fn test_change_count_mode_switch() {
        let option = JourneyOption::new(
            vec![
                JourneyLeg::new(Mode::Bus, Some("25"), 5, "A", "B"),
                JourneyLeg::new(Mode::Tube, Some("Central"), 5, "B", "C"),
            ],
            10,
        );
        assert_eq!(option.change_count(), 1);
        assert_eq!(option.leg_duration_sum(), 10);
    }

    #[test]
    fn test_change_count_same_mode_different_line() {
        let option = JourneyOption::new(
            vec![
                JourneyLeg::new(Mode::Tube, Some("Victoria"), 4, "A", "B"),
                JourneyLeg::new(Mode::Tube, Some("Jubilee"), 6, "B", "C"),
                JourneyLeg::new(Mode::Tube, Some("Jubilee"), 3, "C", "D"),
            ],
            13,
        );
        assert_eq!(option.change_count(), 1);
    }

    #[test]
    fn test_single_leg_has_no_changes() {
        let option = JourneyOption::new(vec![JourneyLeg::new(Mode::Walking, None, 7, "A", "B")], 7);
        assert_eq!(option.change_count(), 0);
    }

    #[test]
    fn test_mode_from_id() {
        assert_eq!(Mode::from_id("tube"), Mode::Tube);
        assert_eq!(Mode::from_id("Elizabeth-Line"), Mode::ElizabethLine);
        assert_eq!(Mode::from_id("cable-car"), Mode::Other("cable-car".to_string()));
    }
}
