use crate::model::Severity;

/// Maps a raw upstream status to a [`Severity`].
///
/// Accepts either the `statusSeverityDescription` text or the numeric
/// `statusSeverity` code. Matching ignores case, surrounding whitespace and
/// `-`/`_` separators. Anything unrecognised resolves to
/// [`Severity::Unknown`].
///
/// | Description                                      | Code        | Severity     |
/// |--------------------------------------------------|-------------|--------------|
/// | Good Service, No Issues                          | 10, 18      | GoodService  |
/// | Minor Delays, Reduced Service                    | 9, 7        | MinorDelays  |
/// | Severe Delays                                    | 6           | SevereDelays |
/// | Part Closure, Part Closed, Part Suspended        | 5, 11, 3    | PartClosure  |
/// | Suspended, Closed, Planned Closure, Service Closed, Not Running | 2, 1, 4, 20, 16 | Suspended |
pub fn normalize(raw: &str) -> Severity {
    let key: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            '-' | '_' => ' ',
            c => c.to_ascii_lowercase(),
        })
        .collect();
    let key = key.split_whitespace().collect::<Vec<_>>().join(" ");

    match key.as_str() {
        "good service" | "no issues" | "10" | "18" => Severity::GoodService,
        "minor delays" | "reduced service" | "9" | "7" => Severity::MinorDelays,
        "severe delays" | "6" => Severity::SevereDelays,
        "part closure" | "part closed" | "part suspended" | "5" | "11" | "3" => {
            Severity::PartClosure
        }
        "suspended" | "closed" | "planned closure" | "service closed" | "not running" | "2"
        | "1" | "4" | "20" | "16" => Severity::Suspended,
        _ => Severity::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptions() {
        assert_eq!(normalize("Good Service"), Severity::GoodService);
        assert_eq!(normalize("Minor Delays"), Severity::MinorDelays);
        assert_eq!(normalize("Severe Delays"), Severity::SevereDelays);
        assert_eq!(normalize("Part Closure"), Severity::PartClosure);
        assert_eq!(normalize("Suspended"), Severity::Suspended);
    }

    #[test]
    fn test_formatting_is_ignored() {
        assert_eq!(normalize("  good   service "), Severity::GoodService);
        assert_eq!(normalize("SEVERE_DELAYS"), Severity::SevereDelays);
        assert_eq!(normalize("part-closure"), Severity::PartClosure);
    }

    #[test]
    fn test_numeric_codes() {
        assert_eq!(normalize("10"), Severity::GoodService);
        assert_eq!(normalize("9"), Severity::MinorDelays);
        assert_eq!(normalize("6"), Severity::SevereDelays);
        assert_eq!(normalize("5"), Severity::PartClosure);
        assert_eq!(normalize("20"), Severity::Suspended);
    }

    #[test]
    fn test_unrecognised_is_unknown() {
        assert_eq!(normalize(""), Severity::Unknown);
        assert_eq!(normalize("Special Service"), Severity::Unknown);
        assert_eq!(normalize("42"), Severity::Unknown);
        assert_eq!(normalize("Minor Delays!"), Severity::Unknown);
    }

    #[test]
    fn test_deterministic() {
        for raw in ["Good Service", "weird", "6"] {
            assert_eq!(normalize(raw), normalize(raw));
        }
    }
}
