#[cfg(test)]
mod tests {
    use crate::logging::severity::Severity;
    use std::str::FromStr;

    const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Fatal,
    ];

    #[test]
    fn test_severity_total_order() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn test_labels_are_fixed_width() {
        for severity in ALL {
            assert_eq!(severity.label().len(), 5, "label for {severity}");
        }
        assert_eq!(Severity::Info.label(), "INFO ");
        assert_eq!(Severity::Warning.label(), "WARN ");
    }

    #[test]
    fn test_display_from_str_round_trip() {
        for severity in ALL {
            let parsed = Severity::from_str(&severity.to_string()).unwrap();
            assert_eq!(parsed, severity);
        }
        assert_eq!(Severity::from_str("warn").unwrap(), Severity::Warning);
        assert!(Severity::from_str("TRACE").is_err());
    }

    #[test]
    fn test_severity_serde() {
        let json = serde_json::to_string(&Severity::Fatal).unwrap();
        assert_eq!(json, "\"FATAL\"");
        let parsed: Severity = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(parsed, Severity::Warning);
    }

    #[test]
    fn test_default_is_info() {
        assert_eq!(Severity::default(), Severity::Info);
    }
}
