use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (taken as UTC) and plain `YYYY-MM-DD`.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_formats() {
        assert_eq!(
            parse_datetime("2024-11-01T10:30:00+05:30").unwrap().to_rfc3339(),
            "2024-11-01T05:00:00+00:00"
        );
        assert!(parse_datetime("2024-11-01T10:30").is_some());
        assert_eq!(
            parse_datetime("2024-11-01").unwrap().to_rfc3339(),
            "2024-11-01T00:00:00+00:00"
        );
        assert!(parse_datetime("01/11/2024").is_none());
        assert!(parse_datetime("").is_none());
    }
}
