//! ---
//! vire_section: "01-core-functionality"
//! vire_subsection: "module"
//! vire_type: "source"
//! vire_scope: "code"
//! vire_description: "Shared primitives and utilities for the messaging model."
//! vire_version: "v0.0.0-prealpha"
//! vire_owner: "tbd"
//! ---
use chrono::{DateTime, SecondsFormat, Utc};

/// Current UTC instant, used to stamp headers, events and status records.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// RFC 3339 representation with microsecond precision.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Render an optional timestamp, `<none>` when unset.
pub fn format_optional(timestamp: Option<&DateTime<Utc>>) -> String {
    match timestamp {
        Some(ts) => format_timestamp(ts),
        None => "<none>".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_with_micro_precision() {
        let ts = Utc
            .with_ymd_and_hms(2016, 6, 21, 12, 30, 0)
            .single()
            .expect("valid date");
        assert_eq!(format_timestamp(&ts), "2016-06-21T12:30:00.000000Z");
        assert_eq!(format_optional(None), "<none>");
    }
}
