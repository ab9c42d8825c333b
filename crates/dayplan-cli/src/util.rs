use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use dayplan_core::calendar;

/// Parse an instant typed on the command line into wire milliseconds.
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM` in the configured timezone, or a
/// bare `YYYY-MM-DD` (local midnight).
pub fn parse_instant(input: &str, tz: Tz) -> Result<i64> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(instant.with_timezone(&Utc).timestamp_millis());
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M") {
        return local_to_millis(naive, tz, input);
    }

    if let Ok(day) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let naive = day.and_hms_opt(0, 0, 0).expect("midnight is always valid");
        return local_to_millis(naive, tz, input);
    }

    Err(anyhow!(
        "unrecognized instant '{input}': use RFC 3339, 'YYYY-MM-DD HH:MM' or 'YYYY-MM-DD'"
    ))
}

fn local_to_millis(naive: NaiveDateTime, tz: Tz, input: &str) -> Result<i64> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc).timestamp_millis())
        .ok_or_else(|| anyhow!("'{input}' does not exist in timezone {tz}"))
}

/// Parse a `YYYY-MM-DD` day into the wire instant of its local midnight.
pub fn parse_day(input: &str, tz: Tz) -> Result<i64> {
    let (start, _) = calendar::local_day_bounds(input, tz)?;
    Ok(start.timestamp_millis())
}

/// Shortened id for table display.
pub fn short_id(id: &uuid::Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// Render an optional instant for table display, in the user's timezone.
pub fn format_instant(instant: Option<DateTime<Utc>>, tz: Tz) -> String {
    match instant {
        Some(instant) => instant
            .with_timezone(&tz)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_instant_rfc3339() {
        let ms = parse_instant("2025-06-10T08:00:00Z", chrono_tz::UTC).unwrap();
        assert_eq!(ms, 1_749_542_400_000);
    }

    #[test]
    fn test_parse_instant_local() {
        // 08:00 in UTC+7 is 01:00 UTC
        let utc = parse_instant("2025-06-10 08:00", chrono_tz::UTC).unwrap();
        let hcm = parse_instant("2025-06-10 08:00", chrono_tz::Asia::Ho_Chi_Minh).unwrap();
        assert_eq!(utc - hcm, 7 * 3_600 * 1_000);
    }

    #[test]
    fn test_parse_instant_bare_day() {
        let ms = parse_instant("2025-06-10", chrono_tz::UTC).unwrap();
        assert_eq!(ms, parse_day("2025-06-10", chrono_tz::UTC).unwrap());
    }

    #[test]
    fn test_parse_instant_rejects_garbage() {
        assert!(parse_instant("next tuesday", chrono_tz::UTC).is_err());
    }
}
