use crate::error::{CoreError, ErrorCategory, ErrorCode};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Convert a wire instant (milliseconds since the Unix epoch) to UTC.
pub fn from_millis(ms: i64) -> Result<DateTime<Utc>, CoreError> {
    DateTime::<Utc>::from_timestamp_millis(ms).ok_or_else(|| {
        CoreError::validation(
            ErrorCategory::Internal,
            ErrorCode::InvalidDateFormat,
            format!("instant out of range: {ms}"),
        )
    })
}

/// Midnight of the calendar day containing `t`, in UTC.
pub fn truncate_to_day(t: DateTime<Utc>) -> DateTime<Utc> {
    t.date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc()
}

/// The last representable instant of the calendar day containing `t`.
pub fn end_of_day(t: DateTime<Utc>) -> DateTime<Utc> {
    t.date_naive()
        .and_hms_nano_opt(23, 59, 59, 999_999_999)
        .expect("end of day is always a valid time")
        .and_utc()
}

/// Both boundaries of the calendar day containing `t`.
pub fn day_bounds(t: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (truncate_to_day(t), end_of_day(t))
}

/// UTC boundaries of a local calendar day, for callers that address days by
/// a `YYYY-MM-DD` string in the user's time zone. The end bound is exclusive
/// (local midnight of the following day).
pub fn local_day_bounds(date: &str, tz: Tz) -> Result<(DateTime<Utc>, DateTime<Utc>), CoreError> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        CoreError::validation(
            ErrorCategory::Internal,
            ErrorCode::InvalidDateFormat,
            "date must be in format yyyy-mm-dd",
        )
    })?;

    let midnight = day.and_hms_opt(0, 0, 0).expect("midnight is always valid");
    // earliest() resolves DST gaps and folds deterministically
    let start_local = tz
        .from_local_datetime(&midnight)
        .earliest()
        .ok_or_else(|| CoreError::InvalidInput(format!("unrepresentable local date: {date}")))?;
    let end_local = start_local + Duration::days(1);

    Ok((
        start_local.with_timezone(&Utc),
        end_local.with_timezone(&Utc),
    ))
}

/// Combine a calendar day with a time-of-day into a UTC instant.
pub fn combine(day: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    day.and_time(time).and_utc()
}

/// Inclusive count of calendar days from `first` through `last`.
pub fn days_spanned(first: DateTime<Utc>, last: DateTime<Utc>) -> i64 {
    (last.date_naive() - first.date_naive()).num_days() + 1
}
