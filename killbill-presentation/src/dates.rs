use chrono::DateTime;

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Short calendar date in UTC, e.g. `Nov 14, 2023`.
///
/// Timestamps chrono cannot represent are shown as raw milliseconds.
pub fn format_date(millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => millis.to_string(),
    }
}

/// Age of `millis` relative to `now_millis`, falling back to
/// [`format_date`] after a year. Timestamps in the future read as "just now".
pub fn format_relative_date(millis: i64, now_millis: i64) -> String {
    let elapsed = now_millis.saturating_sub(millis);
    let minutes = elapsed / MINUTE_MS;
    let hours = elapsed / HOUR_MS;
    let days = elapsed / DAY_MS;

    if minutes < 1 {
        "just now".to_owned()
    } else if hours < 1 {
        format!("{minutes}m ago")
    } else if days < 1 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else if days / 7 < 4 {
        format!("{}w ago", days / 7)
    } else if days / 30 < 12 {
        format!("{}mo ago", (days / 30).max(1))
    } else {
        format_date(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const NOW: i64 = 1_700_000_000_000;

    #[rstest]
    #[case::epoch(0, "Jan 1, 1970")]
    #[case::single_digit_day(NOW - 400 * DAY_MS, "Oct 10, 2022")]
    #[case::afternoon(NOW, "Nov 14, 2023")]
    fn short_dates(#[case] millis: i64, #[case] expected: &str) {
        assert_eq!(format_date(millis), expected);
    }

    #[test]
    fn unrepresentable_dates_fall_back_to_millis() {
        assert_eq!(format_date(i64::MAX), i64::MAX.to_string());
    }

    #[rstest]
    #[case::seconds(NOW - 30 * 1000, "just now")]
    #[case::future(NOW + HOUR_MS, "just now")]
    #[case::minutes(NOW - 5 * MINUTE_MS, "5m ago")]
    #[case::hours(NOW - 3 * HOUR_MS, "3h ago")]
    #[case::days(NOW - 2 * DAY_MS, "2d ago")]
    #[case::weeks(NOW - 15 * DAY_MS, "2w ago")]
    #[case::four_weeks(NOW - 28 * DAY_MS, "1mo ago")]
    #[case::months(NOW - 45 * DAY_MS, "1mo ago")]
    #[case::over_a_year(NOW - 400 * DAY_MS, "Oct 10, 2022")]
    fn relative_dates(#[case] millis: i64, #[case] expected: &str) {
        assert_eq!(format_relative_date(millis, NOW), expected);
    }
}
