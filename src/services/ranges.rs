//! Calendar-day time windows
//!
//! All boundaries are computed with calendar arithmetic in the caller's time
//! zone, so month and year rollover and daylight-saving transitions come out
//! right. A day's range runs from its first instant to one millisecond before
//! the next day's first instant; on a DST transition day that is 23 or 25
//! hours, not 24.

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::models::TimeRange;

/// Label format for day buckets: unique per day and lexically sortable
pub const DAY_LABEL_FORMAT: &str = "%Y-%m-%d";

/// Number of days in the rolling report window
pub const REPORT_DAYS: u64 = 7;

/// One calendar day in the rolling report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub label: String,
    pub date: NaiveDate,
    pub range: TimeRange,
}

/// Current instant in the given zone
pub fn now_in<Tz: TimeZone>(tz: &Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(tz)
}

/// Convert epoch milliseconds to a zoned date-time
pub fn to_zoned<Tz: TimeZone>(tz: &Tz, epoch_ms: i64) -> Option<DateTime<Tz>> {
    DateTime::from_timestamp_millis(epoch_ms).map(|utc| utc.with_timezone(tz))
}

/// Calendar date an instant falls on in the given zone
pub fn local_date<Tz: TimeZone>(tz: &Tz, epoch_ms: i64) -> Option<NaiveDate> {
    to_zoned(tz, epoch_ms).map(|dt| dt.date_naive())
}

/// First instant of a calendar day
///
/// Usually local midnight. Where a DST gap swallows midnight the day starts
/// at the first local time that exists.
pub fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            (1..=24 * 60).find_map(|minutes| {
                tz.from_local_datetime(&(midnight + Duration::minutes(minutes)))
                    .earliest()
            })
        })
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

/// Full range of one calendar day
pub fn day_range<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> TimeRange {
    let start = start_of_day(tz, date).timestamp_millis();
    let end = date
        .succ_opt()
        .map(|next| start_of_day(tz, next).timestamp_millis() - 1)
        .unwrap_or(i64::MAX);
    TimeRange::ordered(start, end)
}

/// The calendar day containing `now`
pub fn today_range<Tz: TimeZone>(now: &DateTime<Tz>) -> TimeRange {
    day_range(&now.timezone(), now.date_naive())
}

/// From the start of the day six days ago up to the exact instant `now`
///
/// The end is deliberately not day-aligned, so this range does not equal the
/// union of [`last_7_day_buckets`].
pub fn last_7_days_range<Tz: TimeZone>(now: &DateTime<Tz>) -> TimeRange {
    let tz = now.timezone();
    let first_day = days_before(now.date_naive(), REPORT_DAYS - 1);
    TimeRange::ordered(
        start_of_day(&tz, first_day).timestamp_millis(),
        now.timestamp_millis(),
    )
}

/// Seven full-day buckets, oldest first, ending with the day containing `now`
pub fn last_7_day_buckets<Tz: TimeZone>(now: &DateTime<Tz>) -> Vec<DayBucket> {
    let tz = now.timezone();
    let today = now.date_naive();

    (0..REPORT_DAYS)
        .rev()
        .map(|offset| {
            let date = days_before(today, offset);
            DayBucket {
                label: date.format(DAY_LABEL_FORMAT).to_string(),
                date,
                range: day_range(&tz, date),
            }
        })
        .collect()
}

fn days_before(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::{America, Asia, Europe};

    const DAY_MINUS_ONE_MS: i64 = 86_399_999;
    const HOUR_MS: i64 = 3_600_000;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_today_range_covers_one_day() {
        let now = Asia::Kolkata.with_ymd_and_hms(2025, 1, 15, 15, 30, 0).unwrap();
        let range = today_range(&now);

        assert_eq!(range.duration_ms(), DAY_MINUS_ONE_MS);
        assert!(range.contains(now.timestamp_millis()));

        let start = to_zoned(&Asia::Kolkata, range.start()).unwrap();
        assert_eq!(start.date_naive(), ymd(2025, 1, 15));
        assert_eq!((start.hour(), start.minute(), start.second()), (0, 0, 0));

        let end = to_zoned(&Asia::Kolkata, range.end()).unwrap();
        assert_eq!(end.date_naive(), ymd(2025, 1, 15));
        assert_eq!(end.timestamp_subsec_millis(), 999);
    }

    #[test]
    fn test_today_range_at_midnight_and_just_before() {
        let midnight = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let range = today_range(&midnight);
        assert_eq!(range.start(), midnight.timestamp_millis());

        let before = midnight - Duration::milliseconds(1);
        let previous = today_range(&before);
        assert_eq!(previous.end(), before.timestamp_millis());
        assert_eq!(previous.end() + 1, range.start());
    }

    // Across a DST transition the day is an hour shorter or longer; the
    // one-day-minus-a-millisecond identity only holds on ordinary days.
    #[test]
    fn test_today_range_across_dst_transitions() {
        let spring = Europe::Berlin.with_ymd_and_hms(2025, 3, 30, 12, 0, 0).unwrap();
        assert_eq!(today_range(&spring).duration_ms(), DAY_MINUS_ONE_MS - HOUR_MS);

        let autumn = Europe::Berlin.with_ymd_and_hms(2025, 10, 26, 12, 0, 0).unwrap();
        assert_eq!(today_range(&autumn).duration_ms(), DAY_MINUS_ONE_MS + HOUR_MS);

        let ordinary = Europe::Berlin.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap();
        assert_eq!(today_range(&ordinary).duration_ms(), DAY_MINUS_ONE_MS);
    }

    #[test]
    fn test_start_of_day_when_midnight_is_skipped() {
        // Chile springs forward at local midnight
        let date = ymd(2024, 9, 8);
        let start = start_of_day(&America::Santiago, date);

        assert_eq!(start.date_naive(), date);
        assert!(start.hour() < 2);

        let range = day_range(&America::Santiago, date);
        assert!(range.duration_ms() <= DAY_MINUS_ONE_MS);
        assert!(range.duration_ms() >= DAY_MINUS_ONE_MS - HOUR_MS);
    }

    #[test]
    fn test_last_7_days_range_ends_at_now() {
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 18, 45, 12).unwrap();
        let range = last_7_days_range(&now);

        assert_eq!(range.end(), now.timestamp_millis());
        assert_eq!(
            range.start(),
            Utc.with_ymd_and_hms(2025, 1, 9, 0, 0, 0)
                .unwrap()
                .timestamp_millis()
        );
    }

    #[test]
    fn test_buckets_are_seven_contiguous_days() {
        let now = Europe::Berlin.with_ymd_and_hms(2025, 3, 31, 9, 0, 0).unwrap();
        let buckets = last_7_day_buckets(&now);

        assert_eq!(buckets.len(), 7);
        for pair in buckets.windows(2) {
            assert!(pair[0].range.end() < pair[1].range.start());
            assert_eq!(pair[0].range.end() + 1, pair[1].range.start());
        }
        assert_eq!(buckets.last().unwrap().date, now.date_naive());
        assert!(buckets.last().unwrap().range.contains(now.timestamp_millis()));
        // 2025-03-30 is the short day inside this window
        assert_eq!(buckets[5].range.duration_ms(), DAY_MINUS_ONE_MS - HOUR_MS);
    }

    #[test]
    fn test_bucket_labels_roll_over_year_and_sort() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 8, 0, 0).unwrap();
        let labels: Vec<_> = last_7_day_buckets(&now)
            .into_iter()
            .map(|b| b.label)
            .collect();

        assert_eq!(
            labels,
            vec![
                "2024-12-27",
                "2024-12-28",
                "2024-12-29",
                "2024-12-30",
                "2024-12-31",
                "2025-01-01",
                "2025-01-02",
            ]
        );
        let mut sorted = labels.clone();
        sorted.sort();
        assert_eq!(sorted, labels);
    }

    #[test]
    fn test_buckets_start_where_last_7_days_starts() {
        let now = Asia::Kolkata.with_ymd_and_hms(2025, 6, 1, 23, 0, 0).unwrap();
        let buckets = last_7_day_buckets(&now);
        let range = last_7_days_range(&now);

        assert_eq!(buckets[0].range.start(), range.start());
        assert!(buckets[6].range.end() > range.end());
    }

    #[test]
    fn test_local_date_uses_zone() {
        // 20:00 UTC is already the next day in Kolkata (+05:30)
        let ms = Utc
            .with_ymd_and_hms(2025, 1, 15, 20, 0, 0)
            .unwrap()
            .timestamp_millis();
        assert_eq!(local_date(&Utc, ms), Some(ymd(2025, 1, 15)));
        assert_eq!(local_date(&Asia::Kolkata, ms), Some(ymd(2025, 1, 16)));
    }
}
