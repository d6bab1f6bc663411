//! Lightweight cron expression parser.
//! Supports: "MIN HOUR DOM MON DOW" (5-field, no seconds)
//! Fields: *, */N, N, A-B, A,B,C
//! Example: "0 6 * * *" = every day at 06:00 local time
//!
//! When both DOM and DOW are restricted a day matches if either does,
//! as in standard cron ("0 9 1 * 1" = the 1st and every Monday).
//!
//! Expressions are evaluated in a fixed UTC offset, so "0 6 * * *" with a
//! +10:00 offset fires at 20:00 UTC the previous day.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

/// How far ahead to search before giving up (covers "29 Feb" style specs).
const MAX_LOOKAHEAD_DAYS: i64 = 366 * 4;

/// A parsed 5-field cron expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    minutes: Vec<u32>,
    hours: Vec<u32>,
    days_of_month: Vec<u32>,
    months: Vec<u32>,
    days_of_week: Vec<u32>,
    /// Both day fields were given explicitly, so they are ORed.
    either_day: bool,
}

impl CronSchedule {
    pub fn parse(expression: &str) -> Option<Self> {
        let parts: Vec<&str> = expression.split_whitespace().collect();
        if parts.len() != 5 {
            tracing::warn!(
                "Invalid cron expression: '{}' (need 5 fields: MIN HOUR DOM MON DOW)",
                expression
            );
            return None;
        }

        Some(Self {
            minutes: parse_field(parts[0], 0, 59)?,
            hours: parse_field(parts[1], 0, 23)?,
            days_of_month: parse_field(parts[2], 1, 31)?,
            months: parse_field(parts[3], 1, 12)?,
            // 0 and 7 both mean Sunday.
            days_of_week: parse_field(parts[4], 0, 7)?
                .into_iter()
                .map(|d| d % 7)
                .collect(),
            either_day: !parts[2].starts_with('*') && !parts[4].starts_with('*'),
        })
    }

    /// First matching minute strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>, offset: FixedOffset) -> Option<DateTime<Utc>> {
        let local = after.with_timezone(&offset);
        let start = local.date_naive();

        for day_index in 0..MAX_LOOKAHEAD_DAYS {
            let date = start + Duration::days(day_index);
            if !self.day_matches(date) {
                continue;
            }

            for &h in &self.hours {
                for &m in &self.minutes {
                    let Some(time) = NaiveTime::from_hms_opt(h, m, 0) else {
                        continue;
                    };
                    let Some(candidate) = offset.from_local_datetime(&date.and_time(time)).single()
                    else {
                        continue;
                    };
                    if candidate > local {
                        return Some(candidate.with_timezone(&Utc));
                    }
                }
            }
        }

        None
    }

    fn day_matches(&self, date: NaiveDate) -> bool {
        if !self.months.contains(&date.month()) {
            return false;
        }
        let dom = self.days_of_month.contains(&date.day());
        let dow = self
            .days_of_week
            .contains(&date.weekday().num_days_from_sunday());
        if self.either_day { dom || dow } else { dom && dow }
    }
}

/// Parse a simple cron expression and compute the next run time.
pub fn next_run_from_cron(
    expression: &str,
    after: DateTime<Utc>,
    offset: FixedOffset,
) -> Option<DateTime<Utc>> {
    CronSchedule::parse(expression)?.next_after(after, offset)
}

/// `true` when the expression parses and fires at least once.
pub fn is_valid(expression: &str) -> bool {
    let Some(utc) = FixedOffset::east_opt(0) else {
        return false;
    };
    next_run_from_cron(expression, Utc::now(), utc).is_some()
}

/// Parse a cron field into a sorted list of matching values.
fn parse_field(field: &str, min: u32, max: u32) -> Option<Vec<u32>> {
    let mut values = Vec::new();
    for part in field.split(',') {
        values.extend(parse_part(part.trim(), min, max)?);
    }
    values.sort_unstable();
    values.dedup();
    if values.is_empty() { None } else { Some(values) }
}

fn parse_part(part: &str, min: u32, max: u32) -> Option<Vec<u32>> {
    if part == "*" {
        return Some((min..=max).collect());
    }

    // */N: every N
    if let Some(step) = part.strip_prefix("*/") {
        let n: u32 = step.parse().ok()?;
        if n == 0 {
            return None;
        }
        return Some((min..=max).step_by(n as usize).collect());
    }

    // A-B: inclusive range
    if let Some((lo, hi)) = part.split_once('-') {
        let lo: u32 = lo.parse().ok()?;
        let hi: u32 = hi.parse().ok()?;
        if lo < min || hi > max || lo > hi {
            return None;
        }
        return Some((lo..=hi).collect());
    }

    let n: u32 = part.parse().ok()?;
    if n >= min && n <= max {
        Some(vec![n])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn brisbane() -> FixedOffset {
        FixedOffset::east_opt(10 * 3600).unwrap()
    }

    #[test]
    fn test_every_hour() {
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 10, 30, 0).unwrap();
        let next = next_run_from_cron("0 * * * *", after, utc()).unwrap();
        assert_eq!(next.hour(), 11);
        assert_eq!(next.minute(), 0);
    }

    #[test]
    fn test_every_minute_is_strictly_after() {
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 10, 30, 0).unwrap();
        let next = next_run_from_cron("* * * * *", after, utc()).unwrap();
        assert_eq!(next, after + Duration::minutes(1));

        let mid_minute = Utc.with_ymd_and_hms(2026, 2, 22, 10, 30, 42).unwrap();
        let next = next_run_from_cron("* * * * *", mid_minute, utc()).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 2, 22, 10, 31, 0).unwrap());
    }

    #[test]
    fn test_daily_in_local_offset() {
        // 05:00 Brisbane on the 22nd is 19:00 UTC on the 21st.
        let after = Utc.with_ymd_and_hms(2026, 2, 21, 19, 0, 0).unwrap();
        let next = next_run_from_cron("0 6 * * *", after, brisbane()).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 2, 21, 20, 0, 0).unwrap());

        // Just past 06:00 local rolls to the next day.
        let after = Utc.with_ymd_and_hms(2026, 2, 21, 20, 0, 0).unwrap();
        let next = next_run_from_cron("0 6 * * *", after, brisbane()).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 2, 22, 20, 0, 0).unwrap());
    }

    #[test]
    fn test_every_15_minutes() {
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 10, 2, 0).unwrap();
        let next = next_run_from_cron("*/15 * * * *", after, utc()).unwrap();
        assert_eq!(next.minute(), 15);
    }

    #[test]
    fn test_day_of_week_range() {
        // 2026-02-21 is a Saturday; weekdays only lands on Monday.
        let after = Utc.with_ymd_and_hms(2026, 2, 21, 9, 0, 0).unwrap();
        let next = next_run_from_cron("0 8 * * 1-5", after, utc()).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 2, 23, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_sunday_as_seven() {
        let after = Utc.with_ymd_and_hms(2026, 2, 21, 9, 0, 0).unwrap();
        let next = next_run_from_cron("30 9 * * 7", after, utc()).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 2, 22, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_invalid_expression() {
        let after = Utc::now();
        assert!(next_run_from_cron("bad", after, utc()).is_none());
        assert!(next_run_from_cron("61 * * * *", after, utc()).is_none());
        assert!(next_run_from_cron("*/0 * * * *", after, utc()).is_none());
        assert!(!is_valid("0 25 * * *"));
        assert!(is_valid("0 6 * * *"));
        assert!(!is_valid("0 0 31 2 *"));
    }

    #[test]
    fn test_restricted_dom_and_dow_are_ored() {
        // 2026-02-21 is a Saturday. "The 25th or any Monday" hits Monday the 23rd first.
        let after = Utc.with_ymd_and_hms(2026, 2, 21, 9, 0, 0).unwrap();
        let next = next_run_from_cron("0 9 25 * 1", after, utc()).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 2, 23, 9, 0, 0).unwrap());

        let after = Utc.with_ymd_and_hms(2026, 2, 23, 10, 0, 0).unwrap();
        let next = next_run_from_cron("0 9 25 * 1", after, utc()).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 2, 25, 9, 0, 0).unwrap());

        // With a wildcard DOW only the day of month counts.
        let next = next_run_from_cron("0 9 25 * *", after, utc()).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 2, 25, 9, 0, 0).unwrap());
        let next = next_run_from_cron("0 9 * * 1", after, utc()).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap());
    }
}
