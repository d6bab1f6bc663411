//! Graduation calendar: days, weeks, months and school days remaining.
//!
//! Pure date arithmetic. The only input that moves is `now`.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use serde::Serialize;

use gradbot_core::config::GraduationConfig;
use gradbot_core::{HolidayRange, Result};

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
const BAR_CELLS: usize = 20;

/// Whole days from `now` until `target`, rounded up. Zero or negative once
/// the target has passed.
pub fn days_until(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (target - now).num_milliseconds();
    -(-ms).div_euclid(MS_PER_DAY)
}

pub fn weeks_until(days: i64) -> i64 {
    days.div_euclid(7)
}

/// Calendar-naive: a month is 30 days.
pub fn months_until(days: i64) -> i64 {
    days.div_euclid(30)
}

/// A weekday that is not inside any holiday range.
pub fn is_school_day(date: NaiveDate, holidays: &[HolidayRange]) -> bool {
    if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    !holidays.iter().any(|h| h.contains(date))
}

/// School days in `[today, target)`.
pub fn school_days_until(target: NaiveDate, today: NaiveDate, holidays: &[HolidayRange]) -> u32 {
    today
        .iter_days()
        .take_while(|d| *d < target)
        .filter(|d| is_school_day(*d, holidays))
        .count() as u32
}

/// Everything the daily summary shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub days: i64,
    pub weeks: i64,
    pub months: i64,
    pub school_days: u32,
}

/// How far along the countdown is, measured from the tracking start.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub percentage: u32,
    pub completed_days: i64,
    pub total_days: i64,
    pub bar: String,
}

/// The graduation target plus the local calendar it is evaluated in.
#[derive(Debug, Clone)]
pub struct GraduationCalendar {
    target: NaiveDate,
    tracking_start: NaiveDate,
    offset: FixedOffset,
    holidays: Vec<HolidayRange>,
}

impl GraduationCalendar {
    pub fn new(
        target: NaiveDate,
        tracking_start: NaiveDate,
        offset: FixedOffset,
        holidays: Vec<HolidayRange>,
    ) -> Self {
        Self {
            target,
            tracking_start,
            offset,
            holidays,
        }
    }

    pub fn from_config(config: &GraduationConfig) -> Result<Self> {
        Ok(Self::new(
            config.date,
            config.tracking_start,
            config.offset()?,
            config.holidays.clone(),
        ))
    }

    pub fn target_date(&self) -> NaiveDate {
        self.target
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn holidays(&self) -> &[HolidayRange] {
        &self.holidays
    }

    /// Local midnight at the start of graduation day, as a UTC instant.
    pub fn target_instant(&self) -> DateTime<Utc> {
        let local = self.target.and_time(NaiveTime::MIN);
        let utc = local - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&utc)
    }

    /// Today's date in the configured local offset.
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    pub fn days_left(&self, now: DateTime<Utc>) -> i64 {
        days_until(self.target_instant(), now)
    }

    pub fn countdown(&self, now: DateTime<Utc>) -> Countdown {
        let days = self.days_left(now);
        Countdown {
            days,
            weeks: weeks_until(days),
            months: months_until(days),
            school_days: school_days_until(self.target, self.local_date(now), &self.holidays),
        }
    }

    pub fn is_school_day(&self, date: NaiveDate) -> bool {
        is_school_day(date, &self.holidays)
    }

    /// Holidays that have not started yet.
    pub fn upcoming_holidays(&self, now: DateTime<Utc>) -> Vec<HolidayRange> {
        let today = self.local_date(now);
        self.holidays
            .iter()
            .filter(|h| h.start > today)
            .copied()
            .collect()
    }

    pub fn progress(&self, now: DateTime<Utc>) -> Progress {
        let total_days = (self.target - self.tracking_start).num_days().max(1);
        let completed_days = (total_days - self.days_left(now)).clamp(0, total_days);
        let percentage = ((completed_days as f64 / total_days as f64) * 100.0).round() as u32;
        Progress {
            percentage,
            completed_days,
            total_days,
            bar: progress_bar(percentage),
        }
    }
}

/// 20-cell bar, one filled cell per 5%.
pub fn progress_bar(percentage: u32) -> String {
    let filled = ((percentage / 5) as usize).min(BAR_CELLS);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_CELLS - filled))
}
