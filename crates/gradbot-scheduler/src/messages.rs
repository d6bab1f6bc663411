//! Message catalogue: every notification the bot sends is built here.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use rand::seq::SliceRandom;

use gradbot_core::{HolidayRange, Notification, NotificationKind};

use crate::calendar::{Countdown, Progress};
use crate::goals::Goal;
use crate::milestones::NextMilestone;
use crate::study::StudySession;

const MOTIVATIONS: &[&str] = &[
    "You're closer than you think! 💪",
    "Every day is progress! 🌟",
    "Your future self will thank you! ✨",
    "Champions finish what they start! 🏆",
    "The struggle will be worth it! 💎",
    "You've got this! Keep pushing! 🚀",
    "Success is just around the corner! 🎯",
    "Your dreams are calling! 📞",
    "Excellence is a habit! 🔥",
    "Believe in yourself! You're amazing! 🌈",
];

const QUOTES: &[&str] = &[
    "The future belongs to those who believe in the beauty of their dreams. - Eleanor Roosevelt",
    "Success is not final, failure is not fatal: it is the courage to continue that counts. - Winston Churchill",
    "The only way to do great work is to love what you do. - Steve Jobs",
    "Education is the most powerful weapon which you can use to change the world. - Nelson Mandela",
    "Your limitation is only your imagination.",
    "Push yourself, because no one else is going to do it for you.",
    "Sometimes later becomes never. Do it now.",
    "Great things never come from comfort zones.",
    "Don't stop when you're tired. Stop when you're done.",
    "Wake up with determination. Go to bed with satisfaction.",
];

/// Celebration line for a milestone; unlisted values get a generic line.
pub fn milestone_message(days: i64) -> String {
    let text = match days {
        500 => "Wow! 500 days to go! The journey has begun! 🚀",
        365 => "1 year left! Time to make it count! 📚✨",
        300 => "300 days! You're in the final stretch! 💪",
        250 => "250 days! Can you feel the excitement building? 🎯",
        200 => "200 days! The finish line is getting closer! 🏁",
        150 => "150 days! Time to sprint towards your dreams! 🌟",
        100 => "TRIPLE DIGITS! 100 days to graduation! 🎊",
        75 => "75 days! You can almost taste the freedom! 🎓",
        50 => "50 days! Less than 2 months to go! 🔥",
        30 => "30 days! ONE MONTH LEFT! 🚀",
        25 => "25 days! Christmas countdown vibes! 🎄",
        20 => "20 days! You're so close now! 💫",
        15 => "15 days! Two weeks to freedom! ⚡",
        10 => "10 DAYS! SINGLE DIGITS! 🎉",
        7 => "ONE WEEK LEFT! 7 DAYS! 🌟",
        5 => "5 DAYS! FINAL COUNTDOWN! 🚀",
        3 => "3 DAYS! SO CLOSE! 💥",
        2 => "2 DAYS! TOMORROW'S TOMORROW! ⚡",
        1 => "TOMORROW IS THE DAY! 24 HOURS! 🎊",
        _ => return format!("{days} days left! Keep pushing! 💪"),
    };
    text.to_string()
}

pub fn random_motivation() -> &'static str {
    MOTIVATIONS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(MOTIVATIONS[0])
}

pub fn inspirational_quote() -> &'static str {
    QUOTES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(QUOTES[0])
}

/// "November 21st, 2025"
pub fn format_date_long(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{} {}{}, {}", date.format("%B"), day, suffix, date.year())
}

pub fn daily_summary(countdown: &Countdown, target: NaiveDate, now: DateTime<Utc>) -> Notification {
    Notification::new(
        NotificationKind::DailySummary,
        "🎓 Graduation Countdown 🎓",
        "Here's your daily update on your journey to graduation!",
        now,
    )
    .field("📅 Total Days", format!("**{}** days", countdown.days))
    .field("📚 School Days", format!("**{}** days", countdown.school_days))
    .field("📝 Weeks", format!("**{}** weeks", countdown.weeks))
    .field("🗓️ Months", format!("**{}** months", countdown.months))
    .field("🎯 Target Date", format_date_long(target))
    .field("💪 Progress", "You're getting closer every day!")
    .footer("Keep pushing forward! Your future awaits! ✨")
}

pub fn milestone(days: i64, target: NaiveDate, now: DateTime<Utc>) -> Notification {
    Notification::new(
        NotificationKind::Milestone { days },
        "🎉 MILESTONE ALERT! 🎉",
        &format!("**{days} DAYS LEFT UNTIL GRADUATION!**"),
        now,
    )
    .field("🎯 Achievement Unlocked!", format!("{days} days milestone reached!"))
    .field("💫 Motivation", milestone_message(days))
    .field("📅 Graduation Date", format_date_long(target))
    .field("🔥 Keep Going!", "You're amazing! 🌟")
    .footer("Special milestone celebration! 🎊")
}

pub fn reminder(message: &str, now: DateTime<Utc>) -> Notification {
    Notification::new(NotificationKind::Reminder, "⏰ Reminder!", message, now)
}

pub fn study_started(
    session: &StudySession,
    session_number: usize,
    offset: FixedOffset,
) -> Notification {
    let fmt = |t: DateTime<Utc>| t.with_timezone(&offset).format("%H:%M").to_string();
    Notification::new(
        NotificationKind::Info,
        "📚 Study Session Started!",
        &format!(
            "Study timer set for **{} minutes**\n\nGood luck with your studies! 🍀",
            session.duration_minutes
        ),
        session.start_time,
    )
    .field("⏰ Start Time", fmt(session.start_time))
    .field("🏁 End Time", fmt(session.end_time))
    .field("📊 Session #", session_number.to_string())
}

pub fn study_complete(minutes: u32, now: DateTime<Utc>) -> Notification {
    Notification::new(
        NotificationKind::StudyComplete { minutes },
        "🎉 Study Session Complete!",
        &format!(
            "Your {minutes}-minute study session is finished!\n\nTime for a well-deserved break! 🌟"
        ),
        now,
    )
}

pub fn progress(progress: &Progress, now: DateTime<Utc>) -> Notification {
    Notification::new(
        NotificationKind::Info,
        "📊 Your Progress",
        &format!(
            "Progress: {}%\n`{}`\n\nYou've conquered {} days already! 🎯",
            progress.percentage, progress.bar, progress.completed_days
        ),
        now,
    )
}

pub fn motivation(now: DateTime<Utc>) -> Notification {
    Notification::new(NotificationKind::Info, "💪 Daily Motivation", random_motivation(), now)
}

pub fn celebration(now: DateTime<Utc>) -> Notification {
    Notification::new(
        NotificationKind::Info,
        "🎉 Celebration Time!",
        "You deserve to celebrate your progress! 🎊\n\nTake a moment to appreciate how far you've come!\n\n🌟 You're doing amazing! 🌟",
        now,
    )
}

pub fn quote(now: DateTime<Utc>) -> Notification {
    Notification::new(
        NotificationKind::Info,
        "💡 Daily Inspiration",
        &format!("*\"{}\"*", inspirational_quote()),
        now,
    )
}

pub fn next_milestone(next: Option<NextMilestone>, now: DateTime<Utc>) -> Notification {
    let body = match next {
        Some(n) => format!(
            "Your next milestone is **{} days**!\nThat's in {} days.",
            n.threshold, n.days_until
        ),
        None => "You've passed all major milestones! Graduation is almost here! 🎉".to_string(),
    };
    Notification::new(NotificationKind::Info, "🎯 Next Milestone", &body, now)
}

pub fn goals(goals: &[Goal], now: DateTime<Utc>) -> Notification {
    if goals.is_empty() {
        return Notification::new(
            NotificationKind::Info,
            "🎯 Your Goals",
            "📝 No goals set yet! Use `/goals add` to add your first goal.",
            now,
        );
    }
    let list = goals
        .iter()
        .map(|g| format!("{} {}", if g.completed { "✅" } else { "⏳" }, g.text))
        .collect::<Vec<_>>()
        .join("\n");
    Notification::new(NotificationKind::Info, "🎯 Your Goals", &list, now)
}

/// `today` is the local calendar date; holidays are listed with days until they start.
pub fn schedule(upcoming: &[HolidayRange], today: NaiveDate, now: DateTime<Utc>) -> Notification {
    let mut text = String::from("📅 **Upcoming School Holidays:**\n\n");
    if upcoming.is_empty() {
        text.push_str("🎉 No more holidays until graduation!");
    } else {
        for h in upcoming {
            text.push_str(&format!(
                "🏖️ {} - {} ({} days away)\n",
                h.start.format("%d/%m/%Y"),
                h.end.format("%d/%m/%Y"),
                (h.start - today).num_days()
            ));
        }
    }
    Notification::new(NotificationKind::Info, "🗓️ School Schedule", &text, now)
}

/// Summary numbers for the stats embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSummary {
    pub days: i64,
    pub school_days: u32,
    pub goals_completed: usize,
    pub goals_total: usize,
    pub study_sessions: usize,
    pub study_minutes: u64,
    pub average_minutes: u64,
}

pub fn stats(s: &StatsSummary, now: DateTime<Utc>) -> Notification {
    Notification::new(NotificationKind::Info, "📊 Graduation Statistics", "", now)
        .field("📅 Total Days Remaining", s.days.to_string())
        .field("📚 School Days Remaining", s.school_days.to_string())
        .field(
            "🎯 Goals Completed",
            format!("{}/{}", s.goals_completed, s.goals_total),
        )
        .field("📖 Study Sessions", s.study_sessions.to_string())
        .field(
            "⏱️ Total Study Time",
            format!("{}h {}m", s.study_minutes / 60, s.study_minutes % 60),
        )
        .field("📈 Avg Session Length", format!("{} minutes", s.average_minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_milestone_message_known_and_fallback() {
        assert!(milestone_message(100).contains("TRIPLE DIGITS"));
        assert_eq!(milestone_message(42), "42 days left! Keep pushing! 💪");
    }

    #[test]
    fn test_format_date_long_ordinals() {
        assert_eq!(format_date_long(date(2025, 11, 21)), "November 21st, 2025");
        assert_eq!(format_date_long(date(2025, 11, 12)), "November 12th, 2025");
        assert_eq!(format_date_long(date(2025, 3, 2)), "March 2nd, 2025");
        assert_eq!(format_date_long(date(2025, 3, 23)), "March 23rd, 2025");
    }

    #[test]
    fn test_random_picks_come_from_catalogue() {
        for _ in 0..20 {
            assert!(MOTIVATIONS.contains(&random_motivation()));
            assert!(QUOTES.contains(&inspirational_quote()));
        }
    }

    #[test]
    fn test_daily_summary_fields() {
        let c = Countdown {
            days: 30,
            weeks: 4,
            months: 1,
            school_days: 20,
        };
        let n = daily_summary(&c, date(2025, 11, 21), Utc::now());
        assert_eq!(n.kind, NotificationKind::DailySummary);
        assert_eq!(n.fields.len(), 6);
        assert_eq!(n.fields[0].1, "**30** days");
        assert_eq!(n.fields[4].1, "November 21st, 2025");
    }

    #[test]
    fn test_milestone_notification_carries_days() {
        let n = milestone(7, date(2025, 11, 21), Utc::now());
        assert_eq!(n.kind, NotificationKind::Milestone { days: 7 });
        assert!(n.body.contains("7 DAYS LEFT"));
    }

    #[test]
    fn test_stats_time_split() {
        let s = StatsSummary {
            days: 10,
            school_days: 6,
            goals_completed: 1,
            goals_total: 3,
            study_sessions: 2,
            study_minutes: 95,
            average_minutes: 48,
        };
        let n = stats(&s, Utc::now());
        let total = n.fields.iter().find(|(k, _)| k.contains("Total Study")).unwrap();
        assert_eq!(total.1, "1h 35m");
    }

    #[test]
    fn test_goals_empty_and_listed() {
        assert!(goals(&[], Utc::now()).body.contains("No goals set yet"));
    }
}
