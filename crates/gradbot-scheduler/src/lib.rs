//! # GradBot Scheduler
//!
//! Countdown arithmetic, milestone and reminder state, and the trigger
//! engine that turns them into notifications.
//!
//! ## Architecture
//! ```text
//! Scheduler (tokio tasks + CancellationToken)
//!   ├── daily     → GraduationCalendar → daily summary → milestone check
//!   ├── milestone → MilestoneTracker.check(days_left) → celebration
//!   └── reminder  → ReminderStore.due(now) → mark sent → cleanup policy
//!                      └── Notifier (Discord DM, webhook, log)
//!
//! CommandHandler
//!   └── countdown, milestone, stats, goals, schedule, quote, reminder, study
//! ```

pub mod bot;
pub mod calendar;
pub mod commands;
pub mod cron;
pub mod engine;
pub mod goals;
pub mod messages;
pub mod milestones;
pub mod notify;
pub mod reminders;
pub mod study;

#[cfg(test)]
mod test_support;

pub use bot::{BotStats, GradBot};
pub use calendar::{Countdown, GraduationCalendar, Progress};
pub use commands::{Command, CommandHandler, CommandInvocation, Reply};
pub use engine::{ReminderTickReport, Scheduler, TriggerKind, TriggerStatus};
pub use goals::{Goal, GoalBook};
pub use milestones::{MilestoneProgress, MilestoneTracker, NextMilestone};
pub use notify::{Delivery, NotifyHistory, NotifyRecord};
pub use reminders::{Reminder, ReminderId, ReminderStore};
pub use study::{StudySession, StudyTracker};
