//! Slash commands and buttons.
//!
//! Inbound transport is someone else's job: anything that can produce a
//! `CommandInvocation` (the Discord gateway, the dashboard API) hands it to
//! `CommandHandler::handle` and renders the returned `Reply`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use gradbot_core::{GradBotError, Notification, Result, UserId};

use crate::engine::Scheduler;
use crate::goals::GoalBook;
use crate::messages::{self, StatsSummary};
use crate::study::StudyTracker;

pub const NOT_OWNER_REPLY: &str = "This bot is configured for a specific user only.";
pub const UNKNOWN_COMMAND_REPLY: &str = "Unknown command!";
pub const ERROR_REPLY: &str = "An error occurred while processing your request.";

/// A raw command as received from a chat platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandInvocation {
    pub name: String,
    #[serde(default)]
    pub options: Map<String, Value>,
    /// Who invoked it.
    #[serde(default)]
    pub user_id: UserId,
}

impl CommandInvocation {
    pub fn new(name: &str, user_id: UserId) -> Self {
        Self {
            name: name.to_string(),
            options: Map::new(),
            user_id,
        }
    }

    pub fn option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    fn string(&self, key: &str) -> Option<String> {
        self.options
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn required_string(&self, key: &str) -> Result<String> {
        self.string(key)
            .ok_or_else(|| GradBotError::Command(format!("/{}: missing option '{key}'", self.name)))
    }

    fn integer(&self, key: &str) -> Result<Option<i64>> {
        match self.options.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v.as_i64().map(Some).ok_or_else(|| {
                GradBotError::Command(format!("/{}: option '{key}' must be an integer", self.name))
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalAction {
    Add,
    List,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Countdown,
    Milestone,
    Stats,
    Goals { action: GoalAction, goal: Option<String> },
    Schedule,
    Quote,
    Reminder { message: String, hours: i64 },
    Study { duration: Option<u32> },
    // Buttons
    RefreshCountdown,
    Motivation,
    Progress,
    Celebration,
}

impl Command {
    /// `Ok(None)` for names nobody registered; `Err` for malformed options.
    pub fn parse(invocation: &CommandInvocation) -> Result<Option<Self>> {
        let command = match invocation.name.as_str() {
            "countdown" => Self::Countdown,
            "milestone" => Self::Milestone,
            "stats" => Self::Stats,
            "goals" => {
                let action = match invocation.required_string("action")?.as_str() {
                    "add" => GoalAction::Add,
                    "list" => GoalAction::List,
                    "complete" => GoalAction::Complete,
                    other => {
                        return Err(GradBotError::Command(format!(
                            "/goals: unknown action '{other}'"
                        )));
                    }
                };
                Self::Goals {
                    action,
                    goal: invocation.string("goal"),
                }
            }
            "schedule" => Self::Schedule,
            "quote" => Self::Quote,
            "reminder" => Self::Reminder {
                message: invocation.required_string("message")?,
                hours: invocation.integer("hours")?.ok_or_else(|| {
                    GradBotError::Command("/reminder: missing option 'hours'".into())
                })?,
            },
            "study" => {
                let duration = match invocation.integer("duration")? {
                    None => None,
                    Some(d) => Some(u32::try_from(d).ok().filter(|d| *d > 0).ok_or_else(|| {
                        GradBotError::Command(format!("/study: invalid duration {d}"))
                    })?),
                };
                Self::Study { duration }
            }
            "refresh_countdown" => Self::RefreshCountdown,
            "motivation" => Self::Motivation,
            "progress" => Self::Progress,
            "celebration" => Self::Celebration,
            _ => return Ok(None),
        };
        Ok(Some(command))
    }
}

/// What to send back to the invoker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    Text { content: String, ephemeral: bool },
    Embed { notification: Notification, ephemeral: bool },
}

impl Reply {
    pub fn text(content: impl Into<String>, ephemeral: bool) -> Self {
        Reply::Text {
            content: content.into(),
            ephemeral,
        }
    }

    pub fn embed(notification: Notification, ephemeral: bool) -> Self {
        Reply::Embed {
            notification,
            ephemeral,
        }
    }
}

/// Runs commands against the live bot state. Only `owner` may use it.
#[derive(Clone)]
pub struct CommandHandler {
    scheduler: Arc<Scheduler>,
    goals: Arc<Mutex<GoalBook>>,
    study: Arc<Mutex<StudyTracker>>,
    owner: UserId,
    default_study_minutes: u32,
}

impl CommandHandler {
    pub fn new(
        scheduler: Arc<Scheduler>,
        goals: Arc<Mutex<GoalBook>>,
        study: Arc<Mutex<StudyTracker>>,
        owner: UserId,
        default_study_minutes: u32,
    ) -> Self {
        Self {
            scheduler,
            goals,
            study,
            owner,
            default_study_minutes,
        }
    }

    pub async fn handle(&self, invocation: &CommandInvocation) -> Reply {
        if invocation.user_id != self.owner {
            tracing::debug!("🚫 /{} from non-owner {}", invocation.name, invocation.user_id);
            return Reply::text(NOT_OWNER_REPLY, true);
        }

        let result = match Command::parse(invocation) {
            Ok(Some(command)) => self.execute(command, &invocation.user_id).await,
            Ok(None) => return Reply::text(UNKNOWN_COMMAND_REPLY, true),
            Err(e) => Err(e),
        };

        result.unwrap_or_else(|e| {
            tracing::warn!("⚠️ Command /{} failed: {e}", invocation.name);
            Reply::text(ERROR_REPLY, true)
        })
    }

    pub async fn execute(&self, command: Command, invoker: &UserId) -> Result<Reply> {
        let s = &self.scheduler;
        let now = s.now();
        let calendar = s.calendar();

        let reply = match command {
            Command::Countdown | Command::RefreshCountdown => Reply::embed(
                messages::daily_summary(&calendar.countdown(now), calendar.target_date(), now),
                false,
            ),
            Command::Milestone => {
                let next = s.milestones().lock().await.next(calendar.days_left(now));
                Reply::embed(messages::next_milestone(next, now), false)
            }
            Command::Stats => Reply::embed(messages::stats(&self.stats_summary(now).await, now), false),
            Command::Goals { action, goal } => self.goals_command(action, goal, now).await,
            Command::Schedule => Reply::embed(
                messages::schedule(&calendar.upcoming_holidays(now), calendar.local_date(now), now),
                false,
            ),
            Command::Quote => Reply::embed(messages::quote(now), false),
            Command::Reminder { message, hours } => {
                let reminder = s
                    .reminders()
                    .lock()
                    .await
                    .add(&message, hours, invoker.clone(), now)
                    .ok_or_else(|| {
                        GradBotError::Command(format!("/reminder: {hours} hours is out of range"))
                    })?;
                let at = reminder.fire_at.with_timezone(&calendar.offset()).format("%H:%M");
                Reply::text(
                    format!("⏰ Reminder set! I'll remind you \"{message}\" in {hours} hour(s) at {at}."),
                    true,
                )
            }
            Command::Study { duration } => {
                let minutes = duration.unwrap_or(self.default_study_minutes);
                self.start_study(minutes, invoker, now).await
            }
            Command::Motivation => Reply::embed(messages::motivation(now), true),
            Command::Progress => Reply::embed(messages::progress(&calendar.progress(now), now), true),
            Command::Celebration => Reply::embed(messages::celebration(now), true),
        };
        Ok(reply)
    }

    async fn goals_command(&self, action: GoalAction, goal: Option<String>, now: DateTime<Utc>) -> Reply {
        let mut goals = self.goals.lock().await;
        match (action, goal) {
            (GoalAction::List, _) => Reply::embed(messages::goals(goals.all(), now), false),
            (GoalAction::Add, None) => Reply::text("❌ Please provide a goal description.", true),
            (GoalAction::Complete, None) => {
                Reply::text("❌ Please provide part of the goal text to complete.", true)
            }
            (GoalAction::Add, Some(text)) => {
                goals.add(&text, now);
                Reply::text(format!("✅ Goal added: \"{text}\""), true)
            }
            (GoalAction::Complete, Some(search)) => match goals.complete(&search, now) {
                Some(done) => Reply::text(
                    format!("🎉 Congratulations! Goal completed: \"{}\"", done.text),
                    true,
                ),
                None => Reply::text("❌ Goal not found or already completed.", true),
            },
        }
    }

    async fn start_study(&self, minutes: u32, invoker: &UserId, now: DateTime<Utc>) -> Reply {
        let (session, number) = {
            let mut study = self.study.lock().await;
            let session = study.start(minutes, invoker.clone(), now);
            (session, study.count())
        };
        tracing::info!("📚 Study session {} started ({minutes} min)", session.id);

        let handler = self.clone();
        let owner = invoker.clone();
        let id = session.id;
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(u64::from(minutes) * 60)).await;
            handler.complete_study(id, minutes, &owner).await;
        });

        Reply::embed(messages::study_started(&session, number, self.scheduler.calendar().offset()), false)
    }

    /// Marks the session finished and tells the owner. Delivery failures are logged.
    pub async fn complete_study(&self, id: u64, minutes: u32, owner: &UserId) -> bool {
        let now = self.scheduler.now();
        if self.study.lock().await.complete(id, now).is_none() {
            return false;
        }
        self.scheduler
            .deliver(owner, &messages::study_complete(minutes, now))
            .await
    }

    pub async fn stats_summary(&self, now: DateTime<Utc>) -> StatsSummary {
        let countdown = self.scheduler.calendar().countdown(now);
        let (goals_completed, goals_total) = {
            let goals = self.goals.lock().await;
            (goals.completed_count(), goals.all().len())
        };
        let study = self.study.lock().await;
        StatsSummary {
            days: countdown.days,
            school_days: countdown.school_days,
            goals_completed,
            goals_total,
            study_sessions: study.count(),
            study_minutes: study.total_minutes(),
            average_minutes: study.average_minutes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milestones::MilestoneTracker;
    use crate::test_support::{RecordingNotifier, utc_calendar};
    use chrono::TimeZone;
    use gradbot_core::config::{MilestoneTrigger, ScheduleConfig};
    use gradbot_core::{ManualClock, NotificationKind};

    fn owner() -> UserId {
        UserId::new("owner")
    }

    fn handler(notifier: Arc<RecordingNotifier>) -> CommandHandler {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 11, 11, 9, 0, 0).unwrap(),
        ));
        let scheduler = Scheduler::new(
            utc_calendar(),
            MilestoneTracker::new(vec![30, 7, 1], MilestoneTrigger::Exact),
            notifier,
            clock,
            owner(),
            ScheduleConfig::default(),
        )
        .unwrap();
        CommandHandler::new(
            Arc::new(scheduler),
            Arc::new(Mutex::new(GoalBook::new())),
            Arc::new(Mutex::new(StudyTracker::new())),
            owner(),
            25,
        )
    }

    fn text_of(reply: &Reply) -> &str {
        match reply {
            Reply::Text { content, .. } => content,
            Reply::Embed { notification, .. } => &notification.body,
        }
    }

    #[test]
    fn test_parse_unknown_and_malformed() {
        let unknown = CommandInvocation::new("dance", owner());
        assert_eq!(Command::parse(&unknown).unwrap(), None);

        let missing_hours = CommandInvocation::new("reminder", owner()).option("message", "x");
        assert!(Command::parse(&missing_hours).is_err());

        let bad_hours = CommandInvocation::new("reminder", owner())
            .option("message", "x")
            .option("hours", "soon");
        assert!(Command::parse(&bad_hours).is_err());

        let zero_study = CommandInvocation::new("study", owner()).option("duration", 0);
        assert!(Command::parse(&zero_study).is_err());
    }

    #[test]
    fn test_parse_goals() {
        let inv = CommandInvocation::new("goals", owner())
            .option("action", "complete")
            .option("goal", "maths");
        assert_eq!(
            Command::parse(&inv).unwrap(),
            Some(Command::Goals {
                action: GoalAction::Complete,
                goal: Some("maths".into())
            })
        );
    }

    #[tokio::test]
    async fn test_non_owner_rejected() {
        let h = handler(Arc::new(RecordingNotifier::default()));
        let reply = h.handle(&CommandInvocation::new("countdown", UserId::new("stranger"))).await;
        assert_eq!(reply, Reply::text(NOT_OWNER_REPLY, true));
    }

    #[tokio::test]
    async fn test_unknown_and_error_replies() {
        let h = handler(Arc::new(RecordingNotifier::default()));
        let reply = h.handle(&CommandInvocation::new("dance", owner())).await;
        assert_eq!(reply, Reply::text(UNKNOWN_COMMAND_REPLY, true));

        let reply = h.handle(&CommandInvocation::new("reminder", owner())).await;
        assert_eq!(reply, Reply::text(ERROR_REPLY, true));
    }

    #[tokio::test]
    async fn test_countdown_reply_is_daily_summary() {
        let h = handler(Arc::new(RecordingNotifier::default()));
        match h.handle(&CommandInvocation::new("countdown", owner())).await {
            Reply::Embed { notification, ephemeral } => {
                assert!(!ephemeral);
                assert_eq!(notification.kind, NotificationKind::DailySummary);
                assert_eq!(notification.fields[0].1, "**10** days");
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_milestone_reply_names_next_threshold() {
        let h = handler(Arc::new(RecordingNotifier::default()));
        let reply = h.handle(&CommandInvocation::new("milestone", owner())).await;
        assert!(text_of(&reply).contains("**7 days**"));
        assert!(text_of(&reply).contains("That's in 3 days."));
    }

    #[tokio::test]
    async fn test_reminder_command_adds_to_store() {
        let h = handler(Arc::new(RecordingNotifier::default()));
        let inv = CommandInvocation::new("reminder", owner())
            .option("message", "submit essay")
            .option("hours", 2);
        let reply = h.handle(&inv).await;
        assert!(text_of(&reply).contains("in 2 hour(s) at 11:00"));
        assert_eq!(h.scheduler.reminders().lock().await.active_count(), 1);
    }

    #[tokio::test]
    async fn test_reminder_with_huge_hours_gets_error_reply() {
        let h = handler(Arc::new(RecordingNotifier::default()));
        let inv = CommandInvocation::new("reminder", owner())
            .option("message", "see you in the next aeon")
            .option("hours", 9_007_199_254_740_991_i64);
        assert_eq!(h.handle(&inv).await, Reply::text(ERROR_REPLY, true));
        assert!(h.scheduler.reminders().lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_goal_flow() {
        let h = handler(Arc::new(RecordingNotifier::default()));
        let add = CommandInvocation::new("goals", owner())
            .option("action", "add")
            .option("goal", "Finish Maths");
        assert_eq!(text_of(&h.handle(&add).await), "✅ Goal added: \"Finish Maths\"");

        let complete = CommandInvocation::new("goals", owner())
            .option("action", "complete")
            .option("goal", "maths");
        assert!(text_of(&h.handle(&complete).await).contains("Goal completed: \"Finish Maths\""));
        assert_eq!(
            text_of(&h.handle(&complete).await),
            "❌ Goal not found or already completed."
        );

        let list = CommandInvocation::new("goals", owner()).option("action", "list");
        assert_eq!(text_of(&h.handle(&list).await), "✅ Finish Maths");
    }

    #[tokio::test]
    async fn test_study_completion_notifies_owner() {
        let notifier = Arc::new(RecordingNotifier::default());
        let h = handler(notifier.clone());
        let reply = h
            .handle(&CommandInvocation::new("study", owner()).option("duration", 50))
            .await;
        assert!(text_of(&reply).contains("**50 minutes**"));

        let id = h.study.lock().await.all()[0].id;
        assert!(h.complete_study(id, 50, &owner()).await);
        assert_eq!(notifier.kinds(), vec![NotificationKind::StudyComplete { minutes: 50 }]);
        assert_eq!(h.study.lock().await.completed_count(), 1);

        let stats = h.stats_summary(h.scheduler.now()).await;
        assert_eq!(stats.study_sessions, 1);
        assert_eq!(stats.study_minutes, 50);
    }
}
