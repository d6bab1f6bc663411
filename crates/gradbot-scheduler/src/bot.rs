//! The assembled bot: scheduler, goal book, study tracker and command handler,
//! built once in `main` and shared by reference.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use gradbot_core::{Clock, GradBotConfig, Notifier, Result, UserId};

use crate::calendar::GraduationCalendar;
use crate::commands::{CommandHandler, CommandInvocation, Reply};
use crate::engine::{Scheduler, TriggerStatus};
use crate::goals::GoalBook;
use crate::milestones::MilestoneTracker;
use crate::study::StudyTracker;

/// Runtime summary for the dashboard and `/api/v1/status`.
#[derive(Debug, Clone, Serialize)]
pub struct BotStats {
    pub uptime_secs: i64,
    pub notifier: String,
    pub days_left: i64,
    pub school_days_left: u32,
    pub goals_total: usize,
    pub goals_completed: usize,
    pub study_sessions: usize,
    pub study_minutes: u64,
    pub active_reminders: usize,
    pub notifications_delivered: u64,
    pub notifications_failed: u64,
    pub triggers: Vec<TriggerStatus>,
}

pub struct GradBot {
    config: GradBotConfig,
    scheduler: Arc<Scheduler>,
    goals: Arc<Mutex<GoalBook>>,
    study: Arc<Mutex<StudyTracker>>,
    commands: CommandHandler,
    started_at: DateTime<Utc>,
}

impl GradBot {
    /// Validates the config and wires every component. Nothing is spawned yet.
    pub fn new(
        config: GradBotConfig,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let calendar = GraduationCalendar::from_config(&config.graduation)?;
        let tracker = MilestoneTracker::new(
            config.graduation.milestones.clone(),
            config.graduation.milestone_trigger,
        );
        let owner = UserId::new(config.bot.user_id.clone());
        let started_at = clock.now();

        let scheduler = Arc::new(Scheduler::new(
            calendar,
            tracker,
            notifier,
            clock,
            owner.clone(),
            config.schedule.clone(),
        )?);
        let goals = Arc::new(Mutex::new(GoalBook::new()));
        let study = Arc::new(Mutex::new(StudyTracker::new()));
        let commands = CommandHandler::new(
            scheduler.clone(),
            goals.clone(),
            study.clone(),
            owner,
            config.study.default_minutes,
        );

        Ok(Self {
            config,
            scheduler,
            goals,
            study,
            commands,
            started_at,
        })
    }

    pub fn config(&self) -> &GradBotConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    pub fn goals(&self) -> &Arc<Mutex<GoalBook>> {
        &self.goals
    }

    pub fn study(&self) -> &Arc<Mutex<StudyTracker>> {
        &self.study
    }

    pub fn commands(&self) -> &CommandHandler {
        &self.commands
    }

    pub fn start(&self) {
        self.scheduler.start();
    }

    pub fn stop(&self) {
        self.scheduler.stop_all();
    }

    pub async fn handle_command(&self, invocation: &CommandInvocation) -> Reply {
        self.commands.handle(invocation).await
    }

    pub async fn stats(&self) -> BotStats {
        let now = self.scheduler.now();
        let summary = self.commands.stats_summary(now).await;
        let active_reminders = self.scheduler.reminders().lock().await.active_count();
        let (delivered, failed) = {
            let history = self.scheduler.history().lock().await;
            (history.delivered_count(), history.failed_count())
        };

        BotStats {
            uptime_secs: (now - self.started_at).num_seconds(),
            notifier: self.scheduler.notifier().name().to_string(),
            days_left: summary.days,
            school_days_left: summary.school_days,
            goals_total: summary.goals_total,
            goals_completed: summary.goals_completed,
            study_sessions: summary.study_sessions,
            study_minutes: summary.study_minutes,
            active_reminders,
            notifications_delivered: delivered,
            notifications_failed: failed,
            triggers: self.scheduler.status(),
        }
    }
}
