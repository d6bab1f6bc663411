//! Scheduler engine: three cron triggers that drive the countdown.
//!
//! ```text
//! daily     "0 6 * * *"  → countdown summary → milestone check
//! milestone "0 * * * *"  → milestone check
//! reminder  "* * * * *"  → due reminders → mark sent → cleanup policy
//! ```
//!
//! Each trigger is a tokio task that sleeps until its next cron instant and
//! races a `CancellationToken`. State locks are released before any send.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, FixedOffset, Utc};
use rand::Rng;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use gradbot_core::config::{CleanupPolicy, ScheduleConfig};
use gradbot_core::{Clock, GradBotError, Notification, Notifier, Result, UserId};

use crate::calendar::{Countdown, GraduationCalendar};
use crate::cron::CronSchedule;
use crate::messages;
use crate::milestones::MilestoneTracker;
use crate::notify::{Delivery, NotifyHistory};
use crate::reminders::ReminderStore;

/// The three recurring jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Daily,
    Milestone,
    Reminder,
}

impl TriggerKind {
    pub const ALL: [TriggerKind; 3] = [Self::Daily, Self::Milestone, Self::Reminder];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Milestone => "milestone",
            Self::Reminder => "reminder",
        }
    }
}

/// Snapshot of one trigger for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct TriggerStatus {
    pub name: &'static str,
    pub expression: String,
    pub running: bool,
    pub next_run: Option<DateTime<Utc>>,
}

/// What one reminder tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReminderTickReport {
    pub delivered: usize,
    pub failed: usize,
    pub cleaned: usize,
}

struct ActiveTrigger {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl ActiveTrigger {
    fn is_live(&self) -> bool {
        !self.token.is_cancelled() && !self.handle.is_finished()
    }
}

/// Owns the recurring triggers and the state they read and mutate.
pub struct Scheduler {
    calendar: GraduationCalendar,
    milestones: Arc<Mutex<MilestoneTracker>>,
    reminders: Arc<Mutex<ReminderStore>>,
    history: Arc<Mutex<NotifyHistory>>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    recipient: UserId,
    daily: CronSchedule,
    milestone: CronSchedule,
    reminder: CronSchedule,
    config: ScheduleConfig,
    reminder_ticks: AtomicU64,
    active: std::sync::Mutex<Vec<(TriggerKind, ActiveTrigger)>>,
}

impl Scheduler {
    /// Fails with a config error if any cron expression does not parse.
    pub fn new(
        calendar: GraduationCalendar,
        milestones: MilestoneTracker,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        recipient: UserId,
        config: ScheduleConfig,
    ) -> Result<Self> {
        let parse = |kind: TriggerKind, expr: &str| {
            CronSchedule::parse(expr).ok_or_else(|| {
                GradBotError::Config(format!(
                    "invalid cron expression for {} trigger: '{expr}'",
                    kind.name()
                ))
            })
        };
        Ok(Self {
            daily: parse(TriggerKind::Daily, &config.daily)?,
            milestone: parse(TriggerKind::Milestone, &config.milestone)?,
            reminder: parse(TriggerKind::Reminder, &config.reminder)?,
            calendar,
            milestones: Arc::new(Mutex::new(milestones)),
            reminders: Arc::new(Mutex::new(ReminderStore::new())),
            history: Arc::new(Mutex::new(NotifyHistory::new())),
            notifier,
            clock,
            recipient,
            config,
            reminder_ticks: AtomicU64::new(0),
            active: std::sync::Mutex::new(Vec::new()),
        })
    }

    pub fn calendar(&self) -> &GraduationCalendar {
        &self.calendar
    }

    pub fn milestones(&self) -> &Arc<Mutex<MilestoneTracker>> {
        &self.milestones
    }

    pub fn reminders(&self) -> &Arc<Mutex<ReminderStore>> {
        &self.reminders
    }

    pub fn history(&self) -> &Arc<Mutex<NotifyHistory>> {
        &self.history
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn recipient(&self) -> &UserId {
        &self.recipient
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn offset(&self) -> FixedOffset {
        self.calendar.offset()
    }

    fn schedule_for(&self, kind: TriggerKind) -> (&CronSchedule, &str) {
        match kind {
            TriggerKind::Daily => (&self.daily, &self.config.daily),
            TriggerKind::Milestone => (&self.milestone, &self.config.milestone),
            TriggerKind::Reminder => (&self.reminder, &self.config.reminder),
        }
    }

    /// Send one notification and record the outcome. Errors are logged,
    /// never returned.
    pub async fn deliver(&self, user: &UserId, notification: &Notification) -> bool {
        let result = self.notifier.send_to_user(user, notification).await;
        let delivery = match &result {
            Ok(()) => Delivery::Delivered,
            Err(e) => {
                tracing::warn!(
                    "⚠️ Failed to send {} to {}: {e}",
                    notification.kind.label(),
                    user
                );
                Delivery::Failed {
                    error: e.to_string(),
                }
            }
        };
        self.history
            .lock()
            .await
            .record(notification, self.notifier.name(), delivery);
        result.is_ok()
    }

    /// Daily summary, then the milestone check.
    pub async fn run_daily_tick(&self) -> Countdown {
        let now = self.clock.now();
        let countdown = self.calendar.countdown(now);
        tracing::info!(
            "📅 Daily summary: {} days, {} school days left",
            countdown.days,
            countdown.school_days
        );
        let summary = messages::daily_summary(&countdown, self.calendar.target_date(), now);
        self.deliver(&self.recipient, &summary).await;
        self.check_milestones().await;
        countdown
    }

    /// Sends one notification per newly reached threshold and returns them.
    pub async fn check_milestones(&self) -> Vec<i64> {
        let now = self.clock.now();
        let days_left = self.calendar.days_left(now);
        let reached = self.milestones.lock().await.check(days_left);

        for &days in &reached {
            tracing::info!("🎉 Milestone reached: {days} days left");
            let note = messages::milestone(days, self.calendar.target_date(), now);
            self.deliver(&self.recipient, &note).await;
        }
        reached
    }

    /// Due reminders are claimed (marked sent) before delivery, so a failed
    /// send is consumed rather than retried.
    pub async fn run_reminder_tick(&self) -> ReminderTickReport {
        let now = self.clock.now();
        let due = {
            let mut store = self.reminders.lock().await;
            let due = store.due(now);
            for r in &due {
                store.mark_sent(r.id, now);
            }
            due
        };

        let mut report = ReminderTickReport::default();
        for r in &due {
            tracing::info!("⏰ Reminder {} due for {}", r.id, r.owner_id);
            if self.deliver(&r.owner_id, &messages::reminder(&r.message, now)).await {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }

        let tick = self.reminder_ticks.fetch_add(1, Ordering::Relaxed) + 1;
        if self.should_cleanup(tick) {
            report.cleaned = self.reminders.lock().await.cleanup();
            if report.cleaned > 0 {
                tracing::debug!("🧹 Cleaned up {} sent reminders", report.cleaned);
            }
        }
        report
    }

    fn should_cleanup(&self, tick: u64) -> bool {
        match self.config.cleanup {
            CleanupPolicy::Probabilistic { chance } => {
                rand::thread_rng().gen_bool(chance.clamp(0.0, 1.0))
            }
            CleanupPolicy::EveryNthTick { n } => n > 0 && tick % u64::from(n) == 0,
            CleanupPolicy::Never => false,
        }
    }

    async fn fire(&self, kind: TriggerKind) {
        match kind {
            TriggerKind::Daily => {
                self.run_daily_tick().await;
            }
            TriggerKind::Milestone => {
                self.check_milestones().await;
            }
            TriggerKind::Reminder => {
                self.run_reminder_tick().await;
            }
        }
    }

    /// Spawn the trigger tasks. A no-op while they are already running.
    pub fn start(self: &Arc<Self>) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if active.iter().any(|(_, t)| t.is_live()) {
            tracing::debug!("⏰ Scheduler already running");
            return;
        }
        for (_, stale) in active.drain(..) {
            stale.token.cancel();
        }

        for kind in TriggerKind::ALL {
            let token = CancellationToken::new();
            let handle = tokio::spawn(Arc::clone(self).trigger_loop(kind, token.clone()));
            active.push((kind, ActiveTrigger { token, handle }));
        }
        tracing::info!(
            "⏰ Scheduler started (daily '{}', milestone '{}', reminder '{}')",
            self.config.daily,
            self.config.milestone,
            self.config.reminder
        );
    }

    async fn trigger_loop(self: Arc<Self>, kind: TriggerKind, token: CancellationToken) {
        let mut after = self.clock.now();
        loop {
            let (schedule, expr) = self.schedule_for(kind);
            let Some(next) = schedule.next_after(after, self.offset()) else {
                tracing::warn!("⚠️ Trigger '{}' ({expr}) has no upcoming run", kind.name());
                return;
            };
            let wait = (next - self.clock.now()).to_std().unwrap_or_default();

            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(wait) => {}
            }

            tracing::debug!("🔔 Trigger '{}' fired", kind.name());
            self.fire(kind).await;
            after = self.clock.now().max(next);
        }
    }

    /// Cancel every trigger. In-flight sends finish on their own.
    pub fn stop_all(&self) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if active.is_empty() {
            return;
        }
        for (_, trigger) in active.drain(..) {
            trigger.token.cancel();
        }
        tracing::info!("🛑 Scheduler stopped");
    }

    pub fn is_running(&self) -> bool {
        let active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        active.iter().any(|(_, t)| t.is_live())
    }

    pub fn status(&self) -> Vec<TriggerStatus> {
        let now = self.clock.now();
        let active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        TriggerKind::ALL
            .iter()
            .map(|&kind| {
                let (schedule, expr) = self.schedule_for(kind);
                let running = active.iter().any(|(k, t)| *k == kind && t.is_live());
                TriggerStatus {
                    name: kind.name(),
                    expression: expr.to_string(),
                    running,
                    next_run: schedule.next_after(now, self.offset()),
                }
            })
            .collect()
    }
}
