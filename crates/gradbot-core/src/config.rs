//! GradBot configuration system.

use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GradBotError, Result};
use crate::types::HolidayRange;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradBotConfig {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub graduation: GraduationConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub study: StudyConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl GradBotConfig {
    /// Load config from the default path (~/.gradbot/config.toml), then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load config from a specific path. No environment overrides applied.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GradBotError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| GradBotError::Config(format!("Failed to parse config: {e}")))
    }

    /// Save config to the given path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| GradBotError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the GradBot home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gradbot")
    }

    /// Apply `BOT_TOKEN`, `USER_ID`, `CLIENT_ID`, `DISCORD_WEBHOOK_URL` and `PORT`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Same as `apply_env_overrides` with an injectable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty("BOT_TOKEN") {
            self.bot.token = token;
        }
        if let Some(user_id) = non_empty("USER_ID") {
            self.bot.user_id = user_id;
        }
        if let Some(app_id) = non_empty("CLIENT_ID") {
            self.bot.application_id = app_id;
        }
        if let Some(url) = non_empty("DISCORD_WEBHOOK_URL") {
            self.bot.webhook_url = url;
        }
        if let Some(port) = non_empty("PORT") {
            match port.parse::<u16>() {
                Ok(p) => self.gateway.port = p,
                Err(_) => tracing::warn!("⚠️ Ignoring invalid PORT value '{port}'"),
            }
        }
    }

    /// Check invariants that the scheduler relies on.
    pub fn validate(&self) -> Result<()> {
        for (i, h) in self.graduation.holidays.iter().enumerate() {
            if h.start > h.end {
                return Err(GradBotError::Config(format!(
                    "holiday #{i} starts after it ends ({} > {})",
                    h.start, h.end
                )));
            }
        }

        let milestones = &self.graduation.milestones;
        if let Some(bad) = milestones.iter().find(|m| **m <= 0) {
            return Err(GradBotError::Config(format!(
                "milestone thresholds must be positive, found {bad}"
            )));
        }
        if milestones.windows(2).any(|w| w[0] <= w[1]) {
            return Err(GradBotError::Config(
                "milestone thresholds must be strictly descending".into(),
            ));
        }

        if self.graduation.tracking_start > self.graduation.date {
            return Err(GradBotError::Config(
                "tracking_start must not be after the graduation date".into(),
            ));
        }

        self.graduation.offset()?;

        match self.schedule.cleanup {
            CleanupPolicy::Probabilistic { chance } if !(0.0..=1.0).contains(&chance) => {
                Err(GradBotError::Config(format!(
                    "cleanup chance must be within 0.0..=1.0, got {chance}"
                )))
            }
            CleanupPolicy::EveryNthTick { n: 0 } => Err(GradBotError::Config(
                "cleanup every_nth_tick needs n >= 1".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Stricter check for actually connecting to Discord.
    pub fn require_credentials(&self) -> Result<()> {
        if self.bot.token.trim().is_empty() {
            return Err(GradBotError::Config(
                "no bot token configured (set BOT_TOKEN or [bot].token)".into(),
            ));
        }
        if self.bot.user_id.trim().is_empty() {
            return Err(GradBotError::Config(
                "no recipient configured (set USER_ID or [bot].user_id)".into(),
            ));
        }
        Ok(())
    }
}

/// Discord credentials and the single recipient.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub token: String,
    /// The one user this bot talks to.
    #[serde(default)]
    pub user_id: String,
    /// Discord application id; looked up from the API when empty.
    #[serde(default)]
    pub application_id: String,
    /// Optional Discord webhook used instead of direct messages.
    #[serde(default)]
    pub webhook_url: String,
}

/// The countdown target and its calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraduationConfig {
    #[serde(default = "default_graduation_date")]
    pub date: NaiveDate,
    /// First day of the countdown, used for the progress bar.
    #[serde(default = "default_tracking_start")]
    pub tracking_start: NaiveDate,
    /// Local offset from UTC in minutes. Brisbane has no DST, so a fixed
    /// offset is exact there.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_holidays")]
    pub holidays: Vec<HolidayRange>,
    #[serde(default = "default_milestones")]
    pub milestones: Vec<i64>,
    #[serde(default)]
    pub milestone_trigger: MilestoneTrigger,
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn default_graduation_date() -> NaiveDate { ymd(2025, 11, 21) }
fn default_tracking_start() -> NaiveDate { ymd(2024, 1, 1) }
fn default_utc_offset_minutes() -> i32 { 600 }

fn default_holidays() -> Vec<HolidayRange> {
    vec![
        HolidayRange::new(ymd(2024, 12, 16), ymd(2025, 1, 27)),
        HolidayRange::new(ymd(2025, 4, 14), ymd(2025, 4, 28)),
        HolidayRange::new(ymd(2025, 7, 7), ymd(2025, 7, 21)),
        HolidayRange::new(ymd(2025, 9, 22), ymd(2025, 10, 6)),
    ]
}

fn default_milestones() -> Vec<i64> {
    vec![500, 365, 300, 250, 200, 150, 100, 75, 50, 30, 25, 20, 15, 10, 7, 5, 3, 2, 1]
}

impl GraduationConfig {
    pub fn offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            GradBotError::Config(format!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            ))
        })
    }
}

impl Default for GraduationConfig {
    fn default() -> Self {
        Self {
            date: default_graduation_date(),
            tracking_start: default_tracking_start(),
            utc_offset_minutes: default_utc_offset_minutes(),
            holidays: default_holidays(),
            milestones: default_milestones(),
            milestone_trigger: MilestoneTrigger::default(),
        }
    }
}

/// When a milestone threshold counts as reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneTrigger {
    /// Only when the check runs with `days_left == threshold`.
    #[default]
    Exact,
    /// Also when the threshold was stepped over since the previous check.
    Crossed,
}

/// Cron expressions for the three recurring triggers, plus reminder cleanup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_daily_cron")]
    pub daily: String,
    #[serde(default = "default_milestone_cron")]
    pub milestone: String,
    #[serde(default = "default_reminder_cron")]
    pub reminder: String,
    #[serde(default)]
    pub cleanup: CleanupPolicy,
}

fn default_daily_cron() -> String { "0 6 * * *".into() }
fn default_milestone_cron() -> String { "0 * * * *".into() }
fn default_reminder_cron() -> String { "* * * * *".into() }

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            daily: default_daily_cron(),
            milestone: default_milestone_cron(),
            reminder: default_reminder_cron(),
            cleanup: CleanupPolicy::default(),
        }
    }
}

/// When sent reminders are dropped from the store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CleanupPolicy {
    /// After each reminder tick with the given probability.
    Probabilistic { chance: f64 },
    /// After every `n`th reminder tick.
    EveryNthTick { n: u32 },
    Never,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        CleanupPolicy::Probabilistic { chance: 0.1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    #[serde(default = "default_study_minutes")]
    pub default_minutes: u32,
}

fn default_study_minutes() -> u32 { 25 }

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_study_minutes(),
        }
    }
}

/// Dashboard HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn bool_true() -> bool { true }
fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 27145 }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_host(),
            port: default_port(),
        }
    }
}
