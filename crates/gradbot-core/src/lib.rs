//! # GradBot Core
//!
//! Shared building blocks for the graduation countdown bot:
//! configuration, the error type, domain types and the ports
//! (`Notifier`, `Clock`) that the scheduler talks through.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::GradBotConfig;
pub use error::{GradBotError, Result};
pub use traits::{Clock, ManualClock, Notifier, SystemClock};
pub use types::{HolidayRange, Notification, NotificationKind, UserId};
