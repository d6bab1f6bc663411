//! API route handlers for the gateway.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use gradbot_core::UserId;
use gradbot_scheduler::CommandInvocation;

use super::server::AppState;

/// Health check endpoint.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "gradbot-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Bot statistics and trigger status.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let stats = state.bot.stats().await;
    Json(serde_json::json!({
        "ok": true,
        "version": env!("CARGO_PKG_VERSION"),
        "server_uptime_secs": state.start_time.elapsed().as_secs(),
        "stats": stats,
    }))
}

pub async fn countdown(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let scheduler = state.bot.scheduler();
    let now = scheduler.now();
    let calendar = scheduler.calendar();
    Json(serde_json::json!({
        "ok": true,
        "target_date": calendar.target_date(),
        "target_instant": calendar.target_instant().to_rfc3339(),
        "today": calendar.local_date(now),
        "countdown": calendar.countdown(now),
        "progress": calendar.progress(now),
    }))
}

pub async fn milestones(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let scheduler = state.bot.scheduler();
    let days_left = scheduler.calendar().days_left(scheduler.now());
    let tracker = scheduler.milestones().lock().await;
    Json(serde_json::json!({
        "ok": true,
        "days_left": days_left,
        "trigger": tracker.trigger(),
        "thresholds": tracker.thresholds(),
        "notified": tracker.notified(),
        "next": tracker.next(days_left),
        "progress": tracker.progress(days_left),
    }))
}

pub async fn list_reminders(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let store = state.bot.scheduler().reminders().lock().await;
    Json(serde_json::json!({
        "ok": true,
        "active": store.active(),
        "total": store.len(),
    }))
}

/// Create a reminder. Body: `{"message": "...", "hours": 2, "user_id": "..."}`;
/// `user_id` defaults to the configured recipient.
pub async fn add_reminder(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    let message = body["message"].as_str().unwrap_or("").trim();
    if message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"ok": false, "error": "'message' is required"})),
        );
    }
    let Some(hours) = body["hours"].as_i64() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"ok": false, "error": "'hours' must be an integer"})),
        );
    };

    let scheduler = state.bot.scheduler();
    let owner = body["user_id"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(UserId::new)
        .unwrap_or_else(|| scheduler.recipient().clone());
    let added = scheduler
        .reminders()
        .lock()
        .await
        .add(message, hours, owner, scheduler.now());
    let Some(reminder) = added else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"ok": false, "error": "'hours' is out of range"})),
        );
    };

    tracing::info!("⏰ Reminder {} added via API", reminder.id);
    (
        StatusCode::OK,
        Json(serde_json::json!({"ok": true, "reminder": reminder})),
    )
}

pub async fn list_goals(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let goals = state.bot.goals().lock().await;
    Json(serde_json::json!({
        "ok": true,
        "goals": goals.all(),
        "completed": goals.completed_count(),
    }))
}

pub async fn study_sessions(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let study = state.bot.study().lock().await;
    Json(serde_json::json!({
        "ok": true,
        "sessions": study.all(),
        "total_minutes": study.total_minutes(),
        "average_minutes": study.average_minutes(),
        "completed": study.completed_count(),
    }))
}

/// Recent notification history.
pub async fn notifications(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let history = state.bot.scheduler().history().lock().await;
    Json(serde_json::json!({
        "ok": true,
        "notifications": history.records(),
        "delivered": history.delivered_count(),
        "failed": history.failed_count(),
    }))
}

/// Trigger schedule and upcoming holidays.
pub async fn schedule(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let scheduler = state.bot.scheduler();
    let now = scheduler.now();
    Json(serde_json::json!({
        "ok": true,
        "triggers": scheduler.status(),
        "upcoming_holidays": scheduler.calendar().upcoming_holidays(now),
        "utc_offset_minutes": state.bot.config().graduation.utc_offset_minutes,
    }))
}

/// Run a slash command or button as if it came from chat.
pub async fn run_command(
    State(state): State<Arc<AppState>>,
    Json(invocation): Json<CommandInvocation>,
) -> Json<serde_json::Value> {
    let reply = state.bot.handle_command(&invocation).await;
    Json(serde_json::json!({"ok": true, "reply": reply}))
}

pub async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"ok": false, "error": "Not found"})),
    )
}
