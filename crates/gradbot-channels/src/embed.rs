//! Discord JSON payloads: embeds, the button row and slash-command definitions.

use serde_json::{Value, json};

use gradbot_core::Notification;

/// Discord option type ids.
const OPTION_STRING: u8 = 3;
const OPTION_INTEGER: u8 = 4;

/// Render a notification as a Discord embed object.
pub fn embed(notification: &Notification) -> Value {
    let mut embed = json!({
        "title": notification.title,
        "color": notification.kind.color(),
        "timestamp": notification.timestamp.to_rfc3339(),
    });
    // Discord rejects empty descriptions.
    if !notification.body.is_empty() {
        embed["description"] = json!(notification.body);
    }
    if !notification.fields.is_empty() {
        embed["fields"] = notification
            .fields
            .iter()
            .map(|(name, value)| json!({"name": name, "value": value, "inline": true}))
            .collect();
    }
    if let Some(footer) = &notification.footer {
        embed["footer"] = json!({ "text": footer });
    }
    embed
}

/// Body for `POST /channels/{id}/messages` and webhook executions.
pub fn message_payload(notification: &Notification) -> Value {
    json!({ "embeds": [embed(notification)] })
}

/// The four quick-action buttons shown under the countdown.
pub fn button_row() -> Value {
    let button = |id: &str, label: &str, style: u8| {
        json!({"type": 2, "custom_id": id, "label": label, "style": style})
    };
    json!({
        "type": 1,
        "components": [
            button("refresh_countdown", "🔄 Refresh", 1),
            button("motivation", "💪 Motivate Me", 3),
            button("progress", "📊 Progress", 2),
            button("celebration", "🎉 Celebrate", 4),
        ]
    })
}

/// Global slash-command definitions, in the shape
/// `PUT /applications/{id}/commands` expects.
pub fn command_definitions() -> Value {
    json!([
        { "name": "countdown", "description": "Get your graduation countdown" },
        { "name": "milestone", "description": "Check upcoming milestones" },
        { "name": "stats", "description": "View detailed graduation statistics" },
        {
            "name": "goals",
            "description": "Set and track academic goals",
            "options": [
                {
                    "name": "action",
                    "type": OPTION_STRING,
                    "description": "Action to perform (add, list, complete)",
                    "required": true,
                    "choices": [
                        { "name": "Add Goal", "value": "add" },
                        { "name": "List Goals", "value": "list" },
                        { "name": "Complete Goal", "value": "complete" }
                    ]
                },
                {
                    "name": "goal",
                    "type": OPTION_STRING,
                    "description": "Goal description (for add/complete actions)",
                    "required": false
                }
            ]
        },
        { "name": "schedule", "description": "View upcoming school schedule and holidays" },
        { "name": "quote", "description": "Get an inspirational quote for motivation" },
        {
            "name": "reminder",
            "description": "Set a custom reminder",
            "options": [
                { "name": "message", "type": OPTION_STRING, "description": "Reminder message", "required": true },
                { "name": "hours", "type": OPTION_INTEGER, "description": "Hours from now to remind", "required": true }
            ]
        },
        {
            "name": "study",
            "description": "Study session tracker and timer",
            "options": [
                { "name": "duration", "type": OPTION_INTEGER, "description": "Study session duration in minutes", "required": false }
            ]
        }
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gradbot_core::NotificationKind;

    #[test]
    fn test_embed_fields_and_color() {
        let n = Notification::new(NotificationKind::Milestone { days: 7 }, "t", "b", Utc::now())
            .field("a", "1")
            .footer("f");
        let e = embed(&n);
        assert_eq!(e["color"], 0xFF6B6B);
        assert_eq!(e["fields"][0]["name"], "a");
        assert_eq!(e["fields"][0]["inline"], true);
        assert_eq!(e["footer"]["text"], "f");
        assert_eq!(e["description"], "b");
    }

    #[test]
    fn test_empty_body_omits_description() {
        let n = Notification::new(NotificationKind::Info, "stats", "", Utc::now());
        assert!(embed(&n).get("description").is_none());
        assert!(embed(&n).get("fields").is_none());
    }

    #[test]
    fn test_command_definitions_cover_all_commands() {
        let defs = command_definitions();
        let names: Vec<&str> = defs
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["countdown", "milestone", "stats", "goals", "schedule", "quote", "reminder", "study"]
        );
        assert_eq!(button_row()["components"].as_array().unwrap().len(), 4);
    }
}
