//! Academic goals the user sets and ticks off by hand.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Goal {
    pub id: u64,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct GoalBook {
    goals: Vec<Goal>,
    next_id: u64,
}

impl GoalBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, text: &str, now: DateTime<Utc>) -> Goal {
        self.next_id += 1;
        let goal = Goal {
            id: self.next_id,
            text: text.to_string(),
            completed: false,
            created_at: now,
            completed_at: None,
        };
        self.goals.push(goal.clone());
        goal
    }

    /// Completes the first pending goal whose text contains `search`,
    /// ignoring case. `None` if nothing matches.
    pub fn complete(&mut self, search: &str, now: DateTime<Utc>) -> Option<Goal> {
        let needle = search.to_lowercase();
        let goal = self
            .goals
            .iter_mut()
            .find(|g| !g.completed && g.text.to_lowercase().contains(&needle))?;
        goal.completed = true;
        goal.completed_at = Some(now);
        Some(goal.clone())
    }

    pub fn all(&self) -> &[Goal] {
        &self.goals
    }

    pub fn pending(&self) -> Vec<&Goal> {
        self.goals.iter().filter(|g| !g.completed).collect()
    }

    pub fn completed_count(&self) -> usize {
        self.goals.iter().filter(|g| g.completed).count()
    }
}
