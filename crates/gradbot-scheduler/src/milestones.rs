//! Tracks which countdown thresholds have already been celebrated.
//!
//! Each configured threshold moves `pending -> notified` at most once per
//! process. Nothing is persisted, so a restart makes every threshold pending
//! again.

use std::collections::HashSet;

use serde::Serialize;

use gradbot_core::config::MilestoneTrigger;

/// The next threshold still to come.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NextMilestone {
    pub threshold: i64,
    pub days_until: i64,
}

/// Position between the previous and the next threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MilestoneProgress {
    pub next_milestone: i64,
    pub last_milestone: i64,
    pub days_until_next: i64,
    pub progress_percent: u32,
}

#[derive(Debug, Clone)]
pub struct MilestoneTracker {
    thresholds: Vec<i64>,
    notified: HashSet<i64>,
    trigger: MilestoneTrigger,
    last_observed: Option<i64>,
}

impl MilestoneTracker {
    pub fn new(thresholds: Vec<i64>, trigger: MilestoneTrigger) -> Self {
        Self {
            thresholds,
            notified: HashSet::new(),
            trigger,
            last_observed: None,
        }
    }

    pub fn thresholds(&self) -> &[i64] {
        &self.thresholds
    }

    pub fn trigger(&self) -> MilestoneTrigger {
        self.trigger
    }

    pub fn is_pending(&self, threshold: i64) -> bool {
        !self.notified.contains(&threshold)
    }

    /// Thresholds reached by `days_left` that were still pending. They are
    /// marked notified before returning, so a second call never repeats them.
    pub fn check(&mut self, days_left: i64) -> Vec<i64> {
        let previous = self.last_observed.replace(days_left);
        let mut reached = Vec::new();

        for &threshold in &self.thresholds {
            let hit = match self.trigger {
                MilestoneTrigger::Exact => days_left == threshold,
                MilestoneTrigger::Crossed => {
                    days_left == threshold
                        || previous.is_some_and(|prev| prev > threshold && days_left < threshold)
                }
            };
            if hit && self.notified.insert(threshold) {
                reached.push(threshold);
            }
        }

        reached
    }

    /// Largest pending threshold strictly below `days_left`.
    pub fn next(&self, days_left: i64) -> Option<NextMilestone> {
        self.thresholds
            .iter()
            .copied()
            .filter(|t| *t < days_left && self.is_pending(*t))
            .max()
            .map(|threshold| NextMilestone {
                threshold,
                days_until: days_left - threshold,
            })
    }

    /// Progress through the current interval: from the closest threshold
    /// above `days_left` down to the next pending one.
    pub fn progress(&self, days_left: i64) -> Option<MilestoneProgress> {
        let next = self.next(days_left)?;
        let last = self
            .thresholds
            .iter()
            .copied()
            .filter(|t| *t > days_left)
            .min()?;

        let range = (last - next.threshold) as f64;
        let done = (last - days_left) as f64;
        Some(MilestoneProgress {
            next_milestone: next.threshold,
            last_milestone: last,
            days_until_next: next.days_until,
            progress_percent: ((done / range) * 100.0).round() as u32,
        })
    }

    /// Notified thresholds, largest first.
    pub fn notified(&self) -> Vec<i64> {
        let mut sent: Vec<i64> = self.notified.iter().copied().collect();
        sent.sort_unstable_by(|a, b| b.cmp(a));
        sent
    }

    pub fn reset(&mut self) {
        self.notified.clear();
        self.last_observed = None;
    }
}
