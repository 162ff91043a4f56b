//! Adaptive tracker: a checklist of micro-actions and its completion rate.
//!
//! When too few tasks get done the user can ask for a recalibrated plan;
//! [`Tracker::needs_recalibration`] decides when that prompt is offered.

use serde::Serialize;
use thiserror::Error;

use crate::structured::MonthlyRoadmap;

/// Recalibration is offered below this completion percentage.
pub const DEFAULT_RECALIBRATION_THRESHOLD_PERCENT: u8 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedTask {
    pub text: String,
    pub week: Option<u8>,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("no task at position {0}")]
    NoSuchTask(usize),
    #[error("task text must not be empty")]
    EmptyTask,
}

#[derive(Debug, Clone, Default)]
pub struct Tracker {
    tasks: Vec<TrackedTask>,
}

impl Tracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, text: &str, week: Option<u8>) -> Result<usize, TrackerError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TrackerError::EmptyTask);
        }
        self.tasks.push(TrackedTask {
            text: text.to_string(),
            week,
            done: false,
        });
        Ok(self.tasks.len() - 1)
    }

    /// Flip a task between done and not done, returning the new state.
    pub fn toggle(&mut self, index: usize) -> Result<bool, TrackerError> {
        let task = self
            .tasks
            .get_mut(index)
            .ok_or(TrackerError::NoSuchTask(index))?;
        task.done = !task.done;
        Ok(task.done)
    }

    /// Replace the checklist with every task from a roadmap, in week order.
    pub fn load_roadmap(&mut self, roadmap: &MonthlyRoadmap) -> usize {
        self.tasks.clear();
        for week in &roadmap.weeks {
            for task in &week.tasks {
                let text = task.trim();
                if !text.is_empty() {
                    self.tasks.push(TrackedTask {
                        text: text.to_string(),
                        week: Some(week.week),
                        done: false,
                    });
                }
            }
        }
        tracing::info!(tasks = self.tasks.len(), "Roadmap loaded into tracker");
        self.tasks.len()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    #[must_use]
    pub fn tasks(&self) -> &[TrackedTask] {
        &self.tasks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Share of tasks done, or `None` for an empty checklist.
    #[must_use]
    pub fn completion_rate(&self) -> Option<f64> {
        if self.tasks.is_empty() {
            return None;
        }
        let done = self.tasks.iter().filter(|t| t.done).count();
        Some(done as f64 / self.tasks.len() as f64)
    }

    #[must_use]
    pub fn needs_recalibration(&self, threshold_percent: u8) -> bool {
        self.completion_rate()
            .is_some_and(|rate| rate * 100.0 < f64::from(threshold_percent))
    }

    #[must_use]
    pub fn completed(&self) -> Vec<&str> {
        self.tasks
            .iter()
            .filter(|t| t.done)
            .map(|t| t.text.as_str())
            .collect()
    }

    #[must_use]
    pub fn missed(&self) -> Vec<&str> {
        self.tasks
            .iter()
            .filter(|t| !t.done)
            .map(|t| t.text.as_str())
            .collect()
    }
}
