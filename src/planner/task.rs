use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// A single notebook entry.
///
/// Field names on disk follow the `tasks` storage contract (`isCompleted`,
/// `createdAt`, ...); `completedAt` is omitted entirely while the task is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Callers pass an already trimmed, non-empty title.
    pub fn new(title: String, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            is_completed: false,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn toggle(&mut self, now: DateTime<Utc>) {
        let now = self.not_before_creation(now);
        self.is_completed = !self.is_completed;
        self.updated_at = now;
        self.completed_at = if self.is_completed { Some(now) } else { None };
    }

    pub fn update_title(&mut self, title: String, now: DateTime<Utc>) {
        self.title = title;
        self.updated_at = self.not_before_creation(now);
    }

    // A clock that stepped backwards must not put updated_at before created_at.
    fn not_before_creation(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.max(self.created_at)
    }
}

/// Source of timestamps for task mutations.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock, truncated to milliseconds so stored and in-memory values agree.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }
}
