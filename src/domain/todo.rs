use super::project::ProjectId;
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a todo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(Uuid);

impl TodoId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TodoId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    /// Owning project (None for loose backlog items)
    #[serde(default)]
    pub project: Option<ProjectId>,
    pub title: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Local>>,
    /// Soft-delete flag; deleted todos stay around for reporting
    #[serde(default)]
    pub is_deleted: bool,
    /// Store-wide sequence, ascending in display order
    #[serde(default)]
    pub order: u64,
    /// Date of the daily list this todo currently sits on
    #[serde(default)]
    pub daily_list: Option<NaiveDate>,
    /// Daily list given at creation; moves never change it
    #[serde(default)]
    pub assigned_daily_list: Option<NaiveDate>,
    pub created_at: DateTime<Local>,
}

impl Todo {
    pub fn new(project: Option<ProjectId>, title: String, order: u64) -> Self {
        Self {
            id: TodoId::new(),
            project,
            title,
            is_completed: false,
            completed_at: None,
            is_deleted: false,
            order,
            daily_list: None,
            assigned_daily_list: None,
            created_at: Local::now(),
        }
    }

    /// Assign to a daily list on creation. Also fixes the assigned date.
    pub fn with_daily_list(mut self, date: Option<NaiveDate>) -> Self {
        self.daily_list = date;
        self.assigned_daily_list = date;
        self
    }

    /// Move to another daily list, or to the backlog with `None`
    pub fn move_to(&mut self, date: Option<NaiveDate>) {
        self.daily_list = date;
    }

    pub fn complete(&mut self, at: DateTime<Local>) {
        self.is_completed = true;
        self.completed_at = Some(at);
    }

    pub fn undo_completed(&mut self) {
        self.is_completed = false;
        self.completed_at = None;
    }

    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    /// Not soft-deleted
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }

    /// Calendar date of completion, if completed
    pub fn completed_date(&self) -> Option<NaiveDate> {
        self.completed_at.map(|at| at.date_naive())
    }

    /// Active, not completed and not bound to any daily list
    pub fn is_backlog(&self) -> bool {
        self.is_active() && !self.is_completed && self.daily_list.is_none()
    }
}
