use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(Uuid);

impl ProjectId {
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

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Fields needed to create a project
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub category: String,
    pub goals: Option<String>,
    pub started_at: Option<DateTime<Local>>,
    pub ended_at: Option<DateTime<Local>>,
}

/// A project groups todos under a category label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    /// Category label shown next to each todo (not validated, may be empty)
    pub category: String,
    /// Optional free-text goals
    #[serde(default)]
    pub goals: Option<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub is_bookmarked: bool,
    /// Explicitly ended, regardless of `ended_at`
    #[serde(default)]
    pub ended: bool,
}

impl Project {
    pub fn new(new: NewProject) -> Self {
        Self {
            id: ProjectId::new(),
            category: new.category,
            goals: new.goals,
            started_at: new.started_at,
            ended_at: new.ended_at,
            is_bookmarked: false,
            ended: false,
        }
    }

    /// Whether the project is over as of `now`
    pub fn is_ended_at(&self, now: DateTime<Local>) -> bool {
        self.ended || self.ended_at.is_some_and(|ended_at| ended_at < now)
    }

    /// Whether the project is over right now
    pub fn is_ended(&self) -> bool {
        self.is_ended_at(Local::now())
    }

    /// Mark the project as ended now, keeping an earlier `ended_at` if present
    pub fn end(&mut self, now: DateTime<Local>) {
        self.ended = true;
        if self.ended_at.map_or(true, |ended_at| ended_at > now) {
            self.ended_at = Some(now);
        }
    }

    pub fn toggle_bookmark(&mut self) {
        self.is_bookmarked = !self.is_bookmarked;
    }
}
