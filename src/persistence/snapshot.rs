use crate::domain::{Project, Todo};
use crate::persistence::{atomic_write, read_file};
use crate::record::{Record, RecordError, Recordable};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Flat dump of the entity store, one record per entity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub projects: Vec<Record>,
    #[serde(default)]
    pub todos: Vec<Record>,
}

impl Snapshot {
    pub fn from_entities(projects: &[Project], todos: &[Todo]) -> Self {
        Self {
            projects: projects.iter().map(Recordable::to_record).collect(),
            todos: todos.iter().map(Recordable::to_record).collect(),
        }
    }

    /// Rebuild the entities; the first malformed record fails the whole load
    pub fn into_entities(self) -> std::result::Result<(Vec<Project>, Vec<Todo>), RecordError> {
        let projects = self
            .projects
            .iter()
            .map(Project::from_record)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let todos = self
            .todos
            .iter()
            .map(Todo::from_record)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok((projects, todos))
    }
}

/// Load a snapshot, returning an empty one if the file doesn't exist
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Snapshot> {
    let path = path.as_ref();
    let content = read_file(path)?;
    if content.trim().is_empty() {
        return Ok(Snapshot::default());
    }
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse snapshot: {}", path.display()))
}

pub fn save_snapshot<P: AsRef<Path>>(path: P, snapshot: &Snapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    atomic_write(path, &json)
}
