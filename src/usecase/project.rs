use super::{Result, UseCaseFuture};
use crate::domain::{sort_bookmarked_first, NewProject, Project};
use crate::store::EntityStore;
use chrono::{DateTime, Local};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Project operations
pub trait ProjectUseCase: Send + Sync {
    /// Create a project; the category is taken as-is, empty included
    fn create(&self, new: NewProject) -> UseCaseFuture<'_, Project>;

    /// Every project, bookmarked ones first
    fn read_list(&self) -> UseCaseFuture<'_, Vec<Project>>;

    fn update<'a>(&'a self, project: &'a Project) -> UseCaseFuture<'a, Project>;

    fn toggle_bookmark<'a>(&'a self, project: &'a Project) -> UseCaseFuture<'a, Project>;

    /// Mark a project as ended at `at`
    fn end<'a>(&'a self, project: &'a Project, at: DateTime<Local>) -> UseCaseFuture<'a, Project>;
}

pub struct DefaultProjectUseCase {
    store: Arc<dyn EntityStore>,
}

impl DefaultProjectUseCase {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }
}

impl ProjectUseCase for DefaultProjectUseCase {
    fn create(&self, new: NewProject) -> UseCaseFuture<'_, Project> {
        Box::pin(async move {
            let project = self.store.create_project(Project::new(new)).await?;
            debug!(project = %project.id, category = %project.category, "project created");
            Ok(project)
        })
    }

    fn read_list(&self) -> UseCaseFuture<'_, Vec<Project>> {
        Box::pin(async move {
            let mut projects = self.store.read_projects().await?;
            sort_bookmarked_first(&mut projects);
            Ok(projects)
        })
    }

    fn update<'a>(&'a self, project: &'a Project) -> UseCaseFuture<'a, Project> {
        Box::pin(async move { Ok(self.store.update_project(project.clone()).await?) })
    }

    fn toggle_bookmark<'a>(&'a self, project: &'a Project) -> UseCaseFuture<'a, Project> {
        Box::pin(async move {
            let mut updated = project.clone();
            updated.toggle_bookmark();
            let saved = self.store.update_project(updated).await?;
            debug!(project = %saved.id, bookmarked = saved.is_bookmarked, "bookmark toggled");
            Ok(saved)
        })
    }

    fn end<'a>(&'a self, project: &'a Project, at: DateTime<Local>) -> UseCaseFuture<'a, Project> {
        Box::pin(async move {
            let mut updated = project.clone();
            updated.end(at);
            let saved = self.store.update_project(updated).await?;
            debug!(project = %saved.id, "project ended");
            Ok(saved)
        })
    }
}

/// Store-less project use case backed by a plain list
#[derive(Debug, Default)]
pub struct MockProjectUseCase {
    projects: Mutex<Vec<Project>>,
}

impl MockProjectUseCase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing set of projects
    pub fn with_projects(projects: Vec<Project>) -> Self {
        Self {
            projects: Mutex::new(projects),
        }
    }

    fn remember(&self, project: &Project) {
        let mut projects = self.projects.lock().unwrap_or_else(|e| e.into_inner());
        match projects.iter_mut().find(|p| p.id == project.id) {
            Some(slot) => *slot = project.clone(),
            None => projects.push(project.clone()),
        }
    }
}

impl ProjectUseCase for MockProjectUseCase {
    fn create(&self, new: NewProject) -> UseCaseFuture<'_, Project> {
        Box::pin(async move {
            let project = Project::new(new);
            self.remember(&project);
            Ok(project)
        })
    }

    fn read_list(&self) -> UseCaseFuture<'_, Vec<Project>> {
        Box::pin(async move {
            let mut projects = self.projects.lock().unwrap_or_else(|e| e.into_inner()).clone();
            sort_bookmarked_first(&mut projects);
            Ok(projects)
        })
    }

    fn update<'a>(&'a self, project: &'a Project) -> UseCaseFuture<'a, Project> {
        Box::pin(async move {
            self.remember(project);
            Ok(project.clone())
        })
    }

    fn toggle_bookmark<'a>(&'a self, project: &'a Project) -> UseCaseFuture<'a, Project> {
        Box::pin(async move {
            let mut updated = project.clone();
            updated.toggle_bookmark();
            self.remember(&updated);
            Ok(updated)
        })
    }

    fn end<'a>(&'a self, project: &'a Project, at: DateTime<Local>) -> UseCaseFuture<'a, Project> {
        Box::pin(async move {
            let mut updated = project.clone();
            updated.end(at);
            self.remember(&updated);
            Ok(updated)
        })
    }
}

/// Shared by the result use cases: projects that are over as of `now`
pub(crate) async fn ended_projects(
    store: &dyn EntityStore,
    now: DateTime<Local>,
) -> Result<Vec<Project>> {
    Ok(store
        .read_projects()
        .await?
        .into_iter()
        .filter(|p| p.is_ended_at(now))
        .collect())
}
