use super::project::ended_projects;
use super::UseCaseFuture;
use crate::domain::{Project, Todo, UnassignedPolicy};
use crate::report::{summarize, ProjectResult};
use crate::store::EntityStore;
use chrono::Local;
use std::sync::Arc;

/// End-of-project result summaries
pub trait ProjectResultUseCase: Send + Sync {
    /// Fetch the project's todos and summarize them; fails as a whole
    fn create<'a>(&'a self, project: &'a Project) -> UseCaseFuture<'a, ProjectResult>;

    /// Results for every ended project
    fn read_list(&self) -> UseCaseFuture<'_, Vec<ProjectResult>>;
}

pub struct DefaultProjectResultUseCase {
    store: Arc<dyn EntityStore>,
    policy: UnassignedPolicy,
}

impl DefaultProjectResultUseCase {
    pub fn new(store: Arc<dyn EntityStore>, policy: UnassignedPolicy) -> Self {
        Self { store, policy }
    }
}

impl ProjectResultUseCase for DefaultProjectResultUseCase {
    fn create<'a>(&'a self, project: &'a Project) -> UseCaseFuture<'a, ProjectResult> {
        Box::pin(async move {
            let todos = self.store.read_todos(project.id).await?;
            Ok(summarize(project, &todos, self.policy))
        })
    }

    fn read_list(&self) -> UseCaseFuture<'_, Vec<ProjectResult>> {
        Box::pin(async move {
            let projects = ended_projects(self.store.as_ref(), Local::now()).await?;
            let mut results = Vec::with_capacity(projects.len());
            for project in &projects {
                let todos = self.store.read_todos(project.id).await?;
                results.push(summarize(project, &todos, self.policy));
            }
            Ok(results)
        })
    }
}

/// Result use case over fixed fixture data
#[derive(Debug, Clone, Default)]
pub struct MockProjectResultUseCase {
    projects: Vec<Project>,
    todos: Vec<Todo>,
    policy: UnassignedPolicy,
}

impl MockProjectResultUseCase {
    pub fn new(projects: Vec<Project>, todos: Vec<Todo>, policy: UnassignedPolicy) -> Self {
        Self {
            projects,
            todos,
            policy,
        }
    }
}

impl ProjectResultUseCase for MockProjectResultUseCase {
    fn create<'a>(&'a self, project: &'a Project) -> UseCaseFuture<'a, ProjectResult> {
        Box::pin(async move { Ok(summarize(project, &self.todos, self.policy)) })
    }

    fn read_list(&self) -> UseCaseFuture<'_, Vec<ProjectResult>> {
        Box::pin(async move {
            let now = Local::now();
            Ok(self
                .projects
                .iter()
                .filter(|p| p.is_ended_at(now))
                .map(|p| summarize(p, &self.todos, self.policy))
                .collect())
        })
    }
}
