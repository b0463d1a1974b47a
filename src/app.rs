//! Composition root: builds the store, the daily index and the use cases from
//! a [`Config`] and hands them out as shared trait objects.

use crate::config::{config_file, load_config, Config};
use crate::daily::DailyTodoListStore;
use crate::debounce::TitleWriter;
use crate::domain::{sort_bookmarked_first, DailyTodoList, Project, ProjectModel, Todo, UseCaseMode};
use crate::persistence::{load_snapshot, save_snapshot, Snapshot};
use crate::report::ProjectResult;
use crate::store::{EntityStore, InMemoryStore};
use crate::usecase::{
    DailyTodoListUseCase, DefaultProjectResultUseCase, DefaultProjectUseCase, DefaultTodoUseCase,
    MockProjectResultUseCase, MockProjectUseCase, MockTodoUseCase, ProjectResultUseCase,
    ProjectUseCase, TodoUseCase,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Every component of a running application
pub struct App {
    pub config: Config,
    data_dir: PathBuf,
    store: Arc<InMemoryStore>,
    daily: Arc<DailyTodoListStore>,
    pub projects: Arc<dyn ProjectUseCase>,
    pub todos: Arc<dyn TodoUseCase>,
    pub daily_lists: Arc<DailyTodoListUseCase>,
    pub results: Arc<dyn ProjectResultUseCase>,
}

impl App {
    /// Wire the components around a store seeded with `projects` and `todos`
    pub fn new(config: Config, data_dir: PathBuf, projects: Vec<Project>, todos: Vec<Todo>) -> Self {
        let store = Arc::new(InMemoryStore::with_contents(projects.clone(), todos.clone()));
        let daily = Arc::new(DailyTodoListStore::new());
        daily.rebuild(&todos);

        let entity_store: Arc<dyn EntityStore> = store.clone();
        let (project_uc, todo_uc, result_uc): (
            Arc<dyn ProjectUseCase>,
            Arc<dyn TodoUseCase>,
            Arc<dyn ProjectResultUseCase>,
        ) = match config.use_case_mode {
            UseCaseMode::Default => (
                Arc::new(DefaultProjectUseCase::new(entity_store.clone())),
                Arc::new(DefaultTodoUseCase::new(entity_store.clone(), daily.clone())),
                Arc::new(DefaultProjectResultUseCase::new(
                    entity_store.clone(),
                    config.unassigned_policy,
                )),
            ),
            UseCaseMode::Mock => (
                Arc::new(MockProjectUseCase::with_projects(projects.clone())),
                Arc::new(MockTodoUseCase::new()),
                Arc::new(MockProjectResultUseCase::new(
                    projects,
                    todos,
                    config.unassigned_policy,
                )),
            ),
        };
        let daily_lists = Arc::new(DailyTodoListUseCase::new(entity_store, daily.clone()));

        debug!(mode = ?config.use_case_mode, data_dir = %data_dir.display(), "app wired");
        Self {
            config,
            data_dir,
            store,
            daily,
            projects: project_uc,
            todos: todo_uc,
            daily_lists,
            results: result_uc,
        }
    }

    /// Load config and snapshot from `data_dir`
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config = load_config(config_file(data_dir))?;
        let snapshot_path = config.snapshot_path(data_dir);
        let (projects, todos) = load_snapshot(&snapshot_path)?
            .into_entities()
            .with_context(|| format!("Invalid snapshot: {}", snapshot_path.display()))?;
        Ok(Self::new(config, data_dir.to_path_buf(), projects, todos))
    }

    /// Write the store back to the snapshot file
    pub async fn save(&self) -> Result<()> {
        if self.config.use_case_mode == UseCaseMode::Mock {
            warn!("mock use cases are active; nothing is saved");
            return Ok(());
        }
        let (projects, todos) = self.store.contents().await;
        save_snapshot(
            self.config.snapshot_path(&self.data_dir),
            &Snapshot::from_entities(&projects, &todos),
        )
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn store(&self) -> Arc<dyn EntityStore> {
        self.store.clone()
    }

    pub fn daily(&self) -> Arc<DailyTodoListStore> {
        self.daily.clone()
    }

    /// Debounced title writer bound to this app's store and todo use case
    pub fn title_writer(&self) -> TitleWriter {
        TitleWriter::spawn(self.config.debounce_interval(), self.store(), self.todos.clone())
    }

    /// Project whose id starts with `prefix`
    pub async fn find_project(&self, prefix: &str) -> Result<Project> {
        let projects = self.store.read_projects().await?;
        unique_match(projects, prefix, |p| p.id.to_string(), "project")
    }

    /// Todo whose id starts with `prefix`
    pub async fn find_todo(&self, prefix: &str) -> Result<Todo> {
        let todos = self.store.read_all_todos().await?;
        unique_match(todos, prefix, |t| t.id.to_string(), "todo")
    }

    /// Per-project views, bookmarked projects first
    pub async fn project_models(&self) -> Result<Vec<ProjectModel>> {
        let mut projects = self.store.read_projects().await?;
        sort_bookmarked_first(&mut projects);
        let todos = self.store.read_all_todos().await?;
        Ok(projects
            .into_iter()
            .map(|project| ProjectModel::new(project, todos.iter().cloned()))
            .collect())
    }

    pub async fn project_results(&self) -> Result<Vec<ProjectResult>> {
        Ok(self.results.read_list().await?)
    }

    /// The daily list for `date`, made current
    pub async fn open_day(&self, date: NaiveDate) -> Result<Arc<DailyTodoList>> {
        Ok(self.daily_lists.fetch(date).await?)
    }
}

fn unique_match<T>(
    items: Vec<T>,
    prefix: &str,
    id: impl Fn(&T) -> String,
    kind: &str,
) -> Result<T> {
    let mut matches: Vec<T> = items
        .into_iter()
        .filter(|item| id(item).starts_with(prefix))
        .collect();
    match matches.len() {
        0 => anyhow::bail!("No {} matches id '{}'", kind, prefix),
        1 => Ok(matches.remove(0)),
        n => anyhow::bail!("{} {}s match id '{}'; use a longer prefix", n, kind, prefix),
    }
}

/// Short form of an id for listings
pub fn short_id(id: impl std::fmt::Display) -> String {
    id.to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewProject;
    use crate::persistence::read_file;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_empty_data_dir() {
        let temp_dir = tempdir().unwrap();
        let app = App::load(temp_dir.path()).unwrap();
        assert!(app.projects.read_list().await.unwrap().is_empty());
        assert!(app.daily().dates().is_empty());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let temp_dir = tempdir().unwrap();
        let app = App::load(temp_dir.path()).unwrap();
        let project = app
            .projects
            .create(NewProject {
                category: "MC3".to_string(),
                ..NewProject::default()
            })
            .await
            .unwrap();
        let day = NaiveDate::from_ymd_opt(2023, 7, 20).unwrap();
        app.todos.create(&project, Some(day), "Write").await.unwrap();
        app.save().await.unwrap();

        let reloaded = App::load(temp_dir.path()).unwrap();
        let list = reloaded.daily().get_list("2023-07-20").unwrap();
        assert_eq!(list.todos[0].title, "Write");
        let found = reloaded.find_project(&short_id(project.id)).await.unwrap();
        assert_eq!(found.id, project.id);
    }

    #[tokio::test]
    async fn test_mock_mode_does_not_touch_snapshot() {
        let temp_dir = tempdir().unwrap();
        let config = Config {
            use_case_mode: UseCaseMode::Mock,
            ..Config::default()
        };
        let app = App::new(config, temp_dir.path().to_path_buf(), Vec::new(), Vec::new());
        let project = app.projects.create(NewProject::default()).await.unwrap();
        app.todos.create(&project, None, "preview").await.unwrap();
        app.save().await.unwrap();

        assert!(app.store.contents().await.1.is_empty());
        assert_eq!(read_file(temp_dir.path().join("snapshot.json")).unwrap(), "");
    }

    #[tokio::test]
    async fn test_find_todo_by_prefix() {
        let temp_dir = tempdir().unwrap();
        let app = App::load(temp_dir.path()).unwrap();
        let project = app.projects.create(NewProject::default()).await.unwrap();
        let todo = app.todos.create(&project, None, "Write").await.unwrap();

        assert_eq!(app.find_todo(&short_id(todo.id)).await.unwrap().id, todo.id);
        assert!(app.find_todo("zzzz").await.is_err());
    }
}
