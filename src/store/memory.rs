use super::{EntityStore, StoreError, StoreFuture};
use crate::domain::{EntityKind, Project, ProjectId, Todo, TodoId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    projects: Vec<Project>,
    todos: Vec<Todo>,
}

/// In-process entity store.
///
/// Counts every call so callers can assert a validation failure never reached
/// storage, and can be switched into a failing mode to exercise error paths.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    calls: AtomicUsize,
    failure: Mutex<Option<StoreError>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with entities (e.g. from a snapshot file)
    pub fn with_contents(projects: Vec<Project>, todos: Vec<Todo>) -> Self {
        Self {
            tables: RwLock::new(Tables { projects, todos }),
            ..Self::default()
        }
    }

    /// Copy of everything in the store
    pub async fn contents(&self) -> (Vec<Project>, Vec<Todo>) {
        let tables = self.tables.read().await;
        (tables.projects.clone(), tables.todos.clone())
    }

    /// Number of store calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every following call fail with `error` (None restores normal operation)
    pub fn set_failure(&self, error: Option<StoreError>) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = error;
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl EntityStore for InMemoryStore {
    fn create_project(&self, project: Project) -> StoreFuture<'_, Project> {
        Box::pin(async move {
            self.enter()?;
            let mut tables = self.tables.write().await;
            if tables.projects.iter().any(|p| p.id == project.id) {
                return Err(StoreError::AlreadyExists {
                    kind: EntityKind::Project,
                    id: project.id.to_string(),
                });
            }
            tables.projects.push(project.clone());
            Ok(project)
        })
    }

    fn read_projects(&self) -> StoreFuture<'_, Vec<Project>> {
        Box::pin(async move {
            self.enter()?;
            Ok(self.tables.read().await.projects.clone())
        })
    }

    fn read_project(&self, id: ProjectId) -> StoreFuture<'_, Option<Project>> {
        Box::pin(async move {
            self.enter()?;
            let tables = self.tables.read().await;
            Ok(tables.projects.iter().find(|p| p.id == id).cloned())
        })
    }

    fn update_project(&self, project: Project) -> StoreFuture<'_, Project> {
        Box::pin(async move {
            self.enter()?;
            let mut tables = self.tables.write().await;
            let slot = tables
                .projects
                .iter_mut()
                .find(|p| p.id == project.id)
                .ok_or_else(|| StoreError::project_not_found(project.id))?;
            *slot = project.clone();
            Ok(project)
        })
    }

    fn create_todo(&self, todo: Todo) -> StoreFuture<'_, Todo> {
        Box::pin(async move {
            self.enter()?;
            let mut tables = self.tables.write().await;
            if tables.todos.iter().any(|t| t.id == todo.id) {
                return Err(StoreError::AlreadyExists {
                    kind: EntityKind::Todo,
                    id: todo.id.to_string(),
                });
            }
            tables.todos.push(todo.clone());
            Ok(todo)
        })
    }

    fn read_todos(&self, project: ProjectId) -> StoreFuture<'_, Vec<Todo>> {
        Box::pin(async move {
            self.enter()?;
            let tables = self.tables.read().await;
            Ok(tables
                .todos
                .iter()
                .filter(|t| t.project == Some(project))
                .cloned()
                .collect())
        })
    }

    fn read_all_todos(&self) -> StoreFuture<'_, Vec<Todo>> {
        Box::pin(async move {
            self.enter()?;
            Ok(self.tables.read().await.todos.clone())
        })
    }

    fn read_todo(&self, id: TodoId) -> StoreFuture<'_, Option<Todo>> {
        Box::pin(async move {
            self.enter()?;
            let tables = self.tables.read().await;
            Ok(tables.todos.iter().find(|t| t.id == id).cloned())
        })
    }

    fn update_todo(&self, todo: Todo) -> StoreFuture<'_, Todo> {
        Box::pin(async move {
            self.enter()?;
            let mut tables = self.tables.write().await;
            let slot = tables
                .todos
                .iter_mut()
                .find(|t| t.id == todo.id)
                .ok_or_else(|| StoreError::todo_not_found(todo.id))?;
            *slot = todo.clone();
            Ok(todo)
        })
    }

    fn update_todos(&self, todos: Vec<Todo>) -> StoreFuture<'_, Vec<Todo>> {
        Box::pin(async move {
            self.enter()?;
            let mut tables = self.tables.write().await;
            if let Some(missing) = todos
                .iter()
                .find(|todo| !tables.todos.iter().any(|t| t.id == todo.id))
            {
                return Err(StoreError::todo_not_found(missing.id));
            }
            for todo in &todos {
                if let Some(slot) = tables.todos.iter_mut().find(|t| t.id == todo.id) {
                    *slot = todo.clone();
                }
            }
            Ok(todos)
        })
    }

    fn insert_todo(&self, todo: Todo, shifted: Vec<Todo>) -> StoreFuture<'_, (Todo, Vec<Todo>)> {
        Box::pin(async move {
            self.enter()?;
            let mut tables = self.tables.write().await;
            if tables.todos.iter().any(|t| t.id == todo.id) {
                return Err(StoreError::AlreadyExists {
                    kind: EntityKind::Todo,
                    id: todo.id.to_string(),
                });
            }
            if let Some(missing) = shifted
                .iter()
                .find(|s| !tables.todos.iter().any(|t| t.id == s.id))
            {
                return Err(StoreError::todo_not_found(missing.id));
            }
            for todo in &shifted {
                if let Some(slot) = tables.todos.iter_mut().find(|t| t.id == todo.id) {
                    *slot = todo.clone();
                }
            }
            tables.todos.push(todo.clone());
            Ok((todo, shifted))
        })
    }
}
