//! Entity store boundary.
//!
//! The use cases talk to storage only through [`EntityStore`]. Methods return
//! boxed futures instead of using `async fn` so the store can live behind an
//! `Arc<dyn EntityStore>` chosen at the composition root.

pub mod memory;

pub use memory::InMemoryStore;

use crate::domain::{EntityKind, Project, ProjectId, Todo, TodoId};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors reported by a store implementation
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("{kind} {id} already exists")]
    AlreadyExists { kind: EntityKind, id: String },

    /// The backing service could not be reached or refused the call
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn project_not_found(id: ProjectId) -> Self {
        Self::NotFound {
            kind: EntityKind::Project,
            id: id.to_string(),
        }
    }

    pub fn todo_not_found(id: TodoId) -> Self {
        Self::NotFound {
            kind: EntityKind::Todo,
            id: id.to_string(),
        }
    }
}

/// Boxed future returned by store methods
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Asynchronous, fallible CRUD over projects and todos.
///
/// Writes are last-write-wins; the store is trusted to serialize them.
/// Nothing is ever hard-deleted: soft deletes are plain `update_todo` calls.
pub trait EntityStore: Send + Sync {
    fn create_project(&self, project: Project) -> StoreFuture<'_, Project>;

    /// All projects in creation order
    fn read_projects(&self) -> StoreFuture<'_, Vec<Project>>;

    fn read_project(&self, id: ProjectId) -> StoreFuture<'_, Option<Project>>;

    fn update_project(&self, project: Project) -> StoreFuture<'_, Project>;

    fn create_todo(&self, todo: Todo) -> StoreFuture<'_, Todo>;

    /// Todos owned by a project, soft-deleted ones included
    fn read_todos(&self, project: ProjectId) -> StoreFuture<'_, Vec<Todo>>;

    /// Every todo in the store, soft-deleted ones included
    fn read_all_todos(&self) -> StoreFuture<'_, Vec<Todo>>;

    fn read_todo(&self, id: TodoId) -> StoreFuture<'_, Option<Todo>>;

    fn update_todo(&self, todo: Todo) -> StoreFuture<'_, Todo>;

    /// Write several todos; fails without writing anything if one is unknown
    fn update_todos(&self, todos: Vec<Todo>) -> StoreFuture<'_, Vec<Todo>>;

    /// Create `todo` and rewrite `shifted` as one all-or-nothing write.
    ///
    /// Returns the created todo followed by the rewritten ones. On error
    /// nothing is stored.
    fn insert_todo(&self, todo: Todo, shifted: Vec<Todo>) -> StoreFuture<'_, (Todo, Vec<Todo>)>;
}
