use super::{validate_title, Result, UseCaseError, UseCaseFuture};
use crate::daily::DailyTodoListStore;
use crate::domain::{Project, Todo};
use crate::store::{EntityStore, StoreError};
use chrono::{DateTime, Local, NaiveDate};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Single-todo operations.
///
/// Mutations identify the todo by id and change only their own field on the
/// stored copy; the rest of the passed-in todo may be stale.
pub trait TodoUseCase: Send + Sync {
    /// Append a new todo to `project`, optionally placing it on a daily list
    fn create<'a>(
        &'a self,
        project: &'a Project,
        daily_list: Option<NaiveDate>,
        title: &'a str,
    ) -> UseCaseFuture<'a, Todo>;

    /// Insert a todo right after `todo`, in the same project and daily list.
    /// Deleted anchors are rejected.
    fn create_after<'a>(&'a self, todo: &'a Todo, title: &'a str) -> UseCaseFuture<'a, Todo>;

    fn update<'a>(&'a self, todo: &'a Todo, title: &'a str) -> UseCaseFuture<'a, Todo>;

    fn complete<'a>(&'a self, todo: &'a Todo, at: DateTime<Local>) -> UseCaseFuture<'a, Todo>;

    fn undo_completed<'a>(&'a self, todo: &'a Todo) -> UseCaseFuture<'a, Todo>;

    /// Soft delete
    fn delete<'a>(&'a self, todo: &'a Todo) -> UseCaseFuture<'a, Todo>;

    /// Reassign to another daily list, or back to the backlog with None
    fn move_to<'a>(
        &'a self,
        todo: &'a Todo,
        daily_list: Option<NaiveDate>,
    ) -> UseCaseFuture<'a, Todo>;
}

/// Store-backed todo use case that keeps the daily index in sync
pub struct DefaultTodoUseCase {
    store: Arc<dyn EntityStore>,
    daily: Arc<DailyTodoListStore>,
}

impl DefaultTodoUseCase {
    pub fn new(store: Arc<dyn EntityStore>, daily: Arc<DailyTodoListStore>) -> Self {
        Self { store, daily }
    }

    async fn next_order(&self) -> Result<u64> {
        let todos = self.store.read_all_todos().await?;
        Ok(todos.iter().map(|t| t.order + 1).max().unwrap_or(0))
    }

    /// Apply `change` to the stored copy of `todo` and write it back.
    ///
    /// Only the field the operation owns is changed; whatever else the caller's
    /// copy holds is ignored, so a stale copy cannot revert other edits.
    async fn modify(&self, todo: &Todo, change: impl FnOnce(&mut Todo)) -> Result<Todo> {
        let mut current = self
            .store
            .read_todo(todo.id)
            .await?
            .ok_or_else(|| StoreError::todo_not_found(todo.id))?;
        change(&mut current);
        let saved = self.store.update_todo(current).await?;
        self.daily.apply(&saved);
        Ok(saved)
    }
}

impl TodoUseCase for DefaultTodoUseCase {
    fn create<'a>(
        &'a self,
        project: &'a Project,
        daily_list: Option<NaiveDate>,
        title: &'a str,
    ) -> UseCaseFuture<'a, Todo> {
        Box::pin(async move {
            validate_title(title)?;
            let order = self.next_order().await?;
            let todo = Todo::new(Some(project.id), title.to_string(), order)
                .with_daily_list(daily_list);
            let created = self.store.create_todo(todo).await?;
            self.daily.apply(&created);
            debug!(todo = %created.id, project = %project.id, ?daily_list, "todo created");
            Ok(created)
        })
    }

    fn create_after<'a>(&'a self, todo: &'a Todo, title: &'a str) -> UseCaseFuture<'a, Todo> {
        Box::pin(async move {
            validate_title(title)?;
            if todo.is_deleted {
                return Err(UseCaseError::DeletedAnchor);
            }

            let todos = self.store.read_all_todos().await?;
            let anchor = todos
                .iter()
                .find(|t| t.id == todo.id)
                .ok_or_else(|| StoreError::todo_not_found(todo.id))?;
            if anchor.is_deleted {
                return Err(UseCaseError::DeletedAnchor);
            }

            let next = Todo::new(anchor.project, title.to_string(), anchor.order + 1)
                .with_daily_list(anchor.daily_list);
            let shifted: Vec<Todo> = todos
                .iter()
                .filter(|t| t.order > anchor.order)
                .cloned()
                .map(|mut t| {
                    t.order += 1;
                    t
                })
                .collect();

            let (created, shifted) = self.store.insert_todo(next, shifted).await?;
            for saved in &shifted {
                self.daily.apply(saved);
            }
            self.daily.apply(&created);
            debug!(todo = %created.id, after = %anchor.id, shifted = shifted.len(), "todo created after");
            Ok(created)
        })
    }

    fn update<'a>(&'a self, todo: &'a Todo, title: &'a str) -> UseCaseFuture<'a, Todo> {
        Box::pin(async move {
            validate_title(title)?;
            let saved = self.modify(todo, |t| t.title = title.to_string()).await?;
            debug!(todo = %saved.id, "todo title updated");
            Ok(saved)
        })
    }

    fn complete<'a>(&'a self, todo: &'a Todo, at: DateTime<Local>) -> UseCaseFuture<'a, Todo> {
        Box::pin(async move {
            let saved = self.modify(todo, |t| t.complete(at)).await?;
            debug!(todo = %saved.id, "todo completed");
            Ok(saved)
        })
    }

    fn undo_completed<'a>(&'a self, todo: &'a Todo) -> UseCaseFuture<'a, Todo> {
        Box::pin(async move {
            let saved = self.modify(todo, Todo::undo_completed).await?;
            debug!(todo = %saved.id, "todo completion undone");
            Ok(saved)
        })
    }

    fn delete<'a>(&'a self, todo: &'a Todo) -> UseCaseFuture<'a, Todo> {
        Box::pin(async move {
            let saved = self.modify(todo, Todo::soft_delete).await?;
            debug!(todo = %saved.id, "todo deleted");
            Ok(saved)
        })
    }

    fn move_to<'a>(
        &'a self,
        todo: &'a Todo,
        daily_list: Option<NaiveDate>,
    ) -> UseCaseFuture<'a, Todo> {
        Box::pin(async move {
            let saved = self.modify(todo, |t| t.move_to(daily_list)).await?;
            debug!(todo = %saved.id, ?daily_list, "todo moved");
            Ok(saved)
        })
    }
}

/// Store-less todo use case for previews and tests.
///
/// Returns the transformed entity without persisting anything; orders come
/// from a local counter.
#[derive(Debug, Default)]
pub struct MockTodoUseCase {
    next_order: AtomicU64,
}

impl MockTodoUseCase {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TodoUseCase for MockTodoUseCase {
    fn create<'a>(
        &'a self,
        project: &'a Project,
        daily_list: Option<NaiveDate>,
        title: &'a str,
    ) -> UseCaseFuture<'a, Todo> {
        Box::pin(async move {
            validate_title(title)?;
            let order = self.next_order.fetch_add(1, Ordering::Relaxed);
            Ok(Todo::new(Some(project.id), title.to_string(), order).with_daily_list(daily_list))
        })
    }

    fn create_after<'a>(&'a self, todo: &'a Todo, title: &'a str) -> UseCaseFuture<'a, Todo> {
        Box::pin(async move {
            validate_title(title)?;
            if todo.is_deleted {
                return Err(UseCaseError::DeletedAnchor);
            }
            Ok(Todo::new(todo.project, title.to_string(), todo.order + 1)
                .with_daily_list(todo.daily_list))
        })
    }

    fn update<'a>(&'a self, todo: &'a Todo, title: &'a str) -> UseCaseFuture<'a, Todo> {
        Box::pin(async move {
            validate_title(title)?;
            let mut updated = todo.clone();
            updated.title = title.to_string();
            Ok(updated)
        })
    }

    fn complete<'a>(&'a self, todo: &'a Todo, at: DateTime<Local>) -> UseCaseFuture<'a, Todo> {
        Box::pin(async move {
            let mut updated = todo.clone();
            updated.complete(at);
            Ok(updated)
        })
    }

    fn undo_completed<'a>(&'a self, todo: &'a Todo) -> UseCaseFuture<'a, Todo> {
        Box::pin(async move {
            let mut updated = todo.clone();
            updated.undo_completed();
            Ok(updated)
        })
    }

    fn delete<'a>(&'a self, todo: &'a Todo) -> UseCaseFuture<'a, Todo> {
        Box::pin(async move {
            let mut updated = todo.clone();
            updated.soft_delete();
            Ok(updated)
        })
    }

    fn move_to<'a>(
        &'a self,
        todo: &'a Todo,
        daily_list: Option<NaiveDate>,
    ) -> UseCaseFuture<'a, Todo> {
        Box::pin(async move {
            let mut updated = todo.clone();
            updated.move_to(daily_list);
            Ok(updated)
        })
    }
}
