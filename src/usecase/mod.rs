//! Use cases: the operations the presentation layer calls.
//!
//! Each capability is a trait with a store-backed `Default*` variant and a
//! store-less `Mock*` variant. The composition root picks one per
//! [`UseCaseMode`](crate::domain::UseCaseMode) and hands it out as an `Arc<dyn _>`.

pub mod daily;
pub mod project;
pub mod result;
pub mod todo;

pub use daily::{DailyHeader, DailyTodoListUseCase};
pub use project::{DefaultProjectUseCase, MockProjectUseCase, ProjectUseCase};
pub use result::{DefaultProjectResultUseCase, MockProjectResultUseCase, ProjectResultUseCase};
pub use todo::{DefaultTodoUseCase, MockTodoUseCase, TodoUseCase};

use crate::store::StoreError;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors returned to the presentation layer
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UseCaseError {
    /// Rejected before any store call
    #[error("title must not be empty")]
    EmptyTitle,

    /// `create_after` anchored on a soft-deleted todo
    #[error("cannot insert after a deleted todo")]
    DeletedAnchor,

    /// Propagated unchanged from the entity store
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, UseCaseError>;

/// Boxed future returned by use case methods
pub type UseCaseFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Reject blank titles
pub(crate) fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(UseCaseError::EmptyTitle);
    }
    Ok(())
}
