//! Projects, todos and daily todo lists, with end-of-project summaries.
//!
//! The crate is organised leaf first: [`domain`] types, the async
//! [`store::EntityStore`], the date-keyed [`daily::DailyTodoListStore`], the
//! [`usecase`] traits the presentation layer calls, and the pure
//! [`report::summarize`] aggregation. [`app::App`] wires everything together
//! from a [`config::Config`].

pub mod app;
pub mod config;
pub mod daily;
pub mod debounce;
pub mod domain;
pub mod notifications;
pub mod persistence;
pub mod record;
pub mod report;
pub mod store;
pub mod usecase;
