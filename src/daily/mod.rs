pub mod store;

pub use store::DailyTodoListStore;
