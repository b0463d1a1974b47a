pub mod daily_list;
pub mod enums;
pub mod project;
pub mod todo;
pub mod views;

pub use daily_list::{date_key, parse_date_key, DailyTodoList, DATE_KEY_FORMAT};
pub use enums::{EntityKind, UnassignedPolicy, UseCaseMode};
pub use project::{NewProject, Project, ProjectId};
pub use todo::{Todo, TodoId};
pub use views::{sort_bookmarked_first, todo_models, ProjectModel, TodoModel};
