pub mod generator;
pub mod result;

pub use generator::{generate_report, render_report};
pub use result::{summarize, ProjectResult};
