use super::project::Project;
use super::todo::Todo;
use chrono::NaiveDate;

/// A todo paired with the category of its project, as shown in lists
#[derive(Debug, Clone, PartialEq)]
pub struct TodoModel {
    pub todo: Todo,
    /// Category of the owning project (empty for loose todos)
    pub category: String,
}

/// Attach project categories to todos for display
pub fn todo_models(todos: &[Todo], projects: &[Project]) -> Vec<TodoModel> {
    todos
        .iter()
        .map(|todo| TodoModel {
            todo: todo.clone(),
            category: todo
                .project
                .and_then(|id| projects.iter().find(|p| p.id == id))
                .map(|p| p.category.clone())
                .unwrap_or_default(),
        })
        .collect()
}

/// A project together with the todos it owns, with derived counts
#[derive(Debug, Clone)]
pub struct ProjectModel {
    pub project: Project,
    /// All todos of the project (including soft-deleted), ascending by order
    pub todos: Vec<Todo>,
}

impl ProjectModel {
    pub fn new(project: Project, todos: impl IntoIterator<Item = Todo>) -> Self {
        let mut todos: Vec<Todo> = todos
            .into_iter()
            .filter(|todo| todo.project == Some(project.id))
            .collect();
        todos.sort_by_key(|todo| (todo.order, todo.created_at));
        Self { project, todos }
    }

    fn active(&self) -> impl Iterator<Item = &Todo> {
        self.todos.iter().filter(|todo| todo.is_active())
    }

    pub fn total_todos_count(&self) -> usize {
        self.active().count()
    }

    pub fn completed_todos_count(&self) -> usize {
        self.active().filter(|todo| todo.is_completed).count()
    }

    /// Open todos not yet placed on any daily list
    pub fn backlog_todos(&self) -> Vec<&Todo> {
        self.active().filter(|todo| todo.is_backlog()).collect()
    }

    /// Open todos whose daily list date has already passed
    pub fn cold_todos(&self, today: NaiveDate) -> Vec<&Todo> {
        self.active()
            .filter(|todo| !todo.is_completed)
            .filter(|todo| todo.daily_list.is_some_and(|date| date < today))
            .collect()
    }

    /// "completed/total" label
    pub fn progress_label(&self) -> String {
        format!("{}/{}", self.completed_todos_count(), self.total_todos_count())
    }
}

/// Sort projects with bookmarked ones first, otherwise keeping input order
pub fn sort_bookmarked_first(projects: &mut [Project]) {
    projects.sort_by_key(|project| !project.is_bookmarked);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::project::NewProject;
    use chrono::Local;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 7, day).unwrap()
    }

    fn project(category: &str) -> Project {
        Project::new(NewProject {
            category: category.to_string(),
            ..NewProject::default()
        })
    }

    #[test]
    fn test_project_model_counts() {
        let p = project("MC3");
        let mut done = Todo::new(Some(p.id), "done".to_string(), 1);
        done.complete(Local::now());
        let open = Todo::new(Some(p.id), "open".to_string(), 2);
        let mut deleted = Todo::new(Some(p.id), "deleted".to_string(), 3);
        deleted.soft_delete();
        let foreign = Todo::new(None, "other".to_string(), 4);

        let model = ProjectModel::new(p, vec![open, deleted, done, foreign]);
        assert_eq!(model.todos.len(), 3);
        assert_eq!(model.todos[0].title, "done");
        assert_eq!(model.total_todos_count(), 2);
        assert_eq!(model.completed_todos_count(), 1);
        assert_eq!(model.progress_label(), "1/2");
    }

    #[test]
    fn test_backlog_and_cold_todos() {
        let p = project("MC3");
        let loose = Todo::new(Some(p.id), "loose".to_string(), 1);
        let stale = Todo::new(Some(p.id), "stale".to_string(), 2).with_daily_list(Some(date(18)));
        let today = Todo::new(Some(p.id), "today".to_string(), 3).with_daily_list(Some(date(20)));
        let mut stale_done =
            Todo::new(Some(p.id), "stale done".to_string(), 4).with_daily_list(Some(date(18)));
        stale_done.complete(Local::now());

        let model = ProjectModel::new(p, vec![loose, stale, today, stale_done]);

        let backlog: Vec<_> = model.backlog_todos().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(backlog, vec!["loose"]);

        let cold: Vec<_> = model.cold_todos(date(20)).iter().map(|t| t.title.as_str()).collect();
        assert_eq!(cold, vec!["stale"]);
    }

    #[test]
    fn test_sort_bookmarked_first() {
        let a = project("a");
        let mut b = project("b");
        b.is_bookmarked = true;
        let c = project("c");
        let mut projects = vec![a, b, c];

        sort_bookmarked_first(&mut projects);
        let order: Vec<_> = projects.iter().map(|p| p.category.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_todo_models_category() {
        let p = project("MC3");
        let owned = Todo::new(Some(p.id), "owned".to_string(), 0);
        let loose = Todo::new(None, "loose".to_string(), 1);

        let models = todo_models(&[owned, loose], &[p]);
        assert_eq!(models[0].category, "MC3");
        assert_eq!(models[1].category, "");
    }
}
