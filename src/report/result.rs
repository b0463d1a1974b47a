use crate::domain::{Project, Todo, UnassignedPolicy};
use crate::report::generator::format_percent;

/// Partitions of a project's todos at query time
#[derive(Debug, Clone)]
pub struct ProjectResult {
    pub project: Project,
    pub policy: UnassignedPolicy,
    /// Every todo of the project, ascending by order
    pub all: Vec<Todo>,
    /// Soft-deleted, kept for reporting
    pub deleted: Vec<Todo>,
    /// Active and completed
    pub completed: Vec<Todo>,
    /// Active and not completed
    pub backlog: Vec<Todo>,
    /// Completed on the date of the daily list assigned at creation
    pub daily_completed: Vec<Todo>,
    /// Completed on any other day (or never scheduled, by policy)
    pub delayed: Vec<Todo>,
    /// Completed without an assigned daily list under `UnassignedPolicy::Exclude`
    pub unscheduled: Vec<Todo>,
}

/// Where a completed todo lands in the on-time/delayed split
fn classify(todo: &Todo, policy: UnassignedPolicy) -> Timeliness {
    match (todo.assigned_daily_list, todo.completed_date()) {
        (Some(assigned), Some(done)) if done == assigned => Timeliness::OnTime,
        (Some(_), _) => Timeliness::Delayed,
        (None, _) => match policy {
            UnassignedPolicy::CountAsDelayed => Timeliness::Delayed,
            UnassignedPolicy::Exclude => Timeliness::Unscheduled,
        },
    }
}

enum Timeliness {
    OnTime,
    Delayed,
    Unscheduled,
}

/// Classify the todos belonging to `project`.
///
/// Todos owned by other projects are ignored, so the full todo collection
/// can be passed in.
pub fn summarize(project: &Project, todos: &[Todo], policy: UnassignedPolicy) -> ProjectResult {
    let mut all: Vec<Todo> = todos
        .iter()
        .filter(|todo| todo.project == Some(project.id))
        .cloned()
        .collect();
    all.sort_by_key(|todo| (todo.order, todo.created_at));

    let mut result = ProjectResult {
        project: project.clone(),
        policy,
        all: Vec::new(),
        deleted: Vec::new(),
        completed: Vec::new(),
        backlog: Vec::new(),
        daily_completed: Vec::new(),
        delayed: Vec::new(),
        unscheduled: Vec::new(),
    };

    for todo in &all {
        if todo.is_deleted {
            result.deleted.push(todo.clone());
            continue;
        }
        if !todo.is_completed {
            result.backlog.push(todo.clone());
            continue;
        }

        result.completed.push(todo.clone());
        match classify(todo, policy) {
            Timeliness::OnTime => result.daily_completed.push(todo.clone()),
            Timeliness::Delayed => result.delayed.push(todo.clone()),
            Timeliness::Unscheduled => result.unscheduled.push(todo.clone()),
        }
    }

    result.all = all;
    result
}

fn count_label(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

impl ProjectResult {
    /// Todos that are not soft-deleted
    pub fn active_count(&self) -> usize {
        self.all.len() - self.deleted.len()
    }

    /// Share of active todos completed, 0.0 to 100.0
    pub fn completion_percent(&self) -> f64 {
        let active = self.active_count();
        if active == 0 {
            return 0.0;
        }
        self.completed.len() as f64 / active as f64 * 100.0
    }

    /// One-line summary, e.g. "3 completed, 1 delayed"
    pub fn headline(&self) -> String {
        format!("{} completed, {} delayed", self.completed.len(), self.delayed.len())
    }

    /// One line per partition, ready for display
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!(
                "{} ({} complete)",
                count_label(self.active_count(), "todo", "todos"),
                format_percent(self.completion_percent())
            ),
            self.headline(),
            format!("{} on their day", self.daily_completed.len()),
            format!("{} still open", self.backlog.len()),
        ];
        if !self.unscheduled.is_empty() {
            lines.push(format!("{} completed without a day", self.unscheduled.len()));
        }
        if !self.deleted.is_empty() {
            lines.push(format!("{} deleted", self.deleted.len()));
        }
        lines
    }

    /// Titles of todos left open, in order
    pub fn incomplete_titles(&self) -> Vec<&str> {
        self.backlog.iter().map(|todo| todo.title.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewProject;
    use chrono::{Local, NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 7, day).unwrap()
    }

    fn project() -> Project {
        Project::new(NewProject {
            category: "MC3".to_string(),
            ..NewProject::default()
        })
    }

    fn todo(project: &Project, title: &str, order: u64, day: Option<u32>) -> Todo {
        Todo::new(Some(project.id), title.to_string(), order).with_daily_list(day.map(date))
    }

    fn done_on(mut todo: Todo, day: u32) -> Todo {
        todo.complete(Local.with_ymd_and_hms(2023, 7, day, 21, 0, 0).unwrap());
        todo
    }

    fn titles(todos: &[Todo]) -> Vec<&str> {
        todos.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn test_on_time_late_and_open() {
        let p = project();
        let t1 = done_on(todo(&p, "T1", 1, Some(20)), 20);
        let t2 = done_on(todo(&p, "T2", 2, Some(20)), 21);
        let t3 = todo(&p, "T3", 3, Some(20));

        let result = summarize(&p, &[t3, t1, t2], UnassignedPolicy::default());

        assert_eq!(titles(&result.all), vec!["T1", "T2", "T3"]);
        assert_eq!(titles(&result.completed), vec!["T1", "T2"]);
        assert_eq!(titles(&result.backlog), vec!["T3"]);
        assert_eq!(titles(&result.daily_completed), vec!["T1"]);
        assert_eq!(titles(&result.delayed), vec!["T2"]);
        assert!(result.deleted.is_empty());
        assert_eq!(result.headline(), "2 completed, 1 delayed");
    }

    #[test]
    fn test_completed_early_is_delayed() {
        let p = project();
        let early = done_on(todo(&p, "early", 1, Some(25)), 24);
        let result = summarize(&p, &[early], UnassignedPolicy::default());
        assert!(result.daily_completed.is_empty());
        assert_eq!(titles(&result.delayed), vec!["early"]);
    }

    #[test]
    fn test_on_time_follows_assigned_list_not_current_list() {
        let p = project();
        let mut moved = todo(&p, "moved", 1, Some(20));
        moved.move_to(Some(date(22)));
        let moved = done_on(moved, 21);

        let mut kept_day = todo(&p, "kept day", 2, Some(20));
        kept_day.move_to(Some(date(22)));
        let kept_day = done_on(kept_day, 20);

        let result = summarize(&p, &[moved, kept_day], UnassignedPolicy::default());
        assert_eq!(titles(&result.daily_completed), vec!["kept day"]);
        assert_eq!(titles(&result.delayed), vec!["moved"]);
    }

    #[test]
    fn test_moved_out_of_backlog_still_unassigned() {
        let p = project();
        let mut late_pick = todo(&p, "late pick", 1, None);
        late_pick.move_to(Some(date(20)));
        let late_pick = done_on(late_pick, 20);

        let result = summarize(&p, &[late_pick], UnassignedPolicy::Exclude);
        assert_eq!(titles(&result.unscheduled), vec!["late pick"]);
    }

    #[test]
    fn test_unassigned_policy() {
        let p = project();
        let loose = done_on(todo(&p, "loose", 1, None), 20);

        let counted = summarize(&p, &[loose.clone()], UnassignedPolicy::CountAsDelayed);
        assert_eq!(titles(&counted.delayed), vec!["loose"]);
        assert!(counted.unscheduled.is_empty());

        let excluded = summarize(&p, &[loose], UnassignedPolicy::Exclude);
        assert!(excluded.delayed.is_empty());
        assert!(excluded.daily_completed.is_empty());
        assert_eq!(titles(&excluded.unscheduled), vec!["loose"]);
        assert_eq!(titles(&excluded.completed), vec!["loose"]);
    }

    #[test]
    fn test_soft_deleted_only_in_deleted() {
        let p = project();
        let mut open = todo(&p, "open", 1, None);
        open.soft_delete();
        let mut done = done_on(todo(&p, "done", 2, Some(20)), 20);
        done.soft_delete();
        let kept = todo(&p, "kept", 3, None);

        let result = summarize(&p, &[open, done, kept], UnassignedPolicy::default());
        assert_eq!(titles(&result.deleted), vec!["open", "done"]);
        assert_eq!(titles(&result.backlog), vec!["kept"]);
        assert!(result.completed.is_empty());
        assert_eq!(result.deleted.len() + result.active_count(), 3);
    }

    #[test]
    fn test_other_projects_ignored() {
        let p = project();
        let other = project();
        let mine = todo(&p, "mine", 1, None);
        let theirs = todo(&other, "theirs", 2, None);
        let loose = Todo::new(None, "loose".to_string(), 3);

        let result = summarize(&p, &[mine, theirs, loose], UnassignedPolicy::default());
        assert_eq!(titles(&result.all), vec!["mine"]);
    }

    #[test]
    fn test_partition_counts_are_consistent() {
        let p = project();
        let mut todos = Vec::new();
        for i in 0..12u64 {
            let day = 10 + (i % 5) as u32;
            let mut t = todo(&p, &format!("t{}", i), i, if i % 4 == 0 { None } else { Some(day) });
            if i % 3 != 0 {
                t = done_on(t, day + (i % 2) as u32);
            }
            if i % 5 == 0 {
                t.soft_delete();
            }
            todos.push(t);
        }

        for policy in [UnassignedPolicy::CountAsDelayed, UnassignedPolicy::Exclude] {
            let r = summarize(&p, &todos, policy);
            assert_eq!(r.deleted.len() + r.active_count(), r.all.len());
            assert_eq!(r.completed.len() + r.backlog.len(), r.active_count());
            assert_eq!(
                r.daily_completed.len() + r.delayed.len() + r.unscheduled.len(),
                r.completed.len()
            );
            if policy == UnassignedPolicy::CountAsDelayed {
                assert!(r.unscheduled.is_empty());
            }
        }
    }

    #[test]
    fn test_summary_lines() {
        let p = project();
        let t1 = done_on(todo(&p, "T1", 1, Some(20)), 20);
        let t2 = todo(&p, "T2", 2, None);
        let mut t3 = todo(&p, "T3", 3, None);
        t3.soft_delete();

        let result = summarize(&p, &[t1, t2, t3], UnassignedPolicy::default());
        assert_eq!(
            result.summary_lines(),
            vec![
                "2 todos (50.0% complete)".to_string(),
                "1 completed, 0 delayed".to_string(),
                "1 on their day".to_string(),
                "1 still open".to_string(),
                "1 deleted".to_string(),
            ]
        );
        assert_eq!(result.incomplete_titles(), vec!["T2"]);
    }

    #[test]
    fn test_empty_project() {
        let p = project();
        let result = summarize(&p, &[], UnassignedPolicy::default());
        assert!(result.all.is_empty());
        assert_eq!(result.completion_percent(), 0.0);
        assert_eq!(result.summary_lines()[0], "0 todos (0.0% complete)");
    }
}
