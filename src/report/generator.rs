use crate::domain::Todo;
use crate::persistence::atomic_write;
use crate::report::ProjectResult;
use anyhow::Result;
use chrono::{Duration, NaiveDate};
use std::path::{Path, PathBuf};

/// Format duration as "Xd", "Xh Ym" or "Xm" for display
fn format_duration(duration: Duration) -> String {
    let total_mins = duration.num_minutes().max(0);
    if total_mins < 60 {
        return format!("{}m", total_mins);
    }
    let days = total_mins / (60 * 24);
    if days > 0 {
        return format!("{}d", days);
    }
    let hours = total_mins / 60;
    let mins = total_mins % 60;
    if mins == 0 {
        format!("{}h", hours)
    } else {
        format!("{}h {}m", hours, mins)
    }
}

/// Format percentage with 1 decimal place
pub(crate) fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

fn todo_line(todo: &Todo) -> String {
    let mark = if todo.is_completed { "x" } else { " " };
    match todo.daily_list {
        Some(day) => format!("- [{}] {} ({})\n", mark, todo.title, day),
        None => format!("- [{}] {}\n", mark, todo.title),
    }
}

fn push_section(report: &mut String, heading: &str, todos: &[Todo]) {
    if todos.is_empty() {
        return;
    }
    report.push_str(&format!("#### {}\n\n", heading));
    for todo in todos {
        report.push_str(&todo_line(todo));
    }
    report.push('\n');
}

/// Render project results as a markdown document
pub fn render_report(results: &[ProjectResult], generated_on: NaiveDate) -> String {
    let mut report = String::new();
    report.push_str(&format!("# Project Results - {}\n\n", generated_on));

    if results.is_empty() {
        report.push_str("No ended projects yet.\n");
        return report;
    }

    // Overview across projects
    let completed: usize = results.iter().map(|r| r.completed.len()).sum();
    let delayed: usize = results.iter().map(|r| r.delayed.len()).sum();
    let active: usize = results.iter().map(|r| r.active_count()).sum();
    let overall = if active > 0 {
        completed as f64 / active as f64 * 100.0
    } else {
        0.0
    };
    report.push_str("## Summary\n\n");
    report.push_str(&format!("- **Projects:** {}\n", results.len()));
    report.push_str(&format!(
        "- **Todos:** {} completed of {} ({})\n",
        completed,
        active,
        format_percent(overall)
    ));
    report.push_str(&format!("- **Delayed:** {}\n\n", delayed));

    for result in results {
        let project = &result.project;
        let name = if project.category.is_empty() {
            "(uncategorized)"
        } else {
            project.category.as_str()
        };
        report.push_str(&format!("## {}\n\n", name));

        if let Some(goals) = project.goals.as_deref().filter(|g| !g.is_empty()) {
            report.push_str(&format!("> {}\n\n", goals));
        }
        if let (Some(start), Some(end)) = (project.started_at, project.ended_at) {
            report.push_str(&format!(
                "- **Period:** {} to {} ({})\n",
                start.date_naive(),
                end.date_naive(),
                format_duration(end - start)
            ));
        }
        for line in result.summary_lines() {
            report.push_str(&format!("- {}\n", line));
        }
        report.push('\n');

        push_section(&mut report, "On Their Day", &result.daily_completed);
        push_section(&mut report, "Delayed", &result.delayed);
        push_section(&mut report, "Without a Day", &result.unscheduled);
        push_section(&mut report, "Still Open", &result.backlog);
    }

    report
}

/// Write the results report; defaults to `<data dir>/results-YYYY-MM-DD.md`
pub fn generate_report(
    results: &[ProjectResult],
    generated_on: NaiveDate,
    data_dir: &Path,
    output_path: Option<PathBuf>,
) -> Result<PathBuf> {
    let output =
        output_path.unwrap_or_else(|| data_dir.join(format!("results-{}.md", generated_on)));
    atomic_write(&output, &render_report(results, generated_on))?;
    Ok(output)
}
