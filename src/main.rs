use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use naughtya::app::{short_id, App};
use naughtya::domain::{parse_date_key, NewProject, Todo};
use naughtya::persistence::{ensure_data_dir, get_data_dir, init_local_data_dir};
use naughtya::report::generate_report;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "naughtya")]
#[command(about = "Projects, todos and daily lists with end-of-project results", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .naughtya directory in the current directory
    Init,
    /// Manage projects
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    /// Manage todos
    Todo {
        #[command(subcommand)]
        command: TodoCommand,
    },
    /// Show the daily list for a date
    Daily {
        /// Date (YYYY-MM-DD). Defaults to today.
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Write a markdown report of ended projects
    Report {
        /// Output file path. Defaults to <data dir>/results-YYYY-MM-DD.md
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProjectCommand {
    /// Create a project
    Add {
        category: String,
        #[arg(short, long)]
        goals: Option<String>,
    },
    /// List projects, bookmarked first
    List,
    /// Mark a project as ended
    End { id: String },
    /// Toggle the bookmark on a project
    Bookmark { id: String },
}

#[derive(Subcommand)]
enum TodoCommand {
    /// Add a todo to a project
    Add {
        project: String,
        title: String,
        /// Daily list date (YYYY-MM-DD, or "today")
        #[arg(short, long)]
        date: Option<String>,
        /// Insert directly after this todo, on its project and daily list
        #[arg(long, conflicts_with = "date")]
        after: Option<String>,
    },
    /// Mark a todo as completed
    Done { id: String },
    /// Undo a completion
    Undo { id: String },
    /// Change a todo's title
    Rename { id: String, title: String },
    /// Soft-delete a todo
    Rm { id: String },
    /// Move a todo to a daily list, or back to the backlog without --date
    Move {
        id: String,
        #[arg(short, long)]
        date: Option<String>,
    },
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    if value.eq_ignore_ascii_case("today") {
        return Ok(Local::now().date_naive());
    }
    parse_date_key(value)
        .with_context(|| format!("Invalid date '{}'. Use YYYY-MM-DD", value))
}

fn parse_optional_date(value: Option<String>) -> Result<Option<NaiveDate>> {
    value.as_deref().map(parse_date).transpose()
}

fn todo_line(todo: &Todo) -> String {
    let mark = if todo.is_completed { "x" } else { " " };
    format!("[{}] {}  {}", mark, short_id(todo.id), todo.title)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let current_dir =
                std::env::current_dir().context("Could not determine current directory")?;
            let data_dir = init_local_data_dir(&current_dir)?;
            println!("Initialized naughtya directory: {}", data_dir.display());
            println!("naughtya will now keep its snapshot in this directory.");
            Ok(())
        }
        command => {
            ensure_data_dir()?;
            let app = App::load(&get_data_dir()?)?;
            run(&app, command).await?;
            app.save().await
        }
    }
}

async fn run(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Init => anyhow::bail!("init does not operate on a loaded data directory"),
        Commands::Project { command } => run_project(app, command).await,
        Commands::Todo { command } => run_todo(app, command).await,
        Commands::Daily { date } => {
            let date = parse_optional_date(date)?.unwrap_or_else(|| Local::now().date_naive());
            let list = app.open_day(date).await?;
            if let Some(header) = app.daily_lists.header() {
                println!("{}  ({} of {} left)", header.title, header.remaining, header.total);
            }
            for todo in &list.todos {
                println!("  {}", todo_line(todo));
            }
            Ok(())
        }
        Commands::Report { output } => {
            let results = app.project_results().await?;
            let path = generate_report(
                &results,
                Local::now().date_naive(),
                app.data_dir(),
                output.map(PathBuf::from),
            )?;
            println!("Report generated: {}", path.display());
            Ok(())
        }
    }
}

async fn run_project(app: &App, command: ProjectCommand) -> Result<()> {
    match command {
        ProjectCommand::Add { category, goals } => {
            let project = app
                .projects
                .create(NewProject {
                    category,
                    goals,
                    started_at: Some(Local::now()),
                    ended_at: None,
                })
                .await?;
            println!("Created project {}", short_id(project.id));
        }
        ProjectCommand::List => {
            let today = Local::now().date_naive();
            for model in app.project_models().await? {
                let project = &model.project;
                let star = if project.is_bookmarked { "*" } else { " " };
                let ended = if project.is_ended() { " (ended)" } else { "" };
                println!(
                    "{} {}  {}  {}{}",
                    star,
                    short_id(project.id),
                    project.category,
                    model.progress_label(),
                    ended
                );
                let cold = model.cold_todos(today);
                if !cold.is_empty() {
                    println!("    {} left behind on past days", cold.len());
                }
            }
        }
        ProjectCommand::End { id } => {
            let project = app.find_project(&id).await?;
            let ended = app.projects.end(&project, Local::now()).await?;
            let result = app.results.create(&ended).await?;
            println!("Ended {}: {}", ended.category, result.headline());
        }
        ProjectCommand::Bookmark { id } => {
            let project = app.find_project(&id).await?;
            let saved = app.projects.toggle_bookmark(&project).await?;
            let state = if saved.is_bookmarked { "Bookmarked" } else { "Unbookmarked" };
            println!("{} {}", state, saved.category);
        }
    }
    Ok(())
}

async fn run_todo(app: &App, command: TodoCommand) -> Result<()> {
    let todo = match command {
        TodoCommand::Add {
            project,
            title,
            date,
            after,
        } => match after {
            Some(after) => {
                let anchor = app.find_todo(&after).await?;
                app.todos.create_after(&anchor, &title).await?
            }
            None => {
                let project = app.find_project(&project).await?;
                let date = parse_optional_date(date)?;
                app.todos.create(&project, date, &title).await?
            }
        },
        TodoCommand::Done { id } => {
            let todo = app.find_todo(&id).await?;
            app.todos.complete(&todo, Local::now()).await?
        }
        TodoCommand::Undo { id } => {
            let todo = app.find_todo(&id).await?;
            app.todos.undo_completed(&todo).await?
        }
        TodoCommand::Rename { id, title } => {
            let todo = app.find_todo(&id).await?;
            app.todos.update(&todo, &title).await?
        }
        TodoCommand::Rm { id } => {
            let todo = app.find_todo(&id).await?;
            app.todos.delete(&todo).await?
        }
        TodoCommand::Move { id, date } => {
            let todo = app.find_todo(&id).await?;
            app.todos.move_to(&todo, parse_optional_date(date)?).await?
        }
    };
    println!("{}", todo_line(&todo));
    Ok(())
}
