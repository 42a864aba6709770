//! todo - manage the local todo list from the terminal

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use libtodolist::events::{StoreEvent, StoreEventReceiver};
use libtodolist::logging::LoggingConfig;
use libtodolist::auth::LocalProvider;
use libtodolist::{AuthBridge, Config, StorageError, Todo, TodoApp, TodoError, TodoStore};

#[derive(Parser, Debug)]
#[command(name = "todo")]
#[command(version, about = "Manage a local todo list")]
#[command(long_about = r#"Manage a local todo list stored under a single key.

EXAMPLES:
    # Add a todo (surrounding whitespace is trimmed)
    todo add buy milk

    # Show the list
    todo list
    todo list --format json | jq '.[] | select(.completed == false) | .text'

    # Complete, reopen and delete by id
    todo toggle 1712000000000
    todo remove 1712000000000

EXIT CODES:
    0 - Success (including adding blank text, which does nothing)
    1 - Configuration or storage error
    3 - Unknown todo id
"#)]
struct Cli {
    /// Path to config file (defaults to $TODOLIST_CONFIG, then the XDG location)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    #[arg(value_parser = ["text", "json"])]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show all todos in order
    List,

    /// Add a todo
    Add {
        /// Todo text (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Flip a todo between open and completed
    Toggle {
        id: String,
    },

    /// Delete a todo
    #[command(alias = "rm")]
    Remove {
        id: String,
    },

    /// Reload from storage and report how many todos were found
    Refresh,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env("warn", cli.verbose).init();

    if let Err(e) = run(cli).await {
        // Library errors already embed their sources in their messages
        match e.chain().nth(1) {
            Some(cause) => eprintln!("Error: {}: {}", e, cause),
            None => eprintln!("Error: {}", e),
        }
        let code = e
            .downcast_ref::<TodoError>()
            .map(TodoError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::load().context("Failed to load configuration")?,
    };
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    tracing::debug!("todo started with args: {:?}", cli);

    let config = load_config(cli.config.as_ref())?;
    let store = TodoStore::from_config(&config)
        .await
        .map_err(TodoError::from)
        .context("Failed to open storage")?;
    let app = TodoApp::new(store, AuthBridge::new(Arc::new(LocalProvider)));

    let mut events = app.store().subscribe();
    let mut todos = app.start().await;
    if matches!(cli.command, Command::Refresh) {
        todos = app.refresh().await;
    }
    let load_error = take_error(&mut events, |event| match event {
        StoreEvent::LoadFailed { error } => Some(error),
        _ => None,
    });

    if let Some(error) = load_error {
        let message = match cli.command {
            Command::List | Command::Refresh => "Failed to load todos",
            // Writing over a collection we could not read would discard it
            _ => "Refusing to modify todos that could not be loaded",
        };
        return Err(TodoError::Storage(StorageError::Failed(error))).context(message);
    }

    let json = cli.format == "json";
    let store = app.store();

    match cli.command {
        Command::List => print_list(&todos, json)?,
        Command::Refresh => {
            if json {
                println!("{}", serde_json::json!({ "count": todos.len() }));
            } else {
                println!("Loaded {} todos", todos.len());
            }
        }
        Command::Add { text } => {
            let text = text.join(" ");
            if let Some(todo) = store.add(&text).await {
                ensure_saved(&mut events)?;
                if json {
                    println!("{}", serde_json::to_string(&todo)?);
                } else {
                    println!("{}", todo.id);
                }
            } else {
                tracing::debug!("Ignoring blank todo text");
            }
        }
        Command::Toggle { id } => {
            let completed = store.toggle(&id).await.ok_or_else(|| unknown_id(&id))?;
            ensure_saved(&mut events)?;
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "id": id, "completed": completed })
                );
            } else if completed {
                println!("Completed {}", id);
            } else {
                println!("Reopened {}", id);
            }
        }
        Command::Remove { id } => {
            let removed = store.remove(&id).await.ok_or_else(|| unknown_id(&id))?;
            ensure_saved(&mut events)?;
            if json {
                println!("{}", serde_json::to_string(&removed)?);
            } else {
                println!("Removed {}", removed.id);
            }
        }
    }

    app.shutdown();
    Ok(())
}

fn print_list(todos: &[Todo], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(todos)?);
        return Ok(());
    }

    for todo in todos {
        let mark = if todo.completed { "x" } else { " " };
        println!("[{}] {}  {}", mark, todo.id, todo.text);
    }
    Ok(())
}

/// Drain pending store events, returning the first error `pick` extracts
fn take_error<F>(events: &mut StoreEventReceiver, pick: F) -> Option<String>
where
    F: Fn(StoreEvent) -> Option<String>,
{
    let mut found = None;
    while let Ok(event) = events.try_recv() {
        if found.is_none() {
            found = pick(event);
        }
    }
    found
}

/// The store never fails a mutation; check whether its write went through
fn ensure_saved(events: &mut StoreEventReceiver) -> Result<()> {
    let persist_error = take_error(events, |event| match event {
        StoreEvent::PersistFailed { error } => Some(error),
        _ => None,
    });

    match persist_error {
        Some(error) => {
            Err(TodoError::Storage(StorageError::Failed(error))).context("Change was not saved")
        }
        None => Ok(()),
    }
}

fn unknown_id(id: &str) -> TodoError {
    TodoError::InvalidInput(format!("No todo with id '{}'", id))
}
