//! taskcache CLI - a command-line front end for the taskcache core.
//!
//! Commands are thin adapters: they parse arguments, call the matching
//! state-transition method on the core, and print the result. All state
//! lives in the core's store and cache directories.

mod sink;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use taskcache_core::config::Config;
use taskcache_core::models::FilterMode;
use taskcache_core::notify::DeadlineNotifier;
use taskcache_core::offline::{
    default_manifest, CacheController, CacheStorage, Destination, HttpFetcher, Message, Reply,
    Request,
};
use taskcache_core::{App, Store, Urgency};

use sink::ConsoleSink;

/// Initialize the tracing subscriber: stderr plus a log file in the data
/// directory. Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_tracing(config: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = config
        .data_dir()
        .ok()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok())
        .map(|dir| {
            let appender = tracing_appender::rolling::never(dir, "taskcache.log");
            tracing_appender::non_blocking(appender)
        });

    match file_layer {
        Some((writer, guard)) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

fn usage() {
    eprintln!(
        "usage: taskcache <command>

  register <name> <email> <password> <confirm>
  login <email> <password>
  logout
  whoami

  add <task> <YYYY-MM-DD>
  list [all|completed|pending]
  done <id>
  edit <id> <new task>
  rm <id>
  clear

  notify [--watch]

  cache install
  cache activate
  cache fetch <path>
  cache update-check
  cache status"
    );
}

/// Print a domain error the way the UI shows it and exit non-zero.
fn fail(error: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", error);
    std::process::exit(1);
}

fn open_app(config: &Config) -> Result<App> {
    let store = Store::new(config.data_dir()?).context("Failed to open data directory")?;
    App::new(store).map_err(|e| anyhow::anyhow!("Failed to initialize: {}", e))
}

fn cache_controller(config: &Config) -> Result<CacheController<HttpFetcher>> {
    let storage =
        CacheStorage::new(config.cache_dir()?).context("Failed to open cache directory")?;
    let fetcher = HttpFetcher::new().context("Failed to build HTTP client")?;
    Ok(CacheController::new(
        config.origin(),
        config.cache_version(),
        default_manifest(),
        storage,
        fetcher,
    ))
}

/// Guess the content class the way the page would declare it.
fn destination_for(path: &str) -> Destination {
    let path = path.split('?').next().unwrap_or(path);
    if path == "/" || path.ends_with(".html") {
        Destination::Document
    } else if path.ends_with(".css") {
        Destination::Style
    } else if path.ends_with(".js") {
        Destination::Script
    } else if [".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp"]
        .iter()
        .any(|ext| path.ends_with(ext))
    {
        Destination::Image
    } else {
        Destination::Other
    }
}

fn parse_date(raw: &str) -> NaiveDate {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => fail(format!("Invalid date '{}', expected YYYY-MM-DD", raw)),
    }
}

fn parse_id(raw: &str) -> i64 {
    match raw.parse() {
        Ok(id) => id,
        Err(_) => fail(format!("Invalid todo id '{}'", raw)),
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

fn print_todos(app: &App, mode: FilterMode) {
    let todos = match app.todos(mode) {
        Ok(todos) => todos,
        Err(e) => fail(e),
    };
    if todos.is_empty() {
        println!("No task found");
        return;
    }
    let today = chrono::Utc::now().date_naive();
    for todo in todos {
        let urgency = Urgency::of(todo.due_date, today);
        let status = if todo.completed { "Completed" } else { "Pending" };
        let badge = urgency
            .badge()
            .map(|b| format!("  ({})", b))
            .unwrap_or_default();
        println!(
            "{} {:>13}  {:<40} due {}  {}{}",
            urgency.icon(),
            todo.id,
            todo.task,
            todo.due_date,
            status,
            badge
        );
    }
}

async fn run_cache_command(config: &Config, args: &[String]) -> Result<()> {
    let mut controller = cache_controller(config)?;
    match args.first().map(String::as_str) {
        Some("install") => {
            controller.install().await.unwrap_or_else(|e| fail(e));
            // Install signals skip-waiting, so promote right away
            if controller.skip_requested() {
                controller.activate().await.unwrap_or_else(|e| fail(e));
            }
            println!(
                "Installed static assets for {} ({:?})",
                config.cache_version(),
                controller.state()
            );
        }
        Some("activate") => {
            controller.install().await.unwrap_or_else(|e| fail(e));
            controller.activate().await.unwrap_or_else(|e| fail(e));
            println!("Active at {}", config.cache_version());
        }
        Some("fetch") => {
            let path = args.get(1).map(String::as_str).unwrap_or("/");
            let url = if path.starts_with("http") {
                path.to_string()
            } else {
                format!("{}{}", config.origin(), path)
            };
            let request = Request::new(url, destination_for(path));
            match controller.handle_fetch(&request).await {
                Ok(response) => {
                    println!(
                        "{} {} ({} bytes)",
                        response.status,
                        response.content_type,
                        response.body.len()
                    );
                }
                Err(e) => fail(e),
            }
        }
        Some("update-check") => {
            let (tx, rx) = tokio::sync::oneshot::channel();
            controller.handle_message(Message::CheckUpdate, tx).await;
            match rx.await? {
                Reply::UpdateAvailable { has_update: true } => {
                    println!("A newer version is available")
                }
                Reply::UpdateAvailable { has_update: false } => println!("Up to date"),
                Reply::Ack { message } => println!("{}", message),
            }
        }
        Some("status") => {
            println!("origin:  {}", config.origin());
            println!("version: {}", config.cache_version());
            println!("state:   {:?}", controller.state());
        }
        _ => usage(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let mut config = Config::load().unwrap_or_default();
    let _guard = init_tracing(&config);
    info!("taskcache starting");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match args.first() {
        Some(command) => command.as_str(),
        None => {
            usage();
            return Ok(());
        }
    };

    if command == "cache" {
        return run_cache_command(&config, &args[1..]).await;
    }

    let mut app = open_app(&config)?;

    match (command, &args[1..]) {
        ("register", [name, email, password, confirm_password]) => {
            match app.register(name, email, password, confirm_password) {
                Ok(user) => println!("Registration successful! Please login as {}.", user.email),
                Err(e) => fail(e),
            }
        }
        ("login", [email, password]) => match app.login(email, password) {
            Ok(user) => {
                config.last_email = Some(user.email.clone());
                if let Err(e) = config.save() {
                    tracing::warn!(error = %e, "failed to persist config");
                }
                println!("Welcome back, {}!", user.name);

                // Session start: run the deadline scan once right away
                let notifier = DeadlineNotifier::new(ConsoleSink);
                if let Err(e) = app.check_deadlines(&notifier) {
                    tracing::warn!(error = %e, "deadline scan failed");
                }
            }
            Err(e) => fail(e),
        },
        ("logout", _) => {
            app.logout().unwrap_or_else(|e| fail(e));
            println!("Logged out");
        }
        ("whoami", _) => match app.current_user() {
            Some(user) => {
                let avatar = user.avatar_initial().unwrap_or('?');
                println!("[{}] {} <{}>", avatar, user.name, user.email);
            }
            None => println!("Not logged in"),
        },
        ("add", [task, date]) => {
            let due_date = Some(parse_date(date));
            match app.add_todo(task, due_date) {
                Ok(todo) => println!("Added #{}", todo.id),
                Err(e) => fail(e),
            }
        }
        ("list", rest) => {
            let mode = rest
                .first()
                .map(|m| FilterMode::from_str(m))
                .unwrap_or_default();
            print_todos(&app, mode);
        }
        ("done", [id]) => {
            app.toggle_complete(parse_id(id)).unwrap_or_else(|e| fail(e));
            print_todos(&app, FilterMode::All);
        }
        ("edit", [id, rest @ ..]) if !rest.is_empty() => {
            app.edit_todo(parse_id(id), &rest.join(" "))
                .unwrap_or_else(|e| fail(e));
            print_todos(&app, FilterMode::All);
        }
        ("rm", [id]) => {
            app.delete_todo(parse_id(id)).unwrap_or_else(|e| fail(e));
            print_todos(&app, FilterMode::All);
        }
        ("clear", _) => {
            if confirm("Are you sure you want to delete all todos?")? {
                app.delete_all_todos().unwrap_or_else(|e| fail(e));
                println!("All todos deleted");
            } else {
                println!("Cancelled");
            }
        }
        ("notify", rest) => {
            let notifier = DeadlineNotifier::new(ConsoleSink);
            if rest.first().map(String::as_str) == Some("--watch") {
                // Immediate scan, then hourly until interrupted
                notifier
                    .run(|| match app.todos(FilterMode::All) {
                        Ok(todos) => todos,
                        Err(e) => {
                            tracing::warn!(error = %e, "could not load todos for scan");
                            Vec::new()
                        }
                    })
                    .await;
            } else {
                match app.check_deadlines(&notifier) {
                    Ok(alerts) if alerts.is_empty() => println!("Nothing due"),
                    Ok(_) => {}
                    Err(e) => fail(e),
                }
            }
        }
        _ => usage(),
    }

    info!("taskcache done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_for() {
        assert_eq!(destination_for("/"), Destination::Document);
        assert_eq!(destination_for("/index.html"), Destination::Document);
        assert_eq!(destination_for("/css/style.css"), Destination::Style);
        assert_eq!(destination_for("/js/script.js"), Destination::Script);
        assert_eq!(destination_for("/images/profile.jpg"), Destination::Image);
        assert_eq!(destination_for("/images/pic.png?v=2"), Destination::Image);
        assert_eq!(destination_for("/manifest.json"), Destination::Other);
    }
}
