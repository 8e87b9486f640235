//! SAFE.Guard TUI - a terminal client for SAFE.Guard environmental risk
//! monitoring.
//!
//! Shows alerts, sensors, readings, risks and stations from the SAFE.Guard
//! server, with a keyboard-driven login and create/edit/delete forms.

mod app;
mod form;
mod ui;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use safeguard_core::{
    store, ApiClient, AuthFlow, BootstrapPolicy, Config, Credentials, NavigationGate, PreferenceStore,
    SessionStore,
};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Prefix of the daily log files in the data directory
const LOG_FILE_PREFIX: &str = "safeguard.log";

fn env_filter() -> EnvFilter {
    // RUST_LOG controls the level (e.g. RUST_LOG=safeguard_core=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr. Used by the one-shot CLI commands.
fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Log to a daily file; the terminal belongs to the UI.
fn init_file_tracing(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Could not create log directory {}", log_dir.display()))?;
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    Ok(guard)
}

enum Command {
    Tui,
    Login,
    Logout,
    Status,
}

fn parse_command() -> Result<Command> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => Ok(Command::Tui),
        Some("--login") => Ok(Command::Login),
        Some("--logout") => Ok(Command::Logout),
        Some("--status") => Ok(Command::Status),
        Some(other) => anyhow::bail!(
            "Unknown argument '{}'. Usage: safeguard [--login | --logout | --status]",
            other
        ),
    }
}

/// Services shared by the TUI and the CLI commands
struct Services {
    config: Config,
    api: ApiClient,
    prefs: PreferenceStore,
    session: SessionStore,
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    })
}

fn data_dir(config: &Config) -> PathBuf {
    config
        .data_dir()
        .unwrap_or_else(|_| PathBuf::from("./.safeguard"))
}

fn build_services(config: Config) -> Result<Services> {
    let kv = store::open_or_recover(config.store, data_dir(&config));
    let session = SessionStore::new(kv.clone());
    if let Err(e) = session.init() {
        warn!(error = %e, "Could not read stored session");
    }

    let gate = NavigationGate::new(session.clone());
    let api = ApiClient::new(&config, gate).context("Could not create HTTP client")?;
    info!(base_url = api.base_url(), "API client ready");

    Ok(Services {
        config,
        api,
        prefs: PreferenceStore::new(kv),
        session,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let command = parse_command()?;
    if !matches!(command, Command::Tui) {
        init_stderr_tracing();
        let services = build_services(load_config())?;
        let result = match command {
            Command::Login => cli_login(&services).await,
            Command::Logout => cli_logout(&services),
            Command::Status => cli_status(&services).await,
            Command::Tui => Ok(()),
        };
        services.session.teardown();
        return result;
    }

    // Read before logging is up; a load failure is reported once it is
    let config_result = Config::load();
    let log_dir = data_dir(config_result.as_ref().unwrap_or(&Config::default()));
    let _log_guard = match init_file_tracing(&log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: file logging disabled: {:#}", e);
            None
        }
    };
    info!("SAFE.Guard TUI starting");

    let config = config_result.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });
    let services = build_services(config)?;
    let session = services.session.clone();
    let mut app = App::new(
        services.config,
        Config::config_path().ok(),
        services.api,
        services.prefs,
    );
    app.start_bootstrap();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        eprintln!("Error: {}", e);
    }

    session.teardown();
    info!("SAFE.Guard TUI shutting down");
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    eprint!("{}", label);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

async fn cli_login(services: &Services) -> Result<()> {
    let default_user = services.config.last_username.clone().unwrap_or_default();
    let label = if default_user.is_empty() {
        "Username: ".to_string()
    } else {
        format!("Username [{}]: ", default_user)
    };
    let mut username = prompt(&label)?;
    if username.is_empty() {
        username = default_user;
    }
    let password = rpassword::prompt_password("Password: ")?;

    let flow = AuthFlow::new(services.api.clone());
    services
        .api
        .gate()
        .bootstrap(&services.api, BootstrapPolicy::Local)
        .await;

    match flow
        .replace_session(&Credentials::new(username.clone(), password))
        .await
    {
        Ok(_) => {
            let mut config = services.config.clone();
            config.last_username = Some(username.clone());
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
            eprintln!("Logged in as {}", username);
            Ok(())
        }
        Err(e) => anyhow::bail!("Login failed: {}", e.user_message()),
    }
}

fn cli_logout(services: &Services) -> Result<()> {
    AuthFlow::new(services.api.clone()).logout();
    eprintln!("Logged out");
    Ok(())
}

async fn cli_status(services: &Services) -> Result<()> {
    let state = services
        .api
        .gate()
        .bootstrap(&services.api, services.config.bootstrap)
        .await;
    println!("server:  {}", services.api.base_url());
    println!("session: {:?}", state);
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
