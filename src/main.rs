use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use trace_dashboard::backfill::backfill;
use trace_dashboard::config::check_tick;
use trace_dashboard::data::duration::parse_duration;
use trace_dashboard::ui::{self, Theme};
use trace_dashboard::{events, App, Settings, SharedState, StreamClient};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "TRACE_LOG";

#[derive(Parser, Debug)]
#[command(name = "trace-dashboard")]
#[command(about = "Terminal dashboard for the TRACE network management stream")]
struct Args {
    /// Path to a TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// REST endpoint of the backend (overrides config)
    #[arg(long)]
    api_url: Option<String>,

    /// WebSocket endpoint of the backend (overrides config)
    #[arg(long)]
    ws_url: Option<String>,

    /// Region to subscribe to
    #[arg(short, long)]
    region: Option<String>,

    /// Skip the live backend and run on synthetic data only
    #[arg(long)]
    offline: bool,

    /// Synthetic generator interval (e.g., "1s", "500ms")
    #[arg(long)]
    tick: Option<String>,

    /// Log file; the terminal is owned by the UI
    #[arg(long, default_value = "trace-dashboard.log")]
    log_file: PathBuf,

    /// Collect data headless, export the dashboard to JSON and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Seconds to collect before exporting (used with --export)
    #[arg(long, default_value = "5", requires = "export")]
    export_after: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    let settings = resolve_settings(&args)?;
    info!(api = %settings.api_url, ws = %settings.ws_url, region = %settings.region, offline = settings.offline, "starting");

    let rt = tokio::runtime::Runtime::new()?;
    // Background tasks are spawned from the UI thread
    let guard = rt.enter();

    let state = SharedState::default();
    let api = settings.api_client();

    if !settings.offline {
        let api = api.clone();
        let state = state.clone();
        rt.spawn(async move {
            backfill(&api, &state).await;
        });
    }

    let mut client = StreamClient::new(settings.stream_settings());
    client.start();

    let theme = Theme::auto_detect();
    let mut app = App::new(client, state, theme).with_backend(api, settings.stage_delay);

    let result = match args.export {
        Some(ref export_path) => export_after(&mut app, export_path, Duration::from_secs(args.export_after)),
        None => run_tui(&mut app),
    };

    app.quit();
    drop(guard);
    rt.shutdown_timeout(Duration::from_secs(1));
    result
}

/// Log to a file so the alternate screen stays clean.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Layer command-line flags over file and environment settings.
fn resolve_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref())?;

    if let Some(ref url) = args.api_url {
        settings.api_url = url.clone();
    }
    if let Some(ref url) = args.ws_url {
        settings.ws_url = url.clone();
    }
    if let Some(ref region) = args.region {
        settings.region = region.clone();
    }
    if let Some(ref tick) = args.tick {
        settings.tick = parse_duration(tick)
            .and_then(check_tick)
            .with_context(|| format!("Invalid --tick: {:?}", tick))?;
    }
    if args.offline {
        settings.offline = true;
    }
    Ok(settings)
}

/// Run headless for `after`, then write the dashboard export.
fn export_after(app: &mut App, path: &Path, after: Duration) -> Result<()> {
    let started = Instant::now();
    while started.elapsed() < after {
        app.tick();
        std::thread::sleep(Duration::from_millis(100));
    }
    app.tick();

    app.export_state(path)?;
    println!("Exported dashboard state to: {}", path.display());
    Ok(())
}

/// Run the TUI until the user quits
fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        app.tick();
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    // Header (1) + tabs (1) + table border (1); the table header row is skipped by the handler
                    events::handle_mouse_event(app, mouse, 3);
                }
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}
