//! Focus Timer - terminal countdown for focus cycles.
//!
//! # Commands
//!
//! - `focus-timer run`: Interactive screen with form, countdown and history
//! - `focus-timer start`: Run a single cycle without a screen
//!
//! # Environment Variables
//!
//! See [`focus_timer_core::config`] for available configuration options.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use focus_timer::headless::{run_cycle, write_summary};
use focus_timer::tui::{install_panic_hook, ui, AppState, EventHandler, Theme, Tui, TuiEvent};
use focus_timer_core::{
    Clock, CountdownDriver, CycleEvent, CycleStore, NewCycle, SystemClock, TimerConfig,
};

/// Graceful shutdown timeout for background tasks.
const SHUTDOWN_TIMEOUT_SECS: u64 = 5;

/// Capacity of the terminal event channel.
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Focus Timer - terminal countdown for focus cycles.
///
/// Work on one task at a time for a fixed number of minutes, then take
/// a break.
#[derive(Parser, Debug)]
#[command(name = "focus-timer")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
ENVIRONMENT VARIABLES:
    FOCUS_TIMER_TICK_MS          Countdown tick period in ms (default: 1000)
    FOCUS_TIMER_EVENT_CAPACITY   Change-event channel capacity (default: 1000)
    FOCUS_TIMER_DEFAULT_MINUTES  Minutes prefilled for a new cycle (default: 25)
    RUST_LOG                     Log filter (default: info)
    NO_COLOR                     Disable colors in the interactive screen

EXAMPLES:
    # Open the interactive screen
    focus-timer run

    # Run one 25-minute cycle and print a JSON summary
    focus-timer start --task \"Write report\" --minutes 25 --json")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Open the interactive screen.
    ///
    /// Tab switches field, Enter starts, Up/Down or +/- adjust minutes,
    /// i interrupts, Esc or Ctrl+C quits.
    Run {
        /// Write logs to stderr (they overlay the screen).
        #[arg(long)]
        log: bool,
    },

    /// Run a single cycle without a screen.
    ///
    /// Progress is logged every minute. Ctrl+C interrupts the cycle; a
    /// summary is printed when it ends.
    Start {
        /// Task to focus on.
        #[arg(short, long)]
        task: String,

        /// Cycle length in minutes (1-60). Defaults to FOCUS_TIMER_DEFAULT_MINUTES.
        #[arg(short, long)]
        minutes: Option<u32>,

        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TimerConfig::from_env().context("Failed to load configuration")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    match cli.command {
        Command::Run { log } => {
            if log {
                init_logging();
            }
            runtime.block_on(run_interactive(config))
        }
        Command::Start {
            task,
            minutes,
            json,
        } => {
            init_logging();
            let request = NewCycle::new(task, minutes.unwrap_or(config.default_minutes));
            runtime.block_on(run_start(config, request, json))
        }
    }
}

/// Runs one cycle and prints its summary to stdout.
async fn run_start(config: TimerConfig, request: NewCycle, json: bool) -> Result<()> {
    info!(
        tick_ms = config.tick_rate.as_millis() as u64,
        "Starting Focus Timer"
    );

    let store = CycleStore::from_config(&config, Arc::new(SystemClock));
    let summary = run_cycle(&store, config.tick_rate, &request, wait_for_interrupt())
        .await
        .context("Failed to run cycle")?;

    write_summary(io::stdout().lock(), &summary, json).context("Failed to write summary")
}

/// Runs the interactive screen until the user quits.
async fn run_interactive(config: TimerConfig) -> Result<()> {
    let store = CycleStore::from_config(&config, Arc::new(SystemClock));
    let driver = CountdownDriver::from_config(store.clone(), &config).spawn();
    let cycle_events = store.subscribe();

    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let event_task = tokio::spawn(EventHandler::new(event_tx, shutdown_rx).run());

    install_panic_hook();
    let mut tui = Tui::new().context("Failed to initialize terminal")?;

    let mut state = AppState::new(config.default_minutes).with_theme(Theme::from_env());
    state.sync(&store);

    let loop_result = event_loop(&mut tui, &mut state, &store, event_rx, cycle_events).await;

    tui.restore().context("Failed to restore terminal")?;

    let _ = shutdown_tx.send(());
    match tokio::time::timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), event_task).await {
        Ok(Ok(Ok(()))) => debug!("Event handler stopped"),
        Ok(Ok(Err(e))) => warn!(error = %e, "Event handler failed"),
        Ok(Err(e)) => warn!(error = %e, "Event handler task panicked"),
        Err(_) => warn!("Event handler did not stop in time"),
    }
    driver
        .shutdown()
        .await
        .context("Failed to stop countdown driver")?;

    loop_result
}

/// Redraws after every terminal or cycle event until the user quits.
async fn event_loop(
    tui: &mut Tui,
    state: &mut AppState,
    store: &CycleStore,
    mut events: mpsc::Receiver<TuiEvent>,
    mut cycle_events: broadcast::Receiver<CycleEvent>,
) -> Result<()> {
    let clock = store.clock();

    while !state.should_quit() {
        tui.set_title(&state.title())?;
        tui.draw(|frame| ui::render(frame, state, clock.now()))?;

        tokio::select! {
            event = events.recv() => match event {
                Some(TuiEvent::Key(key)) => {
                    if let Some(command) = state.handle_key(key) {
                        state.dispatch(command, store);
                    }
                }
                Some(TuiEvent::Tick | TuiEvent::Resize(..)) => {}
                None => {
                    warn!("Terminal event channel closed");
                    break;
                }
            },
            event = cycle_events.recv() => match event {
                Ok(event) => state.apply_event(&event),
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "Screen lagged behind cycle events, resyncing");
                    state.sync(store);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}

/// Initializes the logging subsystem on stderr, keeping stdout for output.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .with_level(true)
        .init();
}

/// Completes on Ctrl+C (or SIGTERM on Unix).
async fn wait_for_interrupt() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Interrupt requested");
}
