use std::io::Stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::select;
use tokio::time::MissedTickBehavior;

use crate::events::handle_event;
use crate::state::{Session, SessionOutcome, SessionState};
use crate::theme::Settings;
use crate::ui::{ViewContext, ui};

use super::terminal::{restore_terminal, setup_terminal};

mod channels;
pub mod loader;

use channels::{Channels, spawn_event_thread};
use loader::{LoaderConfig, LoaderMessage, spawn_loader};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Redraw cadence while idle; drives the spinner and notice expiry.
const TICK_INTERVAL: Duration = Duration::from_millis(120);
/// How long a notice stays on screen without a key press.
const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Per-invocation options that come from the command line rather than settings.conf.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Skip snapshots and refetch every source.
    pub force_refresh: bool,
    /// Snapshot directory.
    pub cache_dir: PathBuf,
}

/// What: Run one interactive selection session end-to-end.
///
/// Inputs:
/// - `settings`: Loaded configuration (sources, filters, keymap, footer)
/// - `opts`: Command-line overrides
///
/// Output:
/// - The session outcome; `Err` only for terminal setup or drawing failures.
///
/// Details:
/// - Starts the input thread and the background loader, then alternates between drawing
///   and waiting on input, loader, or tick.
/// - The terminal is restored on every exit path once setup succeeded.
pub async fn run(settings: &Settings, opts: RunOptions) -> Result<SessionOutcome> {
    setup_terminal()?;
    let outcome = match Terminal::new(CrosstermBackend::new(std::io::stdout())) {
        Ok(mut terminal) => drive(&mut terminal, settings, opts).await,
        Err(e) => Err(e.into()),
    };
    if let Err(e) = restore_terminal() {
        tracing::warn!(error = %e, "failed to restore terminal");
    }
    outcome
}

/// Event loop body, separated so `run` can always restore the terminal.
async fn drive(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    settings: &Settings,
    opts: RunOptions,
) -> Result<SessionOutcome> {
    let mut session = Session::new(SessionState::new(settings.filters, settings.sort_mode));
    let mut channels = Channels::new();

    spawn_event_thread(
        channels.event_tx.clone(),
        channels.event_thread_cancelled.clone(),
    );
    spawn_loader(
        LoaderConfig::from_settings(settings, opts.cache_dir, opts.force_refresh),
        channels.loader_tx.clone(),
    );

    let mut tick = tokio::time::interval(TICK_INTERVAL);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut spinner = 0usize;

    let result: Result<SessionOutcome> = loop {
        let ctx = ViewContext {
            spinner,
            keymap: &settings.keymap,
            show_footer: settings.show_keybinds_footer,
        };
        if let Err(e) = terminal.draw(|f| ui(f, &mut session, &ctx)) {
            break Err(e.into());
        }
        if let Some(outcome) = session.outcome() {
            break Ok(outcome.clone());
        }

        select! {
            Some(ev) = channels.event_rx.recv() => {
                handle_event(&ev, &mut session, &settings.keymap);
            }
            Some(msg) = channels.loader_rx.recv() => match msg {
                LoaderMessage::Loaded(data) => session.on_loaded(data),
                LoaderMessage::Failed(message) => session.on_load_failed(message),
            },
            _ = tick.tick() => {
                spinner = spinner.wrapping_add(1);
                session.expire_notice(Instant::now(), NOTICE_TTL);
            }
        }
    };

    tracing::debug!("main loop exited, stopping input thread");
    channels.cancel_event_thread();
    result
}
