//! obsiver binary entrypoint kept minimal. The runtime lives in `obsiver::app`.

mod args;

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use clap::Parser;
use obsiver::state::{Selection, SessionOutcome};
use obsiver::{app, theme};

struct ObsiverTimer;

impl tracing_subscriber::fmt::time::FormatTime for ObsiverTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        // "YYYY-MM-DD-T HH:MM:SS"
        let ts = chrono::Local::now().format("%Y-%m-%d-T %H:%M:%S").to_string();
        w.write_str(&ts)
    }
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// What: Initialize tracing to `<config>/logs/obsiver.log`, falling back to stderr.
///
/// Inputs:
/// - `level`: Default filter when `RUST_LOG` is unset
fn init_logging(level: &str) {
    let make_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level))
    };
    let log_path = theme::logs_dir().join("obsiver.log");
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(make_filter())
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_timer(ObsiverTimer)
                .init();
            let _ = LOG_GUARD.set(guard);
            tracing::info!(path = %log_path.display(), "logging initialized");
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(make_filter())
                .with_target(false)
                .with_ansi(false)
                .with_writer(std::io::stderr)
                .with_timer(ObsiverTimer)
                .init();
            tracing::warn!(error = %e, "failed to open log file; using stderr");
        }
    }
}

/// Human-readable block printed after a confirmed selection.
fn selection_summary(sel: &Selection) -> String {
    format!(
        "Selected Obsidian release\n  Version:   {}\n  Image tag: {}",
        sel.version, sel.tag
    )
}

/// What: Print the outcome and return the process exit code.
///
/// Details:
/// - Selection goes to stdout (JSON with `--json`), failures to stderr with an `Error:` prefix.
fn report(outcome: &SessionOutcome, json: bool) -> i32 {
    match outcome {
        SessionOutcome::Selected(sel) => {
            if json {
                match serde_json::to_string(sel) {
                    Ok(s) => println!("{s}"),
                    Err(e) => {
                        eprintln!("Error: failed to encode selection: {e}");
                        return 1;
                    }
                }
            } else {
                println!("{}", selection_summary(sel));
            }
            0
        }
        SessionOutcome::Cancelled => {
            println!("Selection cancelled by user.");
            0
        }
        SessionOutcome::Failed(_) => {
            eprintln!("{outcome}");
            1
        }
    }
}

fn settings_for(path: Option<&Path>) -> theme::Settings {
    path.map_or_else(
        || theme::load_settings(&theme::settings_path()),
        theme::load_settings,
    )
}

#[tokio::main]
async fn main() {
    let args = args::Args::parse();
    init_logging(&args::determine_log_level(&args));
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "obsiver starting");

    let cache_dir = theme::cache_dir();
    if args.clear_cache {
        args::cache::handle_clear_cache(&cache_dir);
    }

    let settings = settings_for(args.config.as_deref());
    theme::init_theme(settings.theme);

    let opts = app::RunOptions {
        force_refresh: args.refresh,
        cache_dir,
    };
    let code = match app::run(&settings, opts).await {
        Ok(outcome) => {
            tracing::info!(outcome = %outcome, "session finished");
            report(&outcome, args.json)
        }
        Err(err) => {
            tracing::error!(error = %err, "application error");
            eprintln!("Error: {err}");
            1
        }
    };
    tracing::info!(code, "obsiver exited");
    std::process::exit(code);
}
