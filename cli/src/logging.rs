//! Logging configuration with file-based output and size-based rotation.
//!
//! Writes logs to `~/.config/scoreboard/scoreboard.log` (or platform
//! equivalent) with 10 MB size-based rotation. Each layer has its own filter:
//! the file always records the per-tick rotation lines, the console stays at
//! `info` so it doesn't drown the REPL. Set `DEBUG_LOGGING=1` to get debug
//! output for the scoreboard crates on the console too.

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const FILE_DIRECTIVE: &str = "info,scoreboard_core::rotation=debug";
const DEBUG_DIRECTIVE: &str = "info,scoreboard_core=debug,scoreboard_cli=debug";

/// Initialize logging with dual output (file + stdout).
///
/// Returns a `WorkerGuard` that must be held for the process lifetime so
/// buffered lines are flushed on exit. Falls back to stdout-only logging
/// (returning `None`) when the log file cannot be opened.
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let Some(log_dir) = dirs::config_dir().map(|config| config.join("scoreboard")) else {
        init_stdout_only(debug_logging);
        return None;
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        // Subscriber not installed yet
        eprintln!(
            "Failed to create log directory {:?}: {}, using stdout only",
            log_dir, e
        );
        init_stdout_only(debug_logging);
        return None;
    }

    // 10 MB, keep scoreboard.log and scoreboard.log.1
    let log_path = log_dir.join("scoreboard.log");
    let file_appender = match BasicRollingFileAppender::new(
        &log_path,
        RollingConditionBasic::new().max_size(10 * 1024 * 1024),
        1,
    ) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Failed to create log file at {:?}: {}", log_path, e);
            init_stdout_only(debug_logging);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true)
        .with_span_events(FmtSpan::NONE)
        .with_filter(file_filter(debug_logging));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer(debug_logging))
        .init();

    tracing::info!(
        log_file = ?log_path,
        debug_logging,
        "Scoreboard logging initialized"
    );

    Some(guard)
}

/// Rotation ticks are too chatty for the console but are what you want in
/// the file when a board looks stuck.
fn file_filter(debug_logging: bool) -> EnvFilter {
    if debug_logging {
        EnvFilter::new(DEBUG_DIRECTIVE)
    } else {
        EnvFilter::new(FILE_DIRECTIVE)
    }
}

/// `RUST_LOG` wins over the built-in console levels.
fn stdout_filter(debug_logging: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug_logging {
            EnvFilter::new(DEBUG_DIRECTIVE)
        } else {
            EnvFilter::new("info")
        }
    })
}

fn stdout_layer<S>(debug_logging: bool) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_filter(stdout_filter(debug_logging))
}

/// Fallback when file logging is unavailable.
fn init_stdout_only(debug_logging: bool) {
    tracing_subscriber::registry()
        .with(stdout_layer(debug_logging))
        .init();
}
