//! Tracing setup for the command line.
//!
//! Everything goes to a daily-rotated `wbe.log` in the temp directory. Unless
//! `--quiet` is given, the same events are also written to stderr.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

use crate::args::Output;

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the level is `info`, `debug` with one
/// `-v` or `debug = true` in the settings, and `trace` with more.
///
/// Returns a `WorkerGuard` that must be kept alive for the file logging to work.
pub fn init_tracing(output: Output, debug: bool) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(std::env::temp_dir(), "wbe.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let level = output.log_level(debug);
    let env_filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter());

    let stderr_layer = output.prints().then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(env_filter())
    });

    Registry::default().with(file_layer).with(stderr_layer).init();

    guard
}
