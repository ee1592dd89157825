//! A [`log`] backend that speaks GitHub Actions' workflow command syntax.
use std::{
    env,
    io::{self, Write},
};

use log::{Level, LevelFilter, Log, Metadata, Record};

/// The log target used for lines that must be printed without any prefix.
pub const CI_LOG_GROUPING: &str = "CI_LOG_GROUPING";

/// Prints log records as workflow commands.
///
/// - `error` records become `::error::` annotations
/// - `warn` records become `::warning::` annotations
/// - `debug` and `trace` records become `::debug::` lines
/// - `info` records are printed as-is
///
/// Records with the target [`CI_LOG_GROUPING`] are printed verbatim.
pub struct ActionsLogger;

impl ActionsLogger {
    /// Format a record's message as the line printed to stdout.
    pub fn format(level: Level, target: &str, message: &str) -> String {
        if target == CI_LOG_GROUPING {
            return message.to_string();
        }
        match level {
            Level::Error => format!("::error::{}", escape_data(message)),
            Level::Warn => format!("::warning::{}", escape_data(message)),
            Level::Info => message.to_string(),
            Level::Debug | Level::Trace => format!("::debug::{}", escape_data(message)),
        }
    }
}

impl Log for ActionsLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = Self::format(record.level(), record.target(), &record.args().to_string());
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        let _ = writeln!(handle, "{line}");
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

static LOGGER: ActionsLogger = ActionsLogger;

/// The level enabled by the runner's debug switches
/// (`ACTIONS_STEP_DEBUG=true` or `RUNNER_DEBUG=1`).
pub fn level_from_env() -> LevelFilter {
    level_from_vars(|name| env::var(name).ok())
}

/// Same as [`level_from_env()`], reading the variables through `lookup`.
pub fn level_from_vars<F>(lookup: F) -> LevelFilter
where
    F: Fn(&str) -> Option<String>,
{
    let step_debug = lookup("ACTIONS_STEP_DEBUG").is_some_and(|val| val == "true");
    let runner_debug = lookup("RUNNER_DEBUG").is_some_and(|val| val == "1");
    if step_debug || runner_debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Install [`ActionsLogger`] as the global logger.
///
/// Subsequent calls only adjust the max level.
pub fn init(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

/// Escape the characters that would otherwise end a workflow command's message.
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
