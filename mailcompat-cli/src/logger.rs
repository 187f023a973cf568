//! Minimal stderr logger for `--verbose`.

use log::{Level, LevelFilter, Log, Metadata, Record};
use owo_colors::OwoColorize;

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            Level::Error => "ERROR".red().bold().to_string(),
            Level::Warn => "WARN ".yellow().bold().to_string(),
            Level::Info => "INFO ".green().to_string(),
            Level::Debug => "DEBUG".blue().to_string(),
            Level::Trace => "TRACE".dimmed().to_string(),
        };
        eprintln!("{level} {} {}", record.target().dimmed(), record.args());
    }

    fn flush(&self) {}
}

/// Install the logger at `level`.
pub fn init(level: LevelFilter) -> anyhow::Result<()> {
    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(level))
        .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))
}
