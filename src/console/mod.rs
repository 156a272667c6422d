//! Debug console: one logger, many sinks.
//!
//! Messages go to every attached [`LogSink`]. The CLI installs the console as
//! the global `log` logger with a [`StderrSink`]; the app feeds it from the
//! engine's log layer and draws the [`PageLog`] over the scene.

mod page;

use std::sync::Arc;

pub use page::{PageLog, header_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Log,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug | log::Level::Trace => Self::Log,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    /// Local wall-clock time, `HH:MM:SS`.
    pub timestamp: String,
    pub message: String,
}

impl LogEntry {
    pub fn now(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            message: message.into(),
        }
    }

    /// `[HH:MM:SS] message`, as shown on the page.
    pub fn line(&self) -> String {
        format!("[{}] {}", self.timestamp, self.message)
    }
}

pub trait LogSink: Send + Sync {
    fn write(&self, entry: &LogEntry);
}

/// The console sink for native builds.
pub struct StderrSink;

impl LogSink for StderrSink {
    fn write(&self, entry: &LogEntry) {
        eprintln!("{} {:>5} {}", entry.timestamp, entry.level.as_str(), entry.message);
    }
}

/// Cheap to clone; clones share their sinks.
#[derive(Clone)]
pub struct DebugConsole {
    sinks: Arc<Vec<Box<dyn LogSink>>>,
    level: log::LevelFilter,
}

impl DebugConsole {
    pub fn new(level: log::LevelFilter, sinks: Vec<Box<dyn LogSink>>) -> Self {
        let console = Self {
            sinks: Arc::new(sinks),
            level,
        };
        console.record(LogLevel::Info, "Debug console initialized");
        console
    }

    pub fn record(&self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::now(level, message);
        for sink in self.sinks.iter() {
            sink.write(&entry);
        }
    }

    /// Become the global `log` logger.
    pub fn install(&self) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(self.clone()))?;
        log::set_max_level(self.level);
        Ok(())
    }

    /// Record panics before handing them to the previously installed hook.
    pub fn capture_panics(&self) {
        let console = self.clone();
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            console.record(LogLevel::Error, format!("PANIC: {info}"));
            previous(info);
        }));
    }
}

impl log::Log for DebugConsole {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            self.record(record.level().into(), record.args().to_string());
        }
    }

    fn flush(&self) {}
}
