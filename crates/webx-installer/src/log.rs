use serde::Serialize;
use std::fmt;

const EXCEPTION_PREFIX: &str = "ExceptionError: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogType {
    Info,
    Warning,
    Failure,
    StartJob,
    EndJob,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Info => "Info",
            LogType::Warning => "Warning",
            LogType::Failure => "Failure",
            LogType::StartJob => "StartJob",
            LogType::EndJob => "EndJob",
        }
    }

    /// Localization key of the type label, e.g. `LOG.PALogger.Failure`.
    pub fn resource_key(&self) -> String {
        format!("LOG.PALogger.{}", self.as_str())
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub kind: LogType,
    pub description: String,
}

/// Outcome of an installation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub valid: bool,
    pub has_warnings: bool,
    pub entries: usize,
}

/// Append-only installer log.
///
/// Only failures affect validity; warnings are tracked separately.
#[derive(Debug, Clone)]
pub struct InstallLogger {
    entries: Vec<LogEntry>,
    valid: bool,
    has_warnings: bool,
}

impl Default for InstallLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl InstallLogger {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            valid: true,
            has_warnings: false,
        }
    }

    pub fn add_failure(&mut self, failure: impl Into<String>) {
        let failure = failure.into();
        tracing::error!("{}", failure);
        self.push(LogType::Failure, failure);
        self.valid = false;
    }

    pub fn add_failure_error(&mut self, err: &dyn std::error::Error) {
        self.add_failure(format!("{}{}", EXCEPTION_PREFIX, err));
    }

    pub fn add_info(&mut self, info: impl Into<String>) {
        let info = info.into();
        tracing::info!("{}", info);
        self.push(LogType::Info, info);
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        tracing::warn!("{}", warning);
        self.push(LogType::Warning, warning);
        self.has_warnings = true;
    }

    pub fn start_job(&mut self, job: impl Into<String>) {
        let job = job.into();
        tracing::info!("{}", job);
        self.push(LogType::StartJob, job);
    }

    pub fn end_job(&mut self, job: impl Into<String>) {
        let job = job.into();
        tracing::info!("{}", job);
        self.push(LogType::EndJob, job);
    }

    /// Restores validity for a retried step. Entries and warnings are kept.
    pub fn reset_flags(&mut self) {
        self.valid = true;
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn has_warnings(&self) -> bool {
        self.has_warnings
    }

    pub fn report(&self) -> InstallReport {
        InstallReport {
            valid: self.valid,
            has_warnings: self.has_warnings,
            entries: self.entries.len(),
        }
    }

    pub fn finish(self) -> (InstallReport, Vec<LogEntry>) {
        (self.report(), self.entries)
    }

    fn push(&mut self, kind: LogType, description: String) {
        self.entries.push(LogEntry { kind, description });
    }
}
