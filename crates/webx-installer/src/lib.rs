pub mod log;
pub mod table;

pub use log::{InstallLogger, InstallReport, LogEntry, LogType};
pub use table::{Localizer, LogTable, TypeNameLocalizer};
