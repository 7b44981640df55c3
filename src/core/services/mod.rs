pub mod reminder_service;
pub mod summary_service;

pub use reminder_service::{Alert, AlertKind, ReminderService};
pub use summary_service::{CategoryTotal, Summary, SummaryService, BREAKDOWN_LIMIT};
