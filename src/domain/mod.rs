//! Pure data types for the tracker. No I/O happens here.

pub mod category;
pub mod common;
pub mod data_set;
pub mod subscription;
pub mod transaction;

pub use category::Category;
pub use common::{Amounted, EntityId, Identifiable, MonthKey};
pub use data_set::{DataSet, StoredAnalysis};
pub use subscription::{
    ReminderType, Subscription, SubscriptionDraft, SubscriptionPatch, CANCEL_REMINDER_DAYS,
    DEFAULT_PAYMENT_REMINDER_DAYS,
};
pub use transaction::{
    Transaction, TransactionDraft, TransactionKind, TransactionPatch, ISO_DATE_FORMAT,
};
