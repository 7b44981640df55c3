#![doc(test(attr(deny(warnings))))]

//! Moni Core keeps a local log of income, expenses and recurring
//! subscriptions, and derives monthly summaries, category breakdowns and
//! billing reminders from it.

pub mod advisor;
pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod transfer;
pub mod utils;

pub use crate::core::services::{ReminderService, SummaryService};
pub use crate::core::store::DataStore;
pub use errors::{MoniError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Moni Core tracing initialized.");
    });
}
