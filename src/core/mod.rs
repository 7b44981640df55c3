pub mod clock;
pub mod services;
pub mod store;
pub mod utils;

pub use clock::{Clock, FixedClock, SystemClock};
pub use store::{ClearConfirmation, DataStore, ImportSummary, ListenerId, LoadOutcome};
