use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    core::utils::ensure_dir,
    domain::{
        DataSet, EntityId, StoredAnalysis, Subscription, SubscriptionDraft, SubscriptionPatch,
        Transaction, TransactionDraft, TransactionPatch, ISO_DATE_FORMAT,
    },
    errors::{ImportError, MoniError, Result},
    storage::{json_backend::save_text_to_path, StorageBackend},
    transfer,
};

pub type Listener = Box<dyn FnMut(&DataSet)>;

/// Handle returned by [`DataStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// What happened when the slot was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing stored yet.
    Empty,
    Loaded,
    /// The slot was unreadable; the store started empty.
    Recovered(String),
}

/// Token required by [`DataStore::clear_all`] so wiping everything is never
/// an accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearConfirmation(());

impl ClearConfirmation {
    pub fn confirmed() -> Self {
        Self(())
    }
}

/// Result of a successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub message: String,
    pub transactions: usize,
    pub subscriptions: usize,
}

/// Owns the canonical data set and persists it after every mutation.
pub struct DataStore {
    storage: Box<dyn StorageBackend>,
    key: String,
    data: DataSet,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    load_outcome: LoadOutcome,
    last_save_error: Option<MoniError>,
}

impl DataStore {
    /// Opens the slot named `key` and loads whatever it holds.
    pub fn open(storage: Box<dyn StorageBackend>, key: impl Into<String>) -> Self {
        let mut store = Self {
            storage,
            key: key.into(),
            data: DataSet::default(),
            listeners: Vec::new(),
            next_listener: 0,
            load_outcome: LoadOutcome::Empty,
            last_save_error: None,
        };
        store.load();
        store
    }

    /// Re-reads the slot. Never fails: unreadable content yields an empty data set.
    pub fn load(&mut self) -> LoadOutcome {
        let outcome = match self.storage.read(&self.key) {
            Ok(None) => {
                self.data = DataSet::default();
                LoadOutcome::Empty
            }
            Ok(Some(text)) => match serde_json::from_str::<DataSet>(&text) {
                Ok(data) => {
                    self.data = data;
                    LoadOutcome::Loaded
                }
                Err(err) => self.recover(err.to_string()),
            },
            Err(err) => self.recover(err.to_string()),
        };
        tracing::info!(
            key = %self.key,
            transactions = self.data.transactions.len(),
            subscriptions = self.data.subscriptions.len(),
            "data set loaded"
        );
        self.load_outcome = outcome.clone();
        outcome
    }

    fn recover(&mut self, reason: String) -> LoadOutcome {
        tracing::error!(key = %self.key, %reason, "stored data unreadable, starting empty");
        self.data = DataSet::default();
        LoadOutcome::Recovered(reason)
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Writes the whole data set to the slot.
    pub fn save(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.data)?;
        self.storage.write(&self.key, &json)
    }

    pub fn last_save_error(&self) -> Option<&MoniError> {
        self.last_save_error.as_ref()
    }

    pub fn get(&self) -> &DataSet {
        &self.data
    }

    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn add_transaction(&mut self, draft: TransactionDraft) -> Result<EntityId> {
        validate_amount(draft.amount)?;
        validate_date(&draft.date)?;
        let id = self
            .data
            .add_transaction(Transaction::from_draft(EntityId::generate(), draft));
        tracing::debug!(%id, "transaction added");
        self.commit();
        Ok(id)
    }

    /// Applies `patch` to the transaction `id`. Returns `false` when the id is
    /// unknown or the patch carries an invalid value.
    pub fn edit_transaction(&mut self, id: &EntityId, patch: TransactionPatch) -> bool {
        if let Err(err) = check_transaction_patch(&patch) {
            tracing::warn!(%id, %err, "transaction edit rejected");
            return false;
        }
        let Some(txn) = self.data.transaction_mut(id) else {
            return false;
        };
        txn.apply(patch);
        tracing::debug!(%id, "transaction edited");
        self.commit();
        true
    }

    pub fn delete_transaction(&mut self, id: &EntityId) -> bool {
        if self.data.remove_transaction(id).is_none() {
            return false;
        }
        tracing::debug!(%id, "transaction deleted");
        self.commit();
        true
    }

    pub fn add_subscription(&mut self, draft: SubscriptionDraft) -> Result<EntityId> {
        validate_amount(draft.amount)?;
        validate_billing_day(draft.billing_day)?;
        if draft.name.trim().is_empty() {
            return Err(MoniError::InvalidInput(
                "subscription name must not be empty".into(),
            ));
        }
        let id = self
            .data
            .add_subscription(Subscription::from_draft(EntityId::generate(), draft));
        tracing::debug!(%id, "subscription added");
        self.commit();
        Ok(id)
    }

    pub fn edit_subscription(&mut self, id: &EntityId, patch: SubscriptionPatch) -> bool {
        if let Err(err) = check_subscription_patch(&patch) {
            tracing::warn!(%id, %err, "subscription edit rejected");
            return false;
        }
        let Some(sub) = self.data.subscription_mut(id) else {
            return false;
        };
        sub.apply(patch);
        tracing::debug!(%id, "subscription edited");
        self.commit();
        true
    }

    pub fn toggle_subscription(&mut self, id: &EntityId) -> bool {
        let Some(sub) = self.data.subscription_mut(id) else {
            return false;
        };
        sub.toggle();
        tracing::debug!(%id, active = sub.active, "subscription toggled");
        self.commit();
        true
    }

    pub fn delete_subscription(&mut self, id: &EntityId) -> bool {
        if self.data.remove_subscription(id).is_none() {
            return false;
        }
        tracing::debug!(%id, "subscription deleted");
        self.commit();
        true
    }

    /// Stores the advisor API key. Blank keys clear it.
    pub fn set_credential(&mut self, key: Option<String>) {
        self.data.api_key = key
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        tracing::debug!(present = self.data.api_key.is_some(), "credential updated");
        self.commit();
    }

    pub fn save_analysis(&mut self, text: impl Into<String>, created_at: DateTime<Utc>) {
        self.data.analysis = Some(StoredAnalysis {
            text: text.into(),
            created_at,
        });
        tracing::debug!("analysis stored");
        self.commit();
    }

    pub fn clear_all(&mut self, _confirmation: ClearConfirmation) {
        self.data = DataSet::default();
        tracing::info!(key = %self.key, "all data cleared");
        self.commit();
    }

    /// Replaces everything with the contents of `text`. On error nothing changes.
    pub fn import_data(&mut self, text: &str) -> std::result::Result<ImportSummary, ImportError> {
        let incoming = match transfer::import_blob(text) {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(kind = %err.kind, message = %err.message, "import rejected");
                return Err(err);
            }
        };
        let summary = ImportSummary {
            message: format!(
                "Data imported successfully: {} transactions, {} subscriptions.",
                incoming.transactions.len(),
                incoming.subscriptions.len()
            ),
            transactions: incoming.transactions.len(),
            subscriptions: incoming.subscriptions.len(),
        };
        self.data = incoming;
        tracing::info!(
            transactions = summary.transactions,
            subscriptions = summary.subscriptions,
            "data imported"
        );
        self.commit();
        Ok(summary)
    }

    pub fn export_data(&self) -> Result<String> {
        transfer::export_blob(&self.data)
    }

    /// Writes a backup file named after `today` into `dir` and returns its path.
    pub fn export_to_dir(&self, dir: &Path, today: NaiveDate) -> Result<PathBuf> {
        ensure_dir(dir)?;
        let path = dir.join(transfer::backup_file_name(today));
        save_text_to_path(&path, &self.export_data()?)?;
        tracing::info!(path = %path.display(), "data exported");
        Ok(path)
    }

    fn commit(&mut self) {
        match self.save() {
            Ok(()) => self.last_save_error = None,
            Err(err) => {
                tracing::error!(key = %self.key, %err, "failed to persist data set");
                self.last_save_error = Some(err);
            }
        }
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.data);
        }
    }
}

fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(MoniError::InvalidInput(format!(
            "amount must be a non-negative number, got {amount}"
        )))
    }
}

fn validate_billing_day(day: u32) -> Result<()> {
    if (1..=31).contains(&day) {
        Ok(())
    } else {
        Err(MoniError::InvalidInput(format!(
            "billing day must be between 1 and 31, got {day}"
        )))
    }
}

/// Accepts only the zero-padded `YYYY-MM-DD` form, since month membership is
/// a prefix test on the stored text.
fn validate_date(date: &str) -> Result<()> {
    match NaiveDate::parse_from_str(date, ISO_DATE_FORMAT) {
        Ok(parsed) if parsed.format(ISO_DATE_FORMAT).to_string() == date => Ok(()),
        _ => Err(MoniError::InvalidInput(format!(
            "`{date}` is not a YYYY-MM-DD date"
        ))),
    }
}

fn check_transaction_patch(patch: &TransactionPatch) -> Result<()> {
    if let Some(amount) = patch.amount {
        validate_amount(amount)?;
    }
    if let Some(date) = &patch.date {
        validate_date(date)?;
    }
    Ok(())
}

fn check_subscription_patch(patch: &SubscriptionPatch) -> Result<()> {
    if let Some(amount) = patch.amount {
        validate_amount(amount)?;
    }
    if let Some(day) = patch.billing_day {
        validate_billing_day(day)?;
    }
    Ok(())
}
