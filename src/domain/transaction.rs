//! Dated income and expense records.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    category::Category,
    common::{Amounted, EntityId, Identifiable},
};

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub category: Category,
    #[serde(default)]
    pub description: String,
    /// ISO `YYYY-MM-DD` date, kept as text.
    pub date: String,
}

impl Transaction {
    pub fn from_draft(id: EntityId, draft: TransactionDraft) -> Self {
        Self {
            id,
            kind: draft.kind,
            amount: draft.amount,
            category: draft.category,
            description: draft.description,
            date: draft.date,
        }
    }

    /// Applies every field set on `patch`, leaving the others untouched.
    pub fn apply(&mut self, patch: TransactionPatch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
    }

    /// Parses the stored date for display purposes.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, ISO_DATE_FORMAT).ok()
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Amounted for Transaction {
    fn amount(&self) -> f64 {
        self.amount
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        };
        f.write_str(label)
    }
}

/// Field values for a transaction that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub amount: f64,
    pub category: Category,
    pub description: String,
    pub date: String,
}

impl TransactionDraft {
    pub fn new(
        kind: TransactionKind,
        amount: f64,
        category: impl Into<Category>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            amount,
            category: category.into(),
            description: String::new(),
            date: date.into(),
        }
    }

    pub fn income(amount: f64, category: impl Into<Category>, date: impl Into<String>) -> Self {
        Self::new(TransactionKind::Income, amount, category, date)
    }

    pub fn expense(amount: f64, category: impl Into<Category>, date: impl Into<String>) -> Self {
        Self::new(TransactionKind::Expense, amount, category, date)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Partial update for a transaction. The id is deliberately absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub kind: Option<TransactionKind>,
    pub amount: Option<f64>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub date: Option<String>,
}

impl TransactionPatch {
    pub fn amount(amount: f64) -> Self {
        Self {
            amount: Some(amount),
            ..Self::default()
        }
    }
}
