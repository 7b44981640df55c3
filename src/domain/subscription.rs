//! Recurring monthly obligations and their reminder settings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{
    category::Category,
    common::{Amounted, EntityId, Identifiable},
};

/// Reminder threshold used for payment reminders without an explicit value.
pub const DEFAULT_PAYMENT_REMINDER_DAYS: u32 = 3;
/// Fixed look-ahead window for cancellation reminders.
pub const CANCEL_REMINDER_DAYS: u32 = 7;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: EntityId,
    pub name: String,
    pub amount: f64,
    pub category: Category,
    /// Day of month the charge recurs on, 1 through 31.
    pub billing_day: u32,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_type: Option<ReminderType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_days: Option<u32>,
}

impl Subscription {
    pub fn from_draft(id: EntityId, draft: SubscriptionDraft) -> Self {
        Self {
            id,
            name: draft.name,
            amount: draft.amount,
            category: draft.category,
            billing_day: draft.billing_day,
            active: draft.active,
            reminder_type: Some(draft.reminder_type),
            reminder_days: draft.reminder_days,
        }
    }

    /// Reminder mode, treating an absent value as [`ReminderType::None`].
    pub fn reminder(&self) -> ReminderType {
        self.reminder_type.unwrap_or_default()
    }

    /// Days-before-billing threshold for payment reminders.
    pub fn payment_threshold(&self) -> u32 {
        self.reminder_days.unwrap_or(DEFAULT_PAYMENT_REMINDER_DAYS)
    }

    pub fn toggle(&mut self) {
        self.active = !self.active;
    }

    pub fn apply(&mut self, patch: SubscriptionPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(day) = patch.billing_day {
            self.billing_day = day;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        if let Some(reminder) = patch.reminder_type {
            self.reminder_type = Some(reminder);
        }
        if let Some(days) = patch.reminder_days {
            self.reminder_days = days;
        }
    }
}

impl Identifiable for Subscription {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Amounted for Subscription {
    fn amount(&self) -> f64 {
        self.amount
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReminderType {
    #[default]
    None,
    Payment,
    Cancel,
}

impl ReminderType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Some(ReminderType::None),
            "payment" => Some(ReminderType::Payment),
            "cancel" => Some(ReminderType::Cancel),
            _ => None,
        }
    }
}

impl fmt::Display for ReminderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReminderType::None => "none",
            ReminderType::Payment => "payment",
            ReminderType::Cancel => "cancel",
        };
        f.write_str(label)
    }
}

/// Field values for a subscription that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionDraft {
    pub name: String,
    pub amount: f64,
    pub category: Category,
    pub billing_day: u32,
    pub active: bool,
    pub reminder_type: ReminderType,
    pub reminder_days: Option<u32>,
}

impl SubscriptionDraft {
    pub fn new(
        name: impl Into<String>,
        amount: f64,
        category: impl Into<Category>,
        billing_day: u32,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            category: category.into(),
            billing_day,
            active: true,
            reminder_type: ReminderType::None,
            reminder_days: None,
        }
    }

    pub fn with_payment_reminder(mut self, days: Option<u32>) -> Self {
        self.reminder_type = ReminderType::Payment;
        self.reminder_days = days;
        self
    }

    pub fn with_cancel_reminder(mut self) -> Self {
        self.reminder_type = ReminderType::Cancel;
        self.reminder_days = None;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Partial update for a subscription. `reminder_days` is doubly optional so a
/// patch can clear the value as well as set it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionPatch {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<Category>,
    pub billing_day: Option<u32>,
    pub active: Option<bool>,
    pub reminder_type: Option<ReminderType>,
    pub reminder_days: Option<Option<u32>>,
}
