//! Billing reminders derived from active subscriptions.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::currency::CurrencyFormatter;
use crate::domain::{ReminderType, Subscription, CANCEL_REMINDER_DAYS};

/// Which reminder an alert represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Payment,
    Cancel,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AlertKind::Payment => "payment",
            AlertKind::Cancel => "cancel",
        };
        f.write_str(label)
    }
}

/// A subscription whose next billing date falls inside its reminder window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub subscription: Subscription,
    pub kind: AlertKind,
    pub days_until: i64,
    pub due_date: NaiveDate,
}

impl Alert {
    pub fn is_due_today(&self) -> bool {
        self.days_until == 0
    }

    /// One-line reminder text for display.
    pub fn describe(&self, formatter: &CurrencyFormatter) -> String {
        let when = if self.is_due_today() {
            "today".to_string()
        } else if self.days_until == 1 {
            "in 1 day".to_string()
        } else {
            format!("in {} days", self.days_until)
        };
        match self.kind {
            AlertKind::Cancel => format!(
                "Remember to cancel {}. It renews {}.",
                self.subscription.name, when
            ),
            AlertKind::Payment => format!(
                "Payment for {} ({}) is due {}.",
                self.subscription.name,
                formatter.format(self.subscription.amount),
                when
            ),
        }
    }
}

/// Computes reminder schedules. Stateless; call again whenever inputs change.
pub struct ReminderService;

impl ReminderService {
    /// Returns the alerts due on or after `today`, soonest first.
    ///
    /// Only active subscriptions with a payment or cancel reminder take part.
    /// Payment reminders fire within `reminder_days` (default 3) of billing,
    /// cancel reminders within a fixed seven days. Ties keep input order.
    pub fn compute_reminders(subscriptions: &[Subscription], today: NaiveDate) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = subscriptions
            .iter()
            .filter(|sub| sub.active)
            .filter_map(|sub| {
                let (kind, threshold) = match sub.reminder() {
                    ReminderType::None => return None,
                    ReminderType::Payment => (AlertKind::Payment, sub.payment_threshold()),
                    ReminderType::Cancel => (AlertKind::Cancel, CANCEL_REMINDER_DAYS),
                };
                let due_date = next_billing_date(sub.billing_day, today);
                let days_until = (due_date - today).num_days();
                (days_until <= i64::from(threshold)).then(|| Alert {
                    subscription: sub.clone(),
                    kind,
                    days_until,
                    due_date,
                })
            })
            .collect();
        alerts.sort_by_key(|alert| alert.days_until);
        alerts
    }
}

/// Next date on or after `today` that falls on `billing_day`.
///
/// A billing day past the end of a month lands on that month's last day.
pub fn next_billing_date(billing_day: u32, today: NaiveDate) -> NaiveDate {
    let this_month = billing_date_in(today.year(), today.month(), billing_day);
    if this_month >= today {
        return this_month;
    }
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    billing_date_in(year, month, billing_day)
}

fn billing_date_in(year: i32, month: u32, billing_day: u32) -> NaiveDate {
    let last = days_in_month(year, month);
    let day = billing_day.clamp(1, last);
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MAX)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|first_next| (first_next - Duration::days(1)).day())
        .unwrap_or(28)
}
