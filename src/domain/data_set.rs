use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    common::{EntityId, Identifiable},
    subscription::Subscription,
    transaction::Transaction,
};

/// Aggregate root persisted, exported, and imported as a single unit.
///
/// Transactions are kept most-recent-first; subscriptions keep creation order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataSet {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<StoredAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Cached advisor output with the moment it was produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnalysis {
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
            && self.subscriptions.is_empty()
            && self.analysis.is_none()
            && self.api_key.is_none()
    }

    /// Inserts at the head of the list to keep most-recent-first ordering.
    pub fn add_transaction(&mut self, transaction: Transaction) -> EntityId {
        let id = transaction.id.clone();
        self.transactions.insert(0, transaction);
        id
    }

    pub fn transaction(&self, id: &EntityId) -> Option<&Transaction> {
        find(&self.transactions, id)
    }

    pub fn transaction_mut(&mut self, id: &EntityId) -> Option<&mut Transaction> {
        find_mut(&mut self.transactions, id)
    }

    pub fn remove_transaction(&mut self, id: &EntityId) -> Option<Transaction> {
        let index = position(&self.transactions, id)?;
        Some(self.transactions.remove(index))
    }

    pub fn add_subscription(&mut self, subscription: Subscription) -> EntityId {
        let id = subscription.id.clone();
        self.subscriptions.push(subscription);
        id
    }

    pub fn subscription(&self, id: &EntityId) -> Option<&Subscription> {
        find(&self.subscriptions, id)
    }

    pub fn subscription_mut(&mut self, id: &EntityId) -> Option<&mut Subscription> {
        find_mut(&mut self.subscriptions, id)
    }

    pub fn remove_subscription(&mut self, id: &EntityId) -> Option<Subscription> {
        let index = position(&self.subscriptions, id)?;
        Some(self.subscriptions.remove(index))
    }

    pub fn active_subscriptions(&self) -> impl Iterator<Item = &Subscription> {
        self.subscriptions.iter().filter(|sub| sub.active)
    }
}

fn position<T: Identifiable>(items: &[T], id: &EntityId) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

fn find<'a, T: Identifiable>(items: &'a [T], id: &EntityId) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}

fn find_mut<'a, T: Identifiable>(items: &'a mut [T], id: &EntityId) -> Option<&'a mut T> {
    items.iter_mut().find(|item| item.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        subscription::SubscriptionDraft,
        transaction::TransactionDraft,
    };

    #[test]
    fn transactions_are_kept_most_recent_first() {
        let mut data = DataSet::new();
        data.add_transaction(Transaction::from_draft(
            EntityId::from("first"),
            TransactionDraft::income(10.0, "Salario", "2024-05-01"),
        ));
        data.add_transaction(Transaction::from_draft(
            EntityId::from("second"),
            TransactionDraft::expense(5.0, "Otros", "2024-05-02"),
        ));
        let ids: Vec<_> = data.transactions.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["second", "first"]);
    }

    #[test]
    fn subscriptions_keep_creation_order() {
        let mut data = DataSet::new();
        for name in ["a", "b", "c"] {
            data.add_subscription(Subscription::from_draft(
                EntityId::from(name),
                SubscriptionDraft::new(name, 1.0, "Ocio", 1),
            ));
        }
        let ids: Vec<_> = data.subscriptions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn same_id_may_exist_in_both_collections() {
        let mut data = DataSet::new();
        let shared = EntityId::from("shared");
        data.add_transaction(Transaction::from_draft(
            shared.clone(),
            TransactionDraft::income(1.0, "Otros", "2024-01-01"),
        ));
        data.add_subscription(Subscription::from_draft(
            shared.clone(),
            SubscriptionDraft::new("x", 1.0, "Ocio", 1),
        ));
        assert!(data.remove_transaction(&shared).is_some());
        assert!(data.subscription(&shared).is_some());
    }

    #[test]
    fn credential_serializes_as_api_key() {
        let data = DataSet {
            api_key: Some("secret".into()),
            ..DataSet::default()
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["apiKey"], "secret");
        assert!(json["transactions"].as_array().unwrap().is_empty());
    }
}
