//! Monthly aggregation of income, expenses, and category totals.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{Amounted, DataSet, MonthKey, Transaction, TransactionKind};

/// Number of category groups kept in the breakdown; the rest are dropped.
pub const BREAKDOWN_LIMIT: usize = 8;

/// Derived totals for one reference month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub month: String,
    pub income: f64,
    pub expense_from_transactions: f64,
    pub subscriptions_total: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub category_breakdown: Vec<CategoryTotal>,
}

/// Summed expense for one top-level category group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub group: String,
    pub amount: f64,
}

/// Aggregates the data set into monthly summaries. Stateless.
pub struct SummaryService;

impl SummaryService {
    /// Computes the summary for `month`.
    ///
    /// Transactions count when their date string starts with the month key.
    /// Every active subscription counts in full, whatever its billing day.
    pub fn compute_summary(data: &DataSet, month: &MonthKey) -> Summary {
        let monthly: Vec<&Transaction> = Self::month_transactions(data, month);

        let income = sum_kind(&monthly, TransactionKind::Income);
        let expense_from_transactions = sum_kind(&monthly, TransactionKind::Expense);
        let subscriptions_total = total(data.active_subscriptions());
        let total_expense = expense_from_transactions + subscriptions_total;

        let expenses = monthly
            .iter()
            .filter(|txn| txn.is_expense())
            .map(|txn| (txn.category.group(), txn.amount));
        let subscriptions = data
            .active_subscriptions()
            .map(|sub| (sub.category.group(), sub.amount));

        Summary {
            month: month.to_string(),
            income,
            expense_from_transactions,
            subscriptions_total,
            total_expense,
            balance: income - total_expense,
            category_breakdown: rank_groups(expenses.chain(subscriptions)),
        }
    }

    /// Transactions dated inside `month`, in stored (most-recent-first) order.
    pub fn month_transactions<'a>(data: &'a DataSet, month: &MonthKey) -> Vec<&'a Transaction> {
        data.transactions
            .iter()
            .filter(|txn| month.contains(&txn.date))
            .collect()
    }
}

fn sum_kind(transactions: &[&Transaction], kind: TransactionKind) -> f64 {
    total(transactions.iter().copied().filter(|txn| txn.kind == kind))
}

fn total<'a, T: Amounted + 'a>(items: impl Iterator<Item = &'a T>) -> f64 {
    items.map(Amounted::amount).sum()
}

/// Groups amounts by label, then keeps the largest groups.
///
/// Groups start in first-encountered order and the sort is stable, so equal
/// totals keep that order.
fn rank_groups<'a>(entries: impl Iterator<Item = (&'a str, f64)>) -> Vec<CategoryTotal> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for (group, amount) in entries {
        match index.get(group) {
            Some(&slot) => totals[slot].amount += amount,
            None => {
                index.insert(group, totals.len());
                totals.push(CategoryTotal {
                    group: group.to_string(),
                    amount,
                });
            }
        }
    }
    totals.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    totals.truncate(BREAKDOWN_LIMIT);
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        EntityId, Subscription, SubscriptionDraft, Transaction, TransactionDraft,
    };

    fn month(value: &str) -> MonthKey {
        MonthKey::parse(value).unwrap()
    }

    fn txn(id: &str, draft: TransactionDraft) -> Transaction {
        Transaction::from_draft(EntityId::from(id), draft)
    }

    fn sub(id: &str, draft: SubscriptionDraft) -> Subscription {
        Subscription::from_draft(EntityId::from(id), draft)
    }

    #[test]
    fn empty_data_yields_zero_summary() {
        let summary = SummaryService::compute_summary(&DataSet::new(), &month("2024-05"));
        assert_eq!(summary.income, 0.0);
        assert_eq!(summary.total_expense, 0.0);
        assert_eq!(summary.balance, 0.0);
        assert!(summary.category_breakdown.is_empty());
    }

    #[test]
    fn totals_combine_transactions_and_active_subscriptions() {
        let mut data = DataSet::new();
        data.add_transaction(txn("1", TransactionDraft::income(100.0, "Salario", "2024-05-01")));
        data.add_transaction(txn("2", TransactionDraft::expense(40.0, "Food", "2024-05-02")));
        data.add_subscription(sub("s", SubscriptionDraft::new("Box", 20.0, "Food", 9)));

        let summary = SummaryService::compute_summary(&data, &month("2024-05"));
        assert_eq!(summary.income, 100.0);
        assert_eq!(summary.expense_from_transactions, 40.0);
        assert_eq!(summary.subscriptions_total, 20.0);
        assert_eq!(summary.total_expense, 60.0);
        assert_eq!(summary.balance, 40.0);
        assert_eq!(
            summary.category_breakdown,
            vec![CategoryTotal {
                group: "Food".into(),
                amount: 60.0
            }]
        );
    }

    #[test]
    fn other_months_and_inactive_subscriptions_are_ignored() {
        let mut data = DataSet::new();
        data.add_transaction(txn("1", TransactionDraft::expense(70.0, "Ocio", "2024-04-30")));
        data.add_transaction(txn("2", TransactionDraft::income(10.0, "Ventas", "2024-06-01")));
        data.add_subscription(sub("s", SubscriptionDraft::new("Old", 9.0, "Ocio", 1).inactive()));

        let summary = SummaryService::compute_summary(&data, &month("2024-05"));
        assert_eq!(summary.total_expense, 0.0);
        assert_eq!(summary.income, 0.0);
        assert!(summary.category_breakdown.is_empty());
    }

    #[test]
    fn balance_may_go_negative() {
        let mut data = DataSet::new();
        data.add_transaction(txn("1", TransactionDraft::expense(80.5, "Vivienda: Alquiler", "2024-05-03")));
        let summary = SummaryService::compute_summary(&data, &month("2024-05"));
        assert_eq!(summary.balance, -80.5);
    }

    #[test]
    fn breakdown_groups_by_top_level_label() {
        let mut data = DataSet::new();
        data.add_transaction(txn("1", TransactionDraft::expense(10.0, "Transporte: Taxi", "2024-05-03")));
        data.add_transaction(txn("2", TransactionDraft::expense(15.0, "Transporte: Gasolina", "2024-05-04")));
        data.add_transaction(txn("3", TransactionDraft::income(500.0, "Transporte: Reembolso", "2024-05-05")));

        let summary = SummaryService::compute_summary(&data, &month("2024-05"));
        assert_eq!(summary.category_breakdown.len(), 1);
        assert_eq!(summary.category_breakdown[0].group, "Transporte");
        assert_eq!(summary.category_breakdown[0].amount, 25.0);
    }

    #[test]
    fn breakdown_keeps_top_eight_with_stable_ties() {
        let mut data = DataSet::new();
        // Inserted at the head, so the stored order is the reverse of insertion.
        for (index, group) in ["J", "I", "H", "G", "F", "E", "D", "C", "B", "A"].iter().enumerate() {
            let amount = if *group == "A" || *group == "B" { 5.0 } else { 1.0 + index as f64 };
            data.add_transaction(txn(
                &index.to_string(),
                TransactionDraft::expense(amount, *group, "2024-05-10"),
            ));
        }
        let summary = SummaryService::compute_summary(&data, &month("2024-05"));
        let groups: Vec<&str> = summary
            .category_breakdown
            .iter()
            .map(|entry| entry.group.as_str())
            .collect();
        assert_eq!(summary.category_breakdown.len(), BREAKDOWN_LIMIT);
        // A, B and F tie at 5.0 and keep their stored order.
        assert_eq!(groups, vec!["C", "D", "E", "A", "B", "F", "G", "H"]);
    }

    #[test]
    fn month_transactions_preserve_stored_order() {
        let mut data = DataSet::new();
        data.add_transaction(txn("old", TransactionDraft::expense(1.0, "x", "2024-05-01")));
        data.add_transaction(txn("other", TransactionDraft::expense(1.0, "x", "2024-04-01")));
        data.add_transaction(txn("new", TransactionDraft::expense(1.0, "x", "2024-05-20")));
        let ids: Vec<&str> = SummaryService::month_transactions(&data, &month("2024-05"))
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["new", "old"]);
    }
}
