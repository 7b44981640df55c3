mod common;

use std::collections::HashSet;

use chrono::NaiveDate;
use moni_core::{
    core::services::{AlertKind, CategoryTotal},
    domain::{MonthKey, SubscriptionDraft, TransactionDraft, TransactionPatch},
    transfer::{export_blob, import_blob},
    ReminderService, SummaryService,
};

use common::setup_test_env;

fn may(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
}

#[test]
fn monthly_summary_matches_worked_example() {
    let (mut store, _, _) = setup_test_env();
    store
        .add_transaction(TransactionDraft::income(100.0, "Salario", "2024-05-01"))
        .unwrap();
    store
        .add_transaction(TransactionDraft::expense(40.0, "Food", "2024-05-02"))
        .unwrap();
    store
        .add_subscription(SubscriptionDraft::new("Meal box", 20.0, "Food", 12))
        .unwrap();

    let summary =
        SummaryService::compute_summary(store.get(), &MonthKey::parse("2024-05").unwrap());
    assert_eq!(summary.income, 100.0);
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
fn paused_subscriptions_leave_totals_and_reminders() {
    let (mut store, _, _) = setup_test_env();
    let id = store
        .add_subscription(SubscriptionDraft::new("Gym", 30.0, "Salud", 11).with_cancel_reminder())
        .unwrap();
    assert_eq!(
        ReminderService::compute_reminders(&store.get().subscriptions, may(10)).len(),
        1
    );

    assert!(store.toggle_subscription(&id));
    let data = store.get();
    assert!(ReminderService::compute_reminders(&data.subscriptions, may(10)).is_empty());
    let summary = SummaryService::compute_summary(data, &MonthKey::from_date(may(10)));
    assert_eq!(summary.subscriptions_total, 0.0);
    assert_eq!(data.subscriptions.len(), 1);
}

#[test]
fn reminders_come_soonest_first() {
    let (mut store, _, _) = setup_test_env();
    store
        .add_subscription(
            SubscriptionDraft::new("Later", 5.0, "Ocio", 15).with_payment_reminder(Some(7)),
        )
        .unwrap();
    store
        .add_subscription(
            SubscriptionDraft::new("Sooner", 5.0, "Ocio", 11).with_payment_reminder(Some(7)),
        )
        .unwrap();

    let alerts = ReminderService::compute_reminders(&store.get().subscriptions, may(10));
    let names: Vec<&str> = alerts
        .iter()
        .map(|alert| alert.subscription.name.as_str())
        .collect();
    assert_eq!(names, vec!["Sooner", "Later"]);
    assert!(alerts.iter().all(|alert| alert.kind == AlertKind::Payment));
}

#[test]
fn generated_ids_are_distinct() {
    let (mut store, _, _) = setup_test_env();
    let ids: HashSet<_> = (0..50)
        .map(|n| {
            store
                .add_transaction(TransactionDraft::expense(n as f64, "x", "2024-05-01"))
                .unwrap()
        })
        .collect();
    assert_eq!(ids.len(), 50);
}

#[test]
fn editing_amount_changes_nothing_else() {
    let (mut store, _, _) = setup_test_env();
    let id = store
        .add_transaction(
            TransactionDraft::expense(20.0, "Transporte: Taxi", "2024-05-07")
                .with_description("airport"),
        )
        .unwrap();
    let before = store.get().transaction(&id).unwrap().clone();
    assert!(store.edit_transaction(&id, TransactionPatch::amount(50.0)));
    let after = store.get().transaction(&id).unwrap();
    assert_eq!(after.amount, 50.0);
    assert_eq!(after.category, before.category);
    assert_eq!(after.date, before.date);
    assert_eq!(after.description, before.description);
}

#[test]
fn store_contents_round_trip_through_blobs() {
    let (mut store, _, _) = setup_test_env();
    store
        .add_transaction(TransactionDraft::income(10.0, "Ventas", "2024-05-01"))
        .unwrap();
    store
        .add_subscription(SubscriptionDraft::new("Cloud", 1.5, "Tecnología: Apps", 31).inactive())
        .unwrap();
    let blob = export_blob(store.get()).unwrap();
    assert_eq!(&import_blob(&blob).unwrap(), store.get());
}
