mod common;

use std::fs;

use chrono::NaiveDate;
use moni_core::{
    config::Config,
    core::store::LoadOutcome,
    domain::{SubscriptionDraft, TransactionDraft},
    storage::{JsonStorage, StorageBackend},
};

use common::{open_store, setup_test_env, temp_base, KEY};

#[test]
fn data_survives_reopening() {
    let (mut store, _, base) = setup_test_env();
    store
        .add_transaction(TransactionDraft::income(2500.0, "Salario", "2024-05-01"))
        .unwrap();
    store
        .add_subscription(SubscriptionDraft::new("Netflix", 12.99, "Ocio: Streaming", 15))
        .unwrap();

    let reopened = open_store(&base);
    assert_eq!(reopened.load_outcome(), &LoadOutcome::Loaded);
    assert_eq!(reopened.get(), store.get());
}

#[test]
fn slot_file_uses_browser_field_names() {
    let (mut store, _, base) = setup_test_env();
    store
        .add_subscription(
            SubscriptionDraft::new("Gym", 30.0, "Salud", 5).with_payment_reminder(Some(2)),
        )
        .unwrap();
    let text = fs::read_to_string(base.join("data").join(format!("{KEY}.json"))).unwrap();
    assert!(text.contains("\"billingDay\":5"));
    assert!(text.contains("\"reminderType\":\"payment\""));
    assert!(text.contains("\"reminderDays\":2"));
}

#[test]
fn corrupt_slot_recovers_to_empty_and_is_overwritten_on_next_save() {
    let base = temp_base();
    let storage = JsonStorage::new(Some(base.join("data"))).unwrap();
    fs::write(storage.slot_path(KEY), "{\"transactions\": [oops").unwrap();

    let mut store = open_store(&base);
    assert!(matches!(store.load_outcome(), LoadOutcome::Recovered(_)));
    assert!(store.get().is_empty());

    store
        .add_transaction(TransactionDraft::expense(3.0, "Alimentación: Café y Snacks", "2024-05-03"))
        .unwrap();
    assert_eq!(open_store(&base).load_outcome(), &LoadOutcome::Loaded);
}

#[test]
fn writes_leave_no_temp_files_behind() {
    let base = temp_base();
    let storage = JsonStorage::new(Some(base.join("data"))).unwrap();
    storage.write(KEY, "{}").unwrap();
    storage
        .write(KEY, "{\"transactions\":[],\"subscriptions\":[]}")
        .unwrap();
    let names: Vec<String> = fs::read_dir(storage.root())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec![format!("{KEY}.json")]);
}

#[test]
fn exported_backup_restores_into_a_fresh_store() {
    let (mut store, _, base) = setup_test_env();
    store
        .add_transaction(TransactionDraft::expense(80.0, "Vivienda: Alquiler", "2024-05-01"))
        .unwrap();
    store.set_credential(Some("secret".into()));
    let today = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
    let path = store.export_to_dir(&base.join("exports"), today).unwrap();
    assert_eq!(
        path.file_name().and_then(|name| name.to_str()),
        Some("moni_backup_2024-05-31.json")
    );

    let mut fresh = open_store(&temp_base());
    let summary = fresh
        .import_data(&fs::read_to_string(path).unwrap())
        .unwrap();
    assert_eq!(summary.transactions, 1);
    assert_eq!(fresh.get(), store.get());
}

#[test]
fn config_round_trips_next_to_the_data() {
    let (_, manager, base) = setup_test_env();
    assert_eq!(manager.load().unwrap(), Config::default());

    let config = Config {
        data_dir: Some(base.join("custom")),
        ..Config::default()
    };
    manager.save(&config).unwrap();
    let loaded = manager.load().unwrap();
    assert_eq!(loaded.data_dir_in(manager.base_dir()), base.join("custom"));
}
