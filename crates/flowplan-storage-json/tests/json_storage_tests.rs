use chrono::NaiveDate;
use flowplan_core::{CoreError, PlanStorage};
use flowplan_domain::{Category, Item, Plan, Recurrence, Target};
use flowplan_storage_json::{JsonPlanStorage, StoragePaths};
use std::fs;
use tempfile::tempdir;

fn storage_in(dir: &std::path::Path, retention: usize) -> (JsonPlanStorage, StoragePaths) {
    let paths = StoragePaths {
        plan_root: dir.join("plans"),
        backup_root: dir.join("backups"),
    };
    let storage = JsonPlanStorage::with_retention(paths.clone(), retention).expect("create storage");
    (storage, paths)
}

fn sample_plan(name: &str) -> Plan {
    let mut plan = Plan::new(name);
    plan.add_item(
        Item::new(Category::Income, "Salary")
            .with_amount(2500.0)
            .with_start_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .with_recurrence(Recurrence::Monthly),
    );
    plan.set_target(Target::new(
        10_000.0,
        NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
    ));
    plan
}

#[test]
fn json_storage_can_save_and_load_plan() {
    let dir = tempdir().expect("tempdir");
    let (storage, _) = storage_in(dir.path(), 5);

    let plan = sample_plan("Storage Test");
    storage.save_plan("Storage Test", &plan).expect("save plan");
    let loaded = storage.load_plan("storage test").expect("load plan");

    assert_eq!(loaded, plan);
    let path = storage.plan_path("Storage Test");
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("storage_test.json"));
    assert!(path.exists());
    assert_eq!(storage.list_plans().unwrap(), vec!["storage_test".to_string()]);
}

#[test]
fn missing_plan_is_reported_as_not_found() {
    let dir = tempdir().expect("tempdir");
    let (storage, _) = storage_in(dir.path(), 5);

    assert!(matches!(
        storage.load_plan("nope"),
        Err(CoreError::PlanNotFound(name)) if name == "nope"
    ));
    assert!(storage.delete_plan("nope").is_err());
}

#[test]
fn json_storage_creates_and_restores_backups() {
    let dir = tempdir().expect("tempdir");
    let (storage, paths) = storage_in(dir.path(), 5);

    let original = sample_plan("Backup");
    storage.save_plan("backup", &original).expect("save plan");
    let info = storage
        .backup_plan("backup", &original, Some("Before edits"))
        .expect("create backup");
    assert!(info.id.ends_with("_before-edits.json"));
    assert_eq!(info.path.parent(), Some(paths.backup_root.join("backup").as_path()));

    let mut edited = original.clone();
    edited.clear_target();
    storage.save_plan("backup", &edited).expect("save edited");
    assert!(storage.load_plan("backup").unwrap().target.is_none());

    let found = storage.find_backup("backup", &info.id).expect("find backup");
    let restored = storage.restore_backup(&found).expect("restore backup");
    assert_eq!(restored.target, original.target);
    assert_eq!(storage.load_plan("backup").unwrap().target, original.target);
}

#[test]
fn backups_are_pruned_to_retention() {
    let dir = tempdir().expect("tempdir");
    let (storage, _) = storage_in(dir.path(), 2);
    let plan = sample_plan("Pruned");

    for note in ["one", "two", "three", "four"] {
        storage.backup_plan("pruned", &plan, Some(note)).expect("backup");
    }
    let backups = storage.list_backups("pruned").expect("list backups");
    assert_eq!(backups.len(), 2);
    assert_eq!(storage.list_backup_metadata("pruned").unwrap().len(), 2);
}

#[test]
fn legacy_plan_files_are_normalized_on_load() {
    let dir = tempdir().expect("tempdir");
    let (storage, _) = storage_in(dir.path(), 5);

    let raw = serde_json::json!({
        "id": "7f1e6f0e-3c55-4d7e-9d0e-0b8f0c0c9a11",
        "name": "Legacy",
        "items": {
            "tarjeta": [{
                "id": "5b0d3b5e-2a8e-4c4a-8f4f-6c7b1d2e3f40",
                "category": "income",
                "label": "Visa",
                "amount": 120.0,
                "start_date": "2025-02-10",
                "recurrence": "monthly"
            }]
        },
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    });
    fs::write(storage.plan_path("legacy"), raw.to_string()).expect("write legacy file");

    let loaded = storage.load_plan("legacy").expect("load legacy plan");
    let items = loaded.items_in(Category::CreditCard);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].category, Category::CreditCard);

    let metadata = storage.list_plan_metadata().expect("metadata");
    assert_eq!(metadata.len(), 1);
    assert_eq!(metadata[0].item_count, 1);
    assert!(!metadata[0].has_target);
}

#[test]
fn unknown_recurrence_in_file_fails_to_load() {
    let dir = tempdir().expect("tempdir");
    let (storage, _) = storage_in(dir.path(), 5);

    let mut value = serde_json::to_value(sample_plan("Broken")).unwrap();
    value["items"]["income"][0]["recurrence"] = "sometimes".into();
    fs::write(storage.plan_path("broken"), value.to_string()).unwrap();

    match storage.load_plan("broken") {
        Err(CoreError::Serde(message)) => assert!(message.contains("invalid recurrence")),
        other => panic!("expected serde error, got {other:?}"),
    }
}
