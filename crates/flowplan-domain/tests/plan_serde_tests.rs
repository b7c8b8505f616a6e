use chrono::NaiveDate;
use flowplan_domain::{Category, Item, Plan, Recurrence, Target};
use serde_json::json;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn plan_serializes_items_under_category_keys() {
    let mut plan = Plan::new("Household");
    plan.add_item(
        Item::new(Category::Income, "Salary")
            .with_amount(1000.0)
            .with_start_date(date(2025, 1, 1))
            .with_recurrence(Recurrence::Monthly),
    );
    plan.add_item(Item::new(Category::CreditCard, "Visa").with_amount(80.0));
    plan.set_target(Target::new(5000.0, date(2025, 6, 30)));

    let value = serde_json::to_value(&plan).expect("serialize plan");
    let items = value["items"].as_object().expect("items map");
    assert!(items.contains_key("income"));
    assert!(items.contains_key("credit_card"));
    assert_eq!(value["items"]["income"][0]["recurrence"], "monthly");
    assert_eq!(value["target"]["date"], "2025-06-30");

    let restored: Plan = serde_json::from_value(value).expect("deserialize plan");
    assert_eq!(restored, plan);
}

#[test]
fn legacy_section_keys_and_missing_fields_are_accepted() {
    let id = uuid::Uuid::new_v4();
    let raw = json!({
        "id": uuid::Uuid::new_v4(),
        "name": "Legacy",
        "items": {
            "gastos": [{ "id": id, "label": "Rent", "amount": 700.0, "start_date": "2025-01-05" }]
        },
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    });

    let mut plan: Plan = serde_json::from_value(raw).expect("legacy plan");
    assert_eq!(plan.normalize(), 1);

    let rent = plan.item(id).expect("rent item");
    assert_eq!(rent.category, Category::Expense);
    assert_eq!(rent.recurrence, Recurrence::None);
    assert_eq!(plan.items_in(Category::Expense).len(), 1);
}

#[test]
fn aliased_sections_are_merged_instead_of_replaced() {
    let raw = r#"{
        "id": "7f0c1c8e-3c1b-4a55-9d0e-5f1f2b7b8a01",
        "name": "Mixed",
        "items": {
            "ingresos": [{ "id": "0b6c6c1e-58a4-4c57-8f0a-2d35cb1d6f10", "label": "Bonus", "amount": 200.0 }],
            "income": [{ "id": "5e2a9b44-0f7d-4a3e-b1a2-8c4e0d9f7a21", "label": "Salary", "amount": 1000.0 }],
            "gastos": [{ "id": "c3d1e7f2-6b8a-4f0e-9a1d-2e5b7c9d0f32", "label": "Rent", "amount": 700.0 }]
        },
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    }"#;

    let plan: Plan = serde_json::from_str(raw).expect("mixed plan");
    let labels: Vec<&str> = plan
        .items_in(Category::Income)
        .iter()
        .map(|item| item.label.as_str())
        .collect();
    assert_eq!(labels, ["Bonus", "Salary"]);
    assert_eq!(plan.item_count(), 3);
}

#[test]
fn unknown_recurrence_key_fails_deserialization() {
    let raw = json!({
        "id": uuid::Uuid::new_v4(),
        "category": "expense",
        "label": "Gym",
        "amount": 30.0,
        "start_date": "2025-01-05",
        "recurrence": "fortnightly"
    });

    let err = serde_json::from_value::<Item>(raw).unwrap_err();
    assert!(err.to_string().contains("invalid recurrence `fortnightly`"));
}

#[test]
fn plan_item_lookup_and_removal() {
    let mut plan = Plan::new("Lookup");
    let id = plan.add_item(Item::new(Category::Cash, "Wallet"));
    let prefix = &id.to_string()[..8];

    assert_eq!(plan.find_by_prefix(prefix).len(), 1);
    assert_eq!(plan.item_count(), 1);
    let removed = plan.remove_item(id).expect("removed");
    assert_eq!(removed.label, "Wallet");
    assert!(plan.is_empty());
    assert!(plan.remove_item(id).is_none());
}

#[test]
fn contribution_requires_amount_and_start_date() {
    let base = Item::new(Category::Income, "Gift");
    assert!(base.contribution().is_none());
    assert!(base.clone().with_amount(10.0).contribution().is_none());
    assert!(base
        .clone()
        .with_amount(0.0)
        .with_start_date(date(2025, 3, 1))
        .contribution()
        .is_none());
    assert!(base
        .clone()
        .with_amount(f64::NAN)
        .with_start_date(date(2025, 3, 1))
        .contribution()
        .is_none());
    assert_eq!(
        base.with_amount(-25.0)
            .with_start_date(date(2025, 3, 1))
            .contribution(),
        Some((-25.0, date(2025, 3, 1)))
    );
}
