//! The persisted planning document: items grouped by category, an optional target,
//! card transactions and the events budget.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{
    de::{MapAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};
use uuid::Uuid;

use crate::{
    category::Category,
    item::{Item, Target},
    statement::{BudgetEvent, Transaction},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    #[serde(default, deserialize_with = "merge_sections")]
    pub items: BTreeMap<Category, Vec<Item>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transactions: Vec<Transaction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<BudgetEvent>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            items: BTreeMap::new(),
            target: None,
            transactions: Vec::new(),
            events: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Items of one category in insertion order.
    pub fn items_in(&self, category: Category) -> &[Item] {
        self.items
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All items, grouped in category order.
    pub fn iter_items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.values().flatten()
    }

    pub fn item_count(&self) -> usize {
        self.items.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    pub fn item(&self, id: Uuid) -> Option<&Item> {
        self.iter_items().find(|item| item.id == id)
    }

    pub fn item_mut(&mut self, id: Uuid) -> Option<&mut Item> {
        self.items
            .values_mut()
            .flatten()
            .find(|item| item.id == id)
    }

    /// Appends the item to its category section and returns its id.
    pub fn add_item(&mut self, item: Item) -> Uuid {
        let id = item.id;
        self.items.entry(item.category).or_default().push(item);
        id
    }

    pub fn remove_item(&mut self, id: Uuid) -> Option<Item> {
        for items in self.items.values_mut() {
            if let Some(index) = items.iter().position(|item| item.id == id) {
                return Some(items.remove(index));
            }
        }
        None
    }

    /// Finds items whose id starts with `prefix` (case-insensitive).
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<&Item> {
        let needle = prefix.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.iter_items()
            .filter(|item| item.id.to_string().starts_with(&needle))
            .collect()
    }

    /// Forces each item's category to match the section it is stored under
    /// and drops empty sections. Returns how many items were corrected.
    pub fn normalize(&mut self) -> usize {
        let mut corrected = 0;
        for (category, items) in self.items.iter_mut() {
            for item in items.iter_mut() {
                if item.category != *category {
                    item.category = *category;
                    corrected += 1;
                }
            }
        }
        self.items.retain(|_, items| !items.is_empty());
        corrected
    }

    pub fn set_target(&mut self, target: Target) {
        self.target = Some(target);
    }

    pub fn clear_target(&mut self) -> Option<Target> {
        self.target.take()
    }
}

/// Reads the category map, appending lists whose keys alias the same category
/// (`"ingresos"` and `"income"`) instead of letting the later one win.
fn merge_sections<'de, D>(deserializer: D) -> Result<BTreeMap<Category, Vec<Item>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct SectionsVisitor;

    impl<'de> Visitor<'de> for SectionsVisitor {
        type Value = BTreeMap<Category, Vec<Item>>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of category keys to item lists")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut sections: Self::Value = BTreeMap::new();
            while let Some((category, items)) = map.next_entry::<Category, Vec<Item>>()? {
                sections.entry(category).or_default().extend(items);
            }
            Ok(sections)
        }
    }

    deserializer.deserialize_map(SectionsVisitor)
}
