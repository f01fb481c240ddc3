//! The shopping list and its purchase history

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{self, Season};

const HISTORY_TIP_ITEMS: usize = 3;
const SEASONAL_TIP_ITEMS: usize = 3;
const SUBSTITUTE_TIP_ITEMS: usize = 2;

/// One entry on the shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: u64,
    pub name: String,
    pub quantity: u32,
    pub category: String,
    pub added_at: DateTime<Utc>,
}

/// Result of adding an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// New entry with this quantity
    Added { quantity: u32 },
    /// Existing entry, now at this total
    Updated { total: u32 },
}

/// Shopping list plus the names ever saved, as persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    #[serde(default)]
    items: Vec<ListItem>,
    /// Unique lower-cased names in first-added order
    #[serde(default)]
    history: Vec<String>,
}

impl ShoppingList {
    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `quantity` of `name`, merging with an existing entry by name
    pub fn add(&mut self, name: &str, quantity: u32) -> AddOutcome {
        if let Some(existing) = self.find_mut(name) {
            existing.quantity = existing.quantity.saturating_add(quantity);
            return AddOutcome::Updated {
                total: existing.quantity,
            };
        }

        let id = self.items.iter().map(|item| item.id).max().unwrap_or(0) + 1;
        self.items.push(ListItem {
            id,
            name: name.to_string(),
            quantity,
            category: catalog::categorize(name).to_string(),
            added_at: Utc::now(),
        });
        self.record_history();
        AddOutcome::Added { quantity }
    }

    /// Remove the entry named `name`, ignoring case
    pub fn remove(&mut self, name: &str) -> Option<ListItem> {
        let name = name.to_lowercase();
        let index = self
            .items
            .iter()
            .position(|item| item.name.to_lowercase() == name)?;
        Some(self.items.remove(index))
    }

    /// Remove the entry with `id`
    pub fn remove_by_id(&mut self, id: u64) -> Option<ListItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Empty the list, returning whether anything was removed
    pub fn clear(&mut self) -> bool {
        let had_items = !self.items.is_empty();
        self.items.clear();
        had_items
    }

    /// Tips derived from history, the season of `today` and substitutes
    /// of listed items
    pub fn suggestions(&self, today: NaiveDate) -> Vec<String> {
        let mut tips = Vec::new();

        let recent: Vec<&str> = self
            .history
            .iter()
            .take(HISTORY_TIP_ITEMS)
            .map(String::as_str)
            .collect();
        if !recent.is_empty() {
            tips.push(format!("Recently added: {}", recent.join(", ")));
        }

        let season = Season::of(today);
        let essentials = season.essentials();
        let shown = &essentials[..essentials.len().min(SEASONAL_TIP_ITEMS)];
        tips.push(format!("{season} essentials: {}", shown.join(", ")));

        let mut alternatives: Vec<&str> = Vec::new();
        for item in &self.items {
            for alternative in catalog::substitutes(&item.name) {
                if !alternatives.contains(alternative) {
                    alternatives.push(*alternative);
                }
            }
        }
        if !alternatives.is_empty() {
            alternatives.truncate(SUBSTITUTE_TIP_ITEMS);
            tips.push(format!("Consider alternatives: {}", alternatives.join(", ")));
        }

        tips
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut ListItem> {
        let name = name.to_lowercase();
        self.items
            .iter_mut()
            .find(|item| item.name.to_lowercase() == name)
    }

    fn record_history(&mut self) {
        for item in &self.items {
            let name = item.name.to_lowercase();
            if !self.history.contains(&name) {
                self.history.push(name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summer_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 4).unwrap()
    }

    #[test]
    fn test_add_new_item() {
        let mut list = ShoppingList::default();
        assert_eq!(list.add("apples", 2), AddOutcome::Added { quantity: 2 });

        let item = &list.items()[0];
        assert_eq!(item.name, "apples");
        assert_eq!(item.quantity, 2);
        assert_eq!(item.category, "produce");
        assert_eq!(item.id, 1);
    }

    #[test]
    fn test_add_merges_ignoring_case() {
        let mut list = ShoppingList::default();
        list.add("Milk", 1);
        assert_eq!(list.add("milk", 2), AddOutcome::Updated { total: 3 });
        assert_eq!(list.items().len(), 1);
    }

    #[test]
    fn test_ids_stay_unique_after_removal() {
        let mut list = ShoppingList::default();
        list.add("milk", 1);
        list.add("bread", 1);
        list.remove("milk");
        list.add("eggs", 1);
        let ids: Vec<u64> = list.items().iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_remove() {
        let mut list = ShoppingList::default();
        list.add("Bread", 1);
        assert_eq!(list.remove("bread").map(|item| item.name), Some("Bread".to_string()));
        assert!(list.remove("bread").is_none());
    }

    #[test]
    fn test_clear() {
        let mut list = ShoppingList::default();
        assert!(!list.clear());
        list.add("milk", 1);
        assert!(list.clear());
        assert!(list.is_empty());
        // history survives a clear
        assert_eq!(list.history(), ["milk"]);
    }

    #[test]
    fn test_history_is_unique_and_ordered() {
        let mut list = ShoppingList::default();
        list.add("Milk", 1);
        list.add("bread", 1);
        list.add("milk", 1);
        list.remove("milk");
        list.add("milk", 1);
        assert_eq!(list.history(), ["milk", "bread"]);
    }

    #[test]
    fn test_suggestions() {
        let mut list = ShoppingList::default();
        assert_eq!(
            list.suggestions(summer_day()),
            vec!["Summer essentials: watermelon, ice cream, lemonade".to_string()]
        );

        for name in ["milk", "bread", "eggs", "cheese"] {
            list.add(name, 1);
        }
        assert_eq!(
            list.suggestions(summer_day()),
            vec![
                "Recently added: milk, bread, eggs".to_string(),
                "Summer essentials: watermelon, ice cream, lemonade".to_string(),
                "Consider alternatives: almond milk, soy milk".to_string(),
            ]
        );
    }

    #[test]
    fn test_seasonal_tip_follows_date() {
        let list = ShoppingList::default();
        let tip = |month, day| list.suggestions(NaiveDate::from_ymd_opt(2026, month, day).unwrap());
        assert_eq!(tip(1, 10), ["Winter essentials: hot chocolate, soup ingredients, warm clothes"]);
        assert_eq!(tip(4, 1), ["Spring essentials: fresh flowers, spring vegetables, cleaning supplies"]);
        assert_eq!(tip(10, 31), ["Fall essentials: pumpkin, apple cider, fall decorations"]);
        assert_eq!(tip(12, 1), ["Winter essentials: hot chocolate, soup ingredients, warm clothes"]);
    }

    #[test]
    fn test_remove_by_id() {
        let mut list = ShoppingList::default();
        list.add("milk", 1);
        list.add("bread", 1);
        assert_eq!(list.remove_by_id(2).map(|item| item.name), Some("bread".to_string()));
        assert!(list.remove_by_id(2).is_none());
        assert_eq!(list.items().len(), 1);
    }

    #[test]
    fn test_added_at_is_rfc3339() {
        let mut list = ShoppingList::default();
        list.add("milk", 1);
        let json = serde_json::to_value(&list.items()[0]).unwrap();
        let added_at = json["added_at"].as_str().expect("timestamp string");
        assert!(DateTime::parse_from_rfc3339(added_at).is_ok());
    }

    #[test]
    fn test_snapshot_tolerates_missing_fields() {
        let list: ShoppingList = serde_json::from_str("{}").unwrap();
        assert!(list.is_empty());
    }
}
