/// Filtering and grouping of list items for display
///
/// ```
/// use cartlist_engine::view::{group_items, ItemFilter};
///
/// let filter = ItemFilter::default().search("milk");
/// let groups = group_items(&[], &[], &filter);
/// assert!(groups.is_empty());
/// ```

use cartlist_shared::models::{Category, Item};
use std::collections::HashMap;
use uuid::Uuid;

/// Which items to show
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// Case-insensitive text matched against name and comment
    pub query: Option<String>,

    /// Show only checked items
    pub checked_only: bool,
}

impl ItemFilter {
    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn checked_only(mut self, checked_only: bool) -> Self {
        self.checked_only = checked_only;
        self
    }

    pub fn matches(&self, item: &Item) -> bool {
        if self.checked_only && !item.checked {
            return false;
        }

        match self.query.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => {
                let query = query.to_lowercase();
                item.name.to_lowercase().contains(&query)
                    || item
                        .comment
                        .as_deref()
                        .map_or(false, |comment| comment.to_lowercase().contains(&query))
            }
        }
    }
}

/// Items shown under one heading
#[derive(Debug, Clone, PartialEq)]
pub struct ItemGroup<'a> {
    /// `None` for the uncategorized group
    pub category: Option<&'a Category>,
    pub items: Vec<&'a Item>,
}

/// Groups the matching items by category
///
/// Groups follow category display order and keep item order within a group.
/// Empty groups are left out. Items without a category, or whose category is
/// not in `categories`, form a final uncategorized group.
pub fn group_items<'a>(
    items: &'a [Item],
    categories: &'a [Category],
    filter: &ItemFilter,
) -> Vec<ItemGroup<'a>> {
    let mut ordered: Vec<&Category> = categories.iter().collect();
    ordered.sort_by(|a, b| a.display_cmp(b));

    let mut by_category: HashMap<Uuid, Vec<&Item>> = HashMap::new();
    let mut uncategorized = Vec::new();

    for item in items.iter().filter(|item| filter.matches(item)) {
        match item
            .category_id
            .filter(|id| categories.iter().any(|category| category.id == *id))
        {
            Some(id) => by_category.entry(id).or_default().push(item),
            None => uncategorized.push(item),
        }
    }

    let mut groups: Vec<ItemGroup<'a>> = ordered
        .into_iter()
        .filter_map(|category| {
            by_category.remove(&category.id).map(|items| ItemGroup {
                category: Some(category),
                items,
            })
        })
        .collect();

    if !uncategorized.is_empty() {
        groups.push(ItemGroup {
            category: None,
            items: uncategorized,
        });
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn category(name: &str, sort_order: i32) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            owner_id: Uuid::nil(),
            sort_order,
            created_at: Utc::now(),
        }
    }

    fn item(name: &str, category_id: Option<Uuid>, checked: bool) -> Item {
        Item {
            id: Uuid::new_v4(),
            list_id: Uuid::nil(),
            name: name.to_string(),
            quantity: 1,
            category_id,
            comment: None,
            checked,
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_search_and_checked() {
        let mut yogurt = item("Greek Yogurt", None, true);
        yogurt.comment = Some("Big TUB".to_string());
        let bread = item("Bread", None, false);

        let filter = ItemFilter::default().search("tub");
        assert!(filter.matches(&yogurt));
        assert!(!filter.matches(&bread));

        let filter = ItemFilter::default().checked_only(true);
        assert!(filter.matches(&yogurt));
        assert!(!filter.matches(&bread));

        assert!(ItemFilter::default().search("  ").matches(&bread));
    }

    #[test]
    fn test_groups_follow_category_order_with_uncategorized_last() {
        let dairy = category("🥛 Dairy", 1);
        let mut bakery = category("🍞 Bakery", 1);
        bakery.created_at = dairy.created_at + Duration::seconds(1);
        let snacks = category("🍿 Snacks", 0);
        let categories = vec![bakery.clone(), dairy.clone(), snacks.clone()];

        let items = vec![
            item("Bread", Some(bakery.id), false),
            item("Milk", Some(dairy.id), false),
            item("Batteries", None, false),
            item("Orphan", Some(Uuid::new_v4()), false),
            item("Butter", Some(dairy.id), false),
        ];

        let groups = group_items(&items, &categories, &ItemFilter::default());
        let headings: Vec<Option<&str>> = groups
            .iter()
            .map(|group| group.category.map(|c| c.name.as_str()))
            .collect();
        assert_eq!(headings, vec![Some("🥛 Dairy"), Some("🍞 Bakery"), None]);

        let dairy_items: Vec<&str> = groups[0].items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(dairy_items, vec!["Milk", "Butter"]);
        assert_eq!(groups[2].items.len(), 2);
    }
}
