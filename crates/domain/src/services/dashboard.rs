//! Dashboard and search queries over the in-memory item lists.

use crate::models::{
    CategoryQuantity, DashboardSummary, InventoryItem, ItemStatus, SchoolScope, SchoolSelection,
};

/// Number of items listed under "recently updated".
pub const RECENT_ITEMS: usize = 5;

/// Items the dashboard should count for a scope and selection.
///
/// A school user sees its own list. An admin sees the all-schools list,
/// narrowed to one school when one is selected.
pub fn visible_items<'a>(
    scope: &SchoolScope,
    selection: &SchoolSelection,
    items: &'a [InventoryItem],
    all_items: &'a [InventoryItem],
) -> Vec<&'a InventoryItem> {
    match (scope, selection) {
        (SchoolScope::School { .. }, _) => items.iter().collect(),
        (SchoolScope::Admin, SchoolSelection::All) => all_items.iter().collect(),
        (SchoolScope::Admin, SchoolSelection::School(name)) => {
            all_items.iter().filter(|i| &i.school == name).collect()
        }
    }
}

/// Totals, stock warnings, recent activity and quantity per category.
pub fn summarize(items: &[&InventoryItem]) -> DashboardSummary {
    let mut by_category: Vec<CategoryQuantity> = Vec::new();
    for item in items {
        for category in &item.categories {
            match by_category.iter_mut().find(|c| &c.category == category) {
                Some(entry) => entry.quantity += u64::from(item.quantity),
                None => by_category.push(CategoryQuantity {
                    category: category.clone(),
                    quantity: u64::from(item.quantity),
                }),
            }
        }
    }

    let mut recent: Vec<&InventoryItem> = items.to_vec();
    recent.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));

    DashboardSummary {
        total_items: items.len(),
        total_quantity: items.iter().map(|i| u64::from(i.quantity)).sum(),
        low_stock_count: items
            .iter()
            .filter(|i| i.status == ItemStatus::LowStock)
            .count(),
        out_of_stock_count: items
            .iter()
            .filter(|i| i.status == ItemStatus::OutOfStock)
            .count(),
        recent_items: recent
            .into_iter()
            .take(RECENT_ITEMS)
            .cloned()
            .collect(),
        quantity_by_category: by_category,
    }
}

/// Items whose name, categories or locations contain `term`.
pub fn search<'a>(items: &'a [InventoryItem], term: &str) -> Vec<&'a InventoryItem> {
    items.iter().filter(|i| i.matches_term(term)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn item(
        id: &str,
        school: &str,
        categories: &[&str],
        quantity: u32,
        status: ItemStatus,
        age_min: i64,
    ) -> InventoryItem {
        InventoryItem {
            id: id.to_string(),
            name: format!("item-{}", id),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            quantity,
            locations: vec!["창고".to_string()],
            status,
            last_updated: Utc::now() - Duration::minutes(age_min),
            school: school.to_string(),
            notes: None,
            image_url: None,
            image_base64: None,
        }
    }

    fn school_scope() -> SchoolScope {
        SchoolScope::School {
            code: "DG2024".to_string(),
            name: "대건고".to_string(),
            script_url: String::new(),
            categories: Vec::new(),
            locations: Vec::new(),
        }
    }

    #[test]
    fn test_visible_items_by_scope() {
        let items = vec![item("1", "대건고", &["로봇"], 1, ItemStatus::InStock, 0)];
        let all = vec![
            item("1", "대건고", &["로봇"], 1, ItemStatus::InStock, 0),
            item("2", "신송고", &["드론"], 2, ItemStatus::InStock, 0),
        ];

        assert_eq!(visible_items(&school_scope(), &SchoolSelection::All, &items, &all).len(), 1);
        assert_eq!(visible_items(&SchoolScope::Admin, &SchoolSelection::All, &items, &all).len(), 2);
        let one = visible_items(
            &SchoolScope::Admin,
            &SchoolSelection::School("신송고".to_string()),
            &items,
            &all,
        );
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].id, "2");
    }

    #[test]
    fn test_summarize() {
        let items = vec![
            item("1", "대건고", &["로봇", "키트"], 4, ItemStatus::InStock, 30),
            item("2", "대건고", &["드론"], 2, ItemStatus::LowStock, 20),
            item("3", "대건고", &["키트"], 0, ItemStatus::OutOfStock, 10),
            item("4", "대건고", &["센서"], 7, ItemStatus::InStock, 40),
            item("5", "대건고", &["로봇"], 1, ItemStatus::LowStock, 50),
            item("6", "대건고", &["기타"], 3, ItemStatus::InStock, 0),
        ];
        let refs: Vec<&InventoryItem> = items.iter().collect();
        let summary = summarize(&refs);

        assert_eq!(summary.total_items, 6);
        assert_eq!(summary.total_quantity, 17);
        assert_eq!(summary.low_stock_count, 2);
        assert_eq!(summary.out_of_stock_count, 1);

        let recent: Vec<&str> = summary.recent_items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(recent, vec!["6", "3", "2", "1", "4"]);

        assert_eq!(
            summary.quantity_by_category[0],
            CategoryQuantity {
                category: "로봇".to_string(),
                quantity: 5
            }
        );
        let kit = summary
            .quantity_by_category
            .iter()
            .find(|c| c.category == "키트")
            .unwrap();
        assert_eq!(kit.quantity, 4);
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize(&[]), DashboardSummary::default());
    }

    #[test]
    fn test_search() {
        let items = vec![
            item("1", "대건고", &["로봇"], 1, ItemStatus::InStock, 0),
            item("2", "대건고", &["드론"], 1, ItemStatus::InStock, 0),
        ];
        assert_eq!(search(&items, "드론").len(), 1);
        assert_eq!(search(&items, "ITEM-").len(), 2);
        assert_eq!(search(&items, "").len(), 2);
        assert!(search(&items, "없음").is_empty());
    }
}
