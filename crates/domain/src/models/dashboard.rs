//! Dashboard summary domain models.

use serde::Serialize;

use super::item::InventoryItem;

/// Quantity held under one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryQuantity {
    pub category: String,
    pub quantity: u64,
}

/// Headline numbers for the visible inventory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_items: usize,
    pub total_quantity: u64,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
    /// Most recently updated items, newest first.
    pub recent_items: Vec<InventoryItem>,
    pub quantity_by_category: Vec<CategoryQuantity>,
}
