//! Inventory item domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use validator::Validate;

use super::lenient;

/// Stock status shown next to an item.
///
/// Chosen by the user; the core never derives it from the quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ItemStatus {
    #[default]
    InStock,
    LowStock,
    OutOfStock,
}

impl ItemStatus {
    /// Label stored in the sheet.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::InStock => "재고 있음",
            ItemStatus::LowStock => "재고 부족",
            ItemStatus::OutOfStock => "품절",
        }
    }

    /// Parses a sheet label or an enum-style name.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "재고 있음" | "IN_STOCK" => Some(ItemStatus::InStock),
            "재고 부족" | "LOW_STOCK" => Some(ItemStatus::LowStock),
            "품절" | "OUT_OF_STOCK" => Some(ItemStatus::OutOfStock),
            _ => None,
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ItemStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ItemStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // The sheet backend writes "재고 있음" for blank cells; do the same
        // for anything unrecognised.
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label
            .as_deref()
            .and_then(ItemStatus::from_label)
            .unwrap_or_default())
    }
}

/// One tracked piece of equipment.
///
/// `id` is unique within a school. `categories` and `locations` are the
/// comma-joined `category` / `location` cells of the sheet; each location
/// entry is usually a location token (`Room/Shelf-Slot`) but may be any
/// free text entered by hand. A cell whose first entry is blank keeps a
/// leading `""` in `locations`; reports read only that first entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "category", default, with = "shared::delimited")]
    pub categories: Vec<String>,

    #[serde(default, deserialize_with = "lenient::quantity")]
    pub quantity: u32,

    #[serde(rename = "location", default, with = "shared::delimited::positional")]
    pub locations: Vec<String>,

    #[serde(default)]
    pub status: ItemStatus,

    /// Client clock at the last mutation; only used for "most recent" ordering.
    #[serde(default = "lenient::epoch", deserialize_with = "lenient::timestamp")]
    pub last_updated: DateTime<Utc>,

    #[serde(default)]
    pub school: String,

    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        serialize_with = "lenient::serialize_optional_text"
    )]
    pub notes: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        serialize_with = "lenient::serialize_optional_text"
    )]
    pub image_url: Option<String>,

    /// Pending inline upload (a data URL); never read back from the sheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
}

impl InventoryItem {
    /// The stored `category` cell.
    pub fn category_field(&self) -> String {
        shared::delimited::join(&self.categories)
    }

    /// The stored `location` cell.
    pub fn location_field(&self) -> String {
        shared::delimited::join(&self.locations)
    }

    /// Case-insensitive match of a search term against name, categories
    /// and locations. An empty term matches everything.
    pub fn matches_term(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term)
            || self.category_field().to_lowercase().contains(&term)
            || self.location_field().to_lowercase().contains(&term)
    }
}

/// A new item as entered by the user, before an id and timestamp exist.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: String,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_non_empty_list"))]
    pub categories: Vec<String>,

    #[serde(default)]
    pub quantity: u32,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_non_empty_list"))]
    pub locations: Vec<String>,

    #[serde(default)]
    pub status: ItemStatus,

    /// Target school; the controller falls back to the selected school.
    #[serde(default)]
    pub school: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub image_base64: Option<String>,
}

impl ItemDraft {
    /// Completes the draft into a full item.
    pub fn into_item(self, id: String, school: String, now: DateTime<Utc>) -> InventoryItem {
        InventoryItem {
            id,
            name: self.name.trim().to_string(),
            categories: self.categories,
            quantity: self.quantity,
            locations: self.locations,
            status: self.status,
            last_updated: now,
            school,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            image_url: self.image_url.filter(|u| !u.trim().is_empty()),
            image_base64: self.image_base64.filter(|b| !b.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_item() -> InventoryItem {
        InventoryItem {
            id: "a1".to_string(),
            name: "아두이노 우노".to_string(),
            categories: vec!["마이크로보드".to_string(), "키트".to_string()],
            quantity: 12,
            locations: vec!["전산1/선반A-2칸".to_string()],
            status: ItemStatus::LowStock,
            last_updated: Utc::now(),
            school: "대건고".to_string(),
            notes: None,
            image_url: Some("https://example.com/uno.png".to_string()),
            image_base64: None,
        }
    }

    fn sample_draft() -> ItemDraft {
        ItemDraft {
            name: "  드론 미니 ".to_string(),
            categories: vec!["드론".to_string()],
            quantity: 4,
            locations: vec!["창고".to_string()],
            status: ItemStatus::InStock,
            school: None,
            notes: Some(" ".to_string()),
            image_url: None,
            image_base64: None,
        }
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(ItemStatus::InStock.as_str(), "재고 있음");
        assert_eq!(ItemStatus::LowStock.to_string(), "재고 부족");
        assert_eq!(ItemStatus::from_label("품절"), Some(ItemStatus::OutOfStock));
        assert_eq!(ItemStatus::from_label("LOW_STOCK"), Some(ItemStatus::LowStock));
        assert_eq!(ItemStatus::from_label("unknown"), None);
    }

    #[test]
    fn test_status_unknown_defaults_to_in_stock() {
        let status: ItemStatus = serde_json::from_value(json!("??")).unwrap();
        assert_eq!(status, ItemStatus::InStock);
        let status: ItemStatus = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(status, ItemStatus::InStock);
    }

    #[test]
    fn test_item_serializes_to_sheet_shape() {
        let json = serde_json::to_value(sample_item()).unwrap();
        assert_eq!(json["category"], "마이크로보드, 키트");
        assert_eq!(json["location"], "전산1/선반A-2칸");
        assert_eq!(json["status"], "재고 부족");
        assert_eq!(json["notes"], "");
        assert!(json.get("lastUpdated").is_some());
        assert!(json.get("imageBase64").is_none());
    }

    #[test]
    fn test_item_deserializes_sheet_row() {
        let item: InventoryItem = serde_json::from_value(json!({
            "id": 17,
            "name": "3D펜",
            "category": "3D펜, 키트",
            "quantity": "5",
            "location": "과학실/캐비닛1-1칸, 창고",
            "status": "재고 있음",
            "lastUpdated": "2025-01-10T01:02:03.000Z",
            "notes": "",
            "imageUrl": "",
            "school": "신송고"
        }))
        .unwrap();

        assert_eq!(item.id, "17");
        assert_eq!(item.categories, vec!["3D펜", "키트"]);
        assert_eq!(item.quantity, 5);
        assert_eq!(item.locations, vec!["과학실/캐비닛1-1칸", "창고"]);
        assert_eq!(item.notes, None);
        assert_eq!(item.image_url, None);
        assert_eq!(item.school, "신송고");
    }

    #[test]
    fn test_matches_term() {
        let item = sample_item();
        assert!(item.matches_term(""));
        assert!(item.matches_term("우노"));
        assert!(item.matches_term("키트"));
        assert!(item.matches_term("선반a"));
        assert!(!item.matches_term("드론"));
    }

    #[test]
    fn test_draft_validation() {
        assert!(sample_draft().validate().is_ok());

        let mut blank_name = sample_draft();
        blank_name.name = "   ".to_string();
        assert!(blank_name.validate().is_err());

        let mut no_category = sample_draft();
        no_category.categories.clear();
        let errors = no_category.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("categories"));

        let mut no_location = sample_draft();
        no_location.locations.clear();
        assert!(no_location.validate().is_err());
    }

    #[test]
    fn test_draft_into_item() {
        let now = Utc::now();
        let item = sample_draft().into_item("x9".to_string(), "중산중".to_string(), now);
        assert_eq!(item.id, "x9");
        assert_eq!(item.name, "드론 미니");
        assert_eq!(item.school, "중산중");
        assert_eq!(item.last_updated, now);
        assert_eq!(item.notes, None);
    }
}
