//! Sample inventory used by demo mode before anything has been saved.

use chrono::{DateTime, Duration, TimeZone, Utc};
use domain::models::{InventoryItem, ItemStatus};

/// (name, categories, quantity, location, status)
const SAMPLE_ROWS: &[(&str, &[&str], u32, &str, ItemStatus)] = &[
    ("아두이노 우노 R3", &["마이크로보드"], 24, "과학실1/선반A-1칸", ItemStatus::InStock),
    ("마이크로비트 V2", &["마이크로보드", "키트"], 30, "과학실1/선반A-2칸", ItemStatus::InStock),
    ("코딩 로봇 알버트", &["로봇"], 6, "과학실1/선반B", ItemStatus::LowStock),
    ("텔로 교육용 드론", &["드론"], 8, "창고/캐비닛1-상단", ItemStatus::InStock),
    ("3D펜 세트", &["3D펜"], 0, "창고/캐비닛2", ItemStatus::OutOfStock),
    ("초음파 센서 HC-SR04", &["센서", "단품"], 40, "과학실2/서랍1-3칸", ItemStatus::InStock),
    ("점퍼 케이블 묶음", &["단품"], 3, "과학실2", ItemStatus::LowStock),
    ("스마트팜 키트", &["키트"], 5, "창고/캐비닛1-하단", ItemStatus::InStock),
];

fn seed_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

/// The sample inventory for one school.
///
/// Ids are `<school>-<n>` so that samples of different schools never
/// collide when merged.
pub fn sample_items(school: &str) -> Vec<InventoryItem> {
    let base = seed_epoch();
    SAMPLE_ROWS
        .iter()
        .enumerate()
        .map(|(n, (name, categories, quantity, location, status))| InventoryItem {
            id: format!("{}-{}", school, n + 1),
            name: name.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            quantity: *quantity,
            locations: vec![location.to_string()],
            status: *status,
            last_updated: base + Duration::hours(n as i64),
            school: school.to_string(),
            notes: None,
            image_url: None,
            image_base64: None,
        })
        .collect()
}
