//! Persisted user settings.

use domain::models::SchoolSelection;
use tracing::debug;

use crate::kv::KeyValueStore;

pub const SCRIPT_URL_KEY: &str = "gas_url";
pub const DEMO_MODE_KEY: &str = "is_demo_mode";
pub const SELECTED_SCHOOL_KEY: &str = "selected_school";

/// Backend URL, demo flag and the last selected school.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub script_url: String,
    pub demo_mode: bool,
    pub selected_school: SchoolSelection,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            script_url: String::new(),
            demo_mode: true,
            selected_school: SchoolSelection::All,
        }
    }
}

impl Settings {
    /// Demo storage is used when the flag is set or no backend is configured.
    pub fn is_demo(&self) -> bool {
        self.demo_mode || self.script_url.trim().is_empty()
    }

    /// Loads settings, taking each missing key from `defaults`.
    pub fn load(store: &dyn KeyValueStore, defaults: Settings) -> Self {
        let script_url = store
            .get(SCRIPT_URL_KEY)
            .map(|url| url.trim().to_string())
            .unwrap_or(defaults.script_url);
        let demo_mode = store
            .get(DEMO_MODE_KEY)
            .and_then(|flag| flag.trim().parse::<bool>().ok())
            .unwrap_or(defaults.demo_mode);
        let selected_school = store
            .get(SELECTED_SCHOOL_KEY)
            .map(|school| SchoolSelection::parse(&school))
            .unwrap_or(defaults.selected_school);

        let settings = Self {
            script_url,
            demo_mode,
            selected_school,
        };
        debug!(demo = settings.is_demo(), school = %settings.selected_school, "Settings loaded");
        settings
    }

    pub fn save(&self, store: &dyn KeyValueStore) {
        store.set(SCRIPT_URL_KEY, self.script_url.clone());
        store.set(DEMO_MODE_KEY, self.demo_mode.to_string());
        store.set(SELECTED_SCHOOL_KEY, self.selected_school.as_key().to_string());
    }
}
