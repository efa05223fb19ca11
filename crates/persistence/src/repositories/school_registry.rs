//! School registry backends.
//!
//! The live registry is the admin Apps Script deployment; the demo
//! registry keeps the roster in the key-value store. Both also receive
//! best-effort location tree writes.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use domain::error::GatewayError;
use domain::models::{LocationRoom, NewSchool, SchoolConfig, SchoolLookupResult};
use domain::services::{BestEffortPersist, SchoolRegistry};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::client::ScriptClient;
use crate::kv::{get_json, set_json, KeyValueStore};
use crate::wire::ActionRequest;

pub const DEMO_SCHOOLS_KEY: &str = "demo_school_settings";
pub const LOCATION_DATA_PREFIX: &str = "location_data_";

pub const DEMO_ADMIN_USERNAME: &str = "admin";
pub const DEMO_ADMIN_PASSWORD: &str = "admin123";

const INVALID_CODE: &str = "유효하지 않은 학교 코드입니다.";
const SCHOOL_NOT_FOUND: &str = "해당 학교를 찾을 수 없습니다.";
const DUPLICATE_CODE: &str = "이미 존재하는 학교 코드입니다.";
const DUPLICATE_NAME: &str = "이미 존재하는 학교 이름입니다.";
const BAD_CREDENTIALS: &str = "아이디 또는 비밀번호가 올바르지 않습니다.";

pub fn location_data_key(code: &str) -> String {
    format!("{}{}", LOCATION_DATA_PREFIX, code)
}

fn rejected(message: &str) -> GatewayError {
    GatewayError::BackendRejected(message.to_string())
}

/// Builds the record the backend would return for `school`.
fn config_from(school: &NewSchool, created_at: Option<String>) -> SchoolConfig {
    SchoolConfig {
        name: school.name.trim().to_string(),
        code: school.code.trim().to_string(),
        script_url: school.script_url.trim().to_string(),
        created_at,
        sheet_url: school.sheet_url.clone().filter(|u| !u.trim().is_empty()),
        drive_folder_url: school.drive_folder_url.clone().filter(|u| !u.trim().is_empty()),
        categories: school.categories.clone().unwrap_or_default(),
        locations: Vec::new(),
    }
}

/// Registry on the admin Apps Script endpoint.
#[derive(Debug, Clone)]
pub struct RemoteSchoolRegistry {
    client: ScriptClient,
}

impl RemoteSchoolRegistry {
    pub fn new(client: ScriptClient) -> Self {
        Self { client }
    }

    async fn post(
        &self,
        operation: &str,
        request: &ActionRequest<'_>,
    ) -> Result<Option<SchoolLookupResult>, GatewayError> {
        let envelope = self.client.post(operation, request).await?;
        // Writes that do not echo a record still succeeded.
        Ok(envelope.data::<SchoolLookupResult>().ok().flatten())
    }
}

#[async_trait]
impl SchoolRegistry for RemoteSchoolRegistry {
    async fn get_schools(&self) -> Result<Vec<SchoolConfig>, GatewayError> {
        let envelope = self
            .client
            .get("get_schools", &[("action", "getSchools")])
            .await?;
        match envelope.data::<SchoolLookupResult>()? {
            Some(result) => result.into_many(),
            None => Ok(Vec::new()),
        }
    }

    async fn verify_code(&self, code: &str) -> Result<SchoolConfig, GatewayError> {
        let envelope = self
            .client
            .get("verify_code", &[("action", "verifyCode"), ("code", code)])
            .await?;
        envelope
            .data::<SchoolLookupResult>()?
            .ok_or_else(|| rejected(INVALID_CODE))?
            .into_single()
    }

    async fn admin_login(&self, username: &str, password: &str) -> Result<(), GatewayError> {
        self.post(
            "admin_login",
            &ActionRequest::AdminLogin { username, password },
        )
        .await?;
        Ok(())
    }

    async fn add_school(&self, school: &NewSchool) -> Result<SchoolConfig, GatewayError> {
        let echoed = self
            .post("add_school", &ActionRequest::AddSchool { school })
            .await?;
        match echoed {
            Some(result) => result.into_single(),
            None => Ok(config_from(school, Some(Utc::now().to_rfc3339()))),
        }
    }

    async fn update_school(
        &self,
        original_code: &str,
        school: &NewSchool,
    ) -> Result<SchoolConfig, GatewayError> {
        let echoed = self
            .post(
                "update_school",
                &ActionRequest::UpdateSchool {
                    original_code,
                    school,
                },
            )
            .await?;
        match echoed {
            Some(result) => result.into_single(),
            None => Ok(config_from(school, None)),
        }
    }

    async fn delete_school(&self, code: &str) -> Result<(), GatewayError> {
        self.post("delete_school", &ActionRequest::DeleteSchool { code })
            .await?;
        Ok(())
    }

    async fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), GatewayError> {
        self.post(
            "change_password",
            &ActionRequest::ChangePassword {
                username,
                old_password,
                new_password,
            },
        )
        .await?;
        Ok(())
    }

    async fn update_categories(
        &self,
        code: &str,
        categories: &[String],
    ) -> Result<(), GatewayError> {
        self.post(
            "update_categories",
            &ActionRequest::UpdateCategories { code, categories },
        )
        .await?;
        Ok(())
    }

    async fn update_locations(
        &self,
        code: &str,
        rooms: &[LocationRoom],
    ) -> Result<(), GatewayError> {
        self.post(
            "update_locations",
            &ActionRequest::UpdateLocations {
                code,
                locations: rooms,
            },
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl BestEffortPersist for RemoteSchoolRegistry {
    async fn persist_locations(
        &self,
        school_code: &str,
        rooms: &[LocationRoom],
    ) -> Result<(), GatewayError> {
        self.update_locations(school_code, rooms).await
    }
}

/// Registry kept under `demo_school_settings`.
///
/// Location trees live apart from the roster under `location_data_<code>`
/// and are attached when a school is read.
pub struct DemoSchoolRegistry {
    store: Arc<dyn KeyValueStore>,
    seed_names: Vec<String>,
    write_lock: Mutex<()>,
}

impl DemoSchoolRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>, seed_names: Vec<String>) -> Self {
        Self {
            store,
            seed_names,
            write_lock: Mutex::new(()),
        }
    }

    fn seed(&self) -> Vec<SchoolConfig> {
        let created_at = Utc::now().to_rfc3339();
        self.seed_names
            .iter()
            .enumerate()
            .map(|(index, name)| SchoolConfig {
                name: name.clone(),
                code: format!("DEMO{:03}", index + 1),
                script_url: String::new(),
                created_at: Some(created_at.clone()),
                sheet_url: None,
                drive_folder_url: None,
                categories: Vec::new(),
                locations: Vec::new(),
            })
            .collect()
    }

    /// The stored roster, seeding it on first use.
    fn roster(&self) -> Result<Vec<SchoolConfig>, GatewayError> {
        if let Some(schools) = get_json::<Vec<SchoolConfig>>(self.store.as_ref(), DEMO_SCHOOLS_KEY) {
            return Ok(schools);
        }
        let seeded = self.seed();
        self.save(&seeded)?;
        debug!(count = seeded.len(), "Seeded demo schools");
        Ok(seeded)
    }

    fn save(&self, schools: &[SchoolConfig]) -> Result<(), GatewayError> {
        let stored: Vec<SchoolConfig> = schools
            .iter()
            .cloned()
            .map(|mut s| {
                s.locations.clear();
                s
            })
            .collect();
        set_json(self.store.as_ref(), DEMO_SCHOOLS_KEY, &stored)
    }

    fn with_locations(&self, mut school: SchoolConfig) -> SchoolConfig {
        school.locations =
            get_json(self.store.as_ref(), &location_data_key(&school.code)).unwrap_or_default();
        school
    }
}

#[async_trait]
impl SchoolRegistry for DemoSchoolRegistry {
    async fn get_schools(&self) -> Result<Vec<SchoolConfig>, GatewayError> {
        Ok(self
            .roster()?
            .into_iter()
            .map(|s| self.with_locations(s))
            .collect())
    }

    async fn verify_code(&self, code: &str) -> Result<SchoolConfig, GatewayError> {
        let code = code.trim();
        self.roster()?
            .into_iter()
            .find(|s| s.code == code)
            .map(|s| self.with_locations(s))
            .ok_or_else(|| rejected(INVALID_CODE))
    }

    async fn admin_login(&self, username: &str, password: &str) -> Result<(), GatewayError> {
        if username == DEMO_ADMIN_USERNAME && password == DEMO_ADMIN_PASSWORD {
            Ok(())
        } else {
            Err(rejected(BAD_CREDENTIALS))
        }
    }

    async fn add_school(&self, school: &NewSchool) -> Result<SchoolConfig, GatewayError> {
        let _guard = self.write_lock.lock().await;
        let mut schools = self.roster()?;
        let created = config_from(school, Some(Utc::now().to_rfc3339()));

        if schools.iter().any(|s| s.code == created.code) {
            return Err(rejected(DUPLICATE_CODE));
        }
        if schools.iter().any(|s| s.name == created.name) {
            return Err(rejected(DUPLICATE_NAME));
        }

        schools.push(created.clone());
        self.save(&schools)?;
        info!(code = %created.code, name = %created.name, "Demo school added");
        Ok(created)
    }

    async fn update_school(
        &self,
        original_code: &str,
        school: &NewSchool,
    ) -> Result<SchoolConfig, GatewayError> {
        let _guard = self.write_lock.lock().await;
        let mut schools = self.roster()?;
        let index = schools
            .iter()
            .position(|s| s.code == original_code)
            .ok_or_else(|| rejected(SCHOOL_NOT_FOUND))?;

        let new_code = school.code.trim();
        if new_code != original_code && schools.iter().any(|s| s.code == new_code) {
            return Err(rejected(DUPLICATE_CODE));
        }

        let edited = config_from(school, None);
        let existing = &mut schools[index];
        existing.name = edited.name;
        existing.code = edited.code;
        existing.script_url = edited.script_url;
        existing.sheet_url = edited.sheet_url;
        existing.drive_folder_url = edited.drive_folder_url;
        if school.categories.is_some() {
            existing.categories = edited.categories;
        }
        let updated = existing.clone();

        if updated.code != original_code {
            let old_key = location_data_key(original_code);
            if let Some(tree) = self.store.get(&old_key) {
                self.store.set(&location_data_key(&updated.code), tree);
                self.store.remove(&old_key);
            }
        }

        self.save(&schools)?;
        Ok(self.with_locations(updated))
    }

    async fn delete_school(&self, code: &str) -> Result<(), GatewayError> {
        let _guard = self.write_lock.lock().await;
        let mut schools = self.roster()?;
        let before = schools.len();
        schools.retain(|s| s.code != code);
        if schools.len() == before {
            return Err(rejected(SCHOOL_NOT_FOUND));
        }
        self.save(&schools)?;
        self.store.remove(&location_data_key(code));
        Ok(())
    }

    async fn change_password(
        &self,
        _username: &str,
        _old_password: &str,
        _new_password: &str,
    ) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn update_categories(
        &self,
        code: &str,
        categories: &[String],
    ) -> Result<(), GatewayError> {
        let _guard = self.write_lock.lock().await;
        let mut schools = self.roster()?;
        let school = schools
            .iter_mut()
            .find(|s| s.code == code)
            .ok_or_else(|| rejected(SCHOOL_NOT_FOUND))?;
        school.categories = categories.to_vec();
        self.save(&schools)
    }

    async fn update_locations(
        &self,
        code: &str,
        rooms: &[LocationRoom],
    ) -> Result<(), GatewayError> {
        set_json(self.store.as_ref(), &location_data_key(code), rooms)
    }
}

#[async_trait]
impl BestEffortPersist for DemoSchoolRegistry {
    async fn persist_locations(
        &self,
        school_code: &str,
        rooms: &[LocationRoom],
    ) -> Result<(), GatewayError> {
        self.update_locations(school_code, rooms).await
    }
}
