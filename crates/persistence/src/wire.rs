//! Request and response shapes of the Apps Script endpoints.

use domain::error::GatewayError;
use domain::models::{InventoryItem, LocationRoom, NewSchool};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Every endpoint answers with `{ success, data?, message? }`.
///
/// The image upload action puts its result in `url` instead of `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl ScriptEnvelope {
    /// Decodes `data`, returning `None` when it is absent or null.
    pub fn data<T: DeserializeOwned>(&self) -> Result<Option<T>, GatewayError> {
        match &self.data {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| GatewayError::ParseFailure(e.to_string())),
        }
    }
}

/// Inventory write actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteAction {
    Create,
    Update,
    Delete,
}

/// Body of an inventory write.
#[derive(Debug, Serialize)]
pub struct WriteRequest<'a> {
    pub action: WriteAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a InventoryItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school: Option<&'a str>,
}

impl<'a> WriteRequest<'a> {
    pub fn create(item: &'a InventoryItem) -> Self {
        Self {
            action: WriteAction::Create,
            data: Some(item),
            id: None,
            school: None,
        }
    }

    pub fn update(item: &'a InventoryItem) -> Self {
        Self {
            action: WriteAction::Update,
            data: Some(item),
            id: None,
            school: None,
        }
    }

    pub fn delete(id: &'a str, school: &'a str) -> Self {
        Self {
            action: WriteAction::Delete,
            data: None,
            id: Some(id),
            school: Some(school),
        }
    }
}

/// `data` of a create response.
#[derive(Debug, Deserialize)]
pub struct CreatedRow {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

impl CreatedRow {
    /// The backend id as text; numeric ids are accepted.
    pub fn id(&self) -> Option<String> {
        match &self.id {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Body of a registry or image upload action.
#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ActionRequest<'a> {
    AdminLogin {
        username: &'a str,
        password: &'a str,
    },
    AddSchool {
        #[serde(flatten)]
        school: &'a NewSchool,
    },
    #[serde(rename_all = "camelCase")]
    UpdateSchool {
        original_code: &'a str,
        #[serde(flatten)]
        school: &'a NewSchool,
    },
    DeleteSchool {
        code: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    ChangePassword {
        username: &'a str,
        old_password: &'a str,
        new_password: &'a str,
    },
    UpdateCategories {
        code: &'a str,
        categories: &'a [String],
    },
    UpdateLocations {
        code: &'a str,
        locations: &'a [LocationRoom],
    },
    UploadImage {
        #[serde(rename = "imageData")]
        image_data: &'a str,
        #[serde(rename = "fileName")]
        file_name: &'a str,
    },
}
