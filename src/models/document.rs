use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{require_non_empty, Validate};

pub const DEFAULT_LANGUAGE: &str = "javascript";

/// A shared source document
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub language: String,
    pub owner_id: i64,
    pub is_public: bool,
    pub share_link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a document
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InsertDocument {
    pub name: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    pub owner_id: i64,
    #[serde(default)]
    pub is_public: Option<bool>,
}

impl Validate for InsertDocument {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("name", &self.name)
    }
}

/// Partial update of a document, unset fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct DocumentUpdate {
    pub content: Option<String>,
}

impl DocumentUpdate {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }

    pub(crate) fn apply_to(self, document: &mut Document) {
        if let Some(content) = self.content {
            document.content = content;
        }
    }
}
