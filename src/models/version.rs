use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{require_non_empty, DocumentId, Validate};

/// A named snapshot of a document's content
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentVersion {
    pub id: i64,
    pub document_id: i64,
    pub content: String,
    pub author_id: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request body for saving a version; the document comes from the path
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateVersionRequest {
    pub content: String,
    pub author_id: i64,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for CreateVersionRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(description) = &self.description {
            require_non_empty("description", description)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct InsertDocumentVersion {
    pub document_id: i64,
    pub content: String,
    pub author_id: i64,
    pub description: Option<String>,
}

impl CreateVersionRequest {
    pub fn for_document(self, document_id: DocumentId) -> InsertDocumentVersion {
        InsertDocumentVersion {
            document_id,
            content: self.content,
            author_id: self.author_id,
            description: self.description,
        }
    }
}
