use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    ChatMessage, Document, DocumentId, DocumentUpdate, DocumentVersion, InsertChatMessage,
    InsertDocument, InsertDocumentVersion, InsertUser, User, UserId,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("{0}")]
    Conflict(String),
}

/// Persistence boundary shared by the REST handlers and the collaboration dispatcher
#[async_trait]
pub trait Storage: Send + Sync {
    // Users
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn create_user(&self, user: InsertUser) -> Result<User, StoreError>;
    async fn update_user_online_status(&self, id: UserId, is_online: bool) -> Result<(), StoreError>;

    // Documents
    async fn create_document(&self, document: InsertDocument) -> Result<Document, StoreError>;
    async fn get_document(&self, id: DocumentId) -> Result<Option<Document>, StoreError>;
    async fn get_document_by_share_link(&self, share_link: &str) -> Result<Option<Document>, StoreError>;
    async fn update_document(&self, id: DocumentId, update: DocumentUpdate) -> Result<(), StoreError>;
    async fn get_user_documents(&self, user_id: UserId) -> Result<Vec<Document>, StoreError>;

    // Versions, newest first
    async fn create_version(&self, version: InsertDocumentVersion) -> Result<DocumentVersion, StoreError>;
    async fn get_document_versions(&self, document_id: DocumentId) -> Result<Vec<DocumentVersion>, StoreError>;

    // Chat, oldest first
    async fn create_chat_message(&self, message: InsertChatMessage) -> Result<ChatMessage, StoreError>;
    async fn get_chat_messages(&self, document_id: DocumentId) -> Result<Vec<ChatMessage>, StoreError>;

    // Collaborators
    async fn add_collaborator(&self, document_id: DocumentId, user_id: UserId) -> Result<(), StoreError>;
    async fn get_document_collaborators(&self, document_id: DocumentId) -> Result<Vec<User>, StoreError>;
    async fn remove_collaborator(&self, document_id: DocumentId, user_id: UserId) -> Result<(), StoreError>;
}
