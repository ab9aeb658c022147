use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::storage::{Storage, StoreError};
use crate::models::{
    ChatMessage, Document, DocumentCollaborator, DocumentId, DocumentUpdate, DocumentVersion,
    InsertChatMessage, InsertDocument, InsertDocumentVersion, InsertUser, User, UserId,
    DEFAULT_LANGUAGE,
};

/// Monotonic id source, one per table
#[derive(Debug)]
struct IdCounter(i64);

impl IdCounter {
    fn next(&mut self) -> i64 {
        let id = self.0;
        self.0 += 1;
        id
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        IdCounter(1)
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    documents: BTreeMap<i64, Document>,
    versions: BTreeMap<i64, DocumentVersion>,
    messages: BTreeMap<i64, ChatMessage>,
    collaborators: BTreeMap<i64, DocumentCollaborator>,

    user_ids: IdCounter,
    document_ids: IdCounter,
    version_ids: IdCounter,
    message_ids: IdCounter,
    collaborator_ids: IdCounter,
}

impl Tables {
    fn fresh_share_link(&self) -> String {
        loop {
            let candidate = format!("doc-{}", &Uuid::new_v4().simple().to_string()[..9]);
            if !self.documents.values().any(|doc| doc.share_link == candidate) {
                return candidate;
            }
        }
    }
}

/// Process-local store; everything is lost on restart
#[derive(Debug, Default)]
pub struct MemStorage {
    tables: RwLock<Tables>,
}

impl MemStorage {
    pub fn new() -> Self {
        info!("In-memory store initialized");
        Self::default()
    }
}

#[async_trait]
impl Storage for MemStorage {
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|user| user.username == username).cloned())
    }

    async fn create_user(&self, insert: InsertUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|user| user.username == insert.username) {
            return Err(StoreError::Conflict(format!("Username '{}' is already taken", insert.username)));
        }
        if tables.users.values().any(|user| user.email == insert.email) {
            return Err(StoreError::Conflict(format!("Email '{}' is already registered", insert.email)));
        }

        let user = User {
            id: tables.user_ids.next(),
            username: insert.username,
            email: insert.email,
            display_name: insert.display_name,
            color: insert.color,
            is_online: true,
            last_seen: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        debug!("Created user {} ({})", user.id, user.username);
        Ok(user)
    }

    async fn update_user_online_status(&self, id: UserId, is_online: bool) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or(StoreError::NotFound { entity: "User", id })?;
        user.is_online = is_online;
        user.last_seen = Utc::now();
        Ok(())
    }

    async fn create_document(&self, insert: InsertDocument) -> Result<Document, StoreError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let document = Document {
            id: tables.document_ids.next(),
            name: insert.name,
            content: insert.content.unwrap_or_default(),
            language: insert.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            owner_id: insert.owner_id,
            is_public: insert.is_public.unwrap_or(false),
            share_link: tables.fresh_share_link(),
            created_at: now,
            updated_at: now,
        };
        tables.documents.insert(document.id, document.clone());
        debug!("Created document {} with share link {}", document.id, document.share_link);
        Ok(document)
    }

    async fn get_document(&self, id: DocumentId) -> Result<Option<Document>, StoreError> {
        Ok(self.tables.read().await.documents.get(&id).cloned())
    }

    async fn get_document_by_share_link(&self, share_link: &str) -> Result<Option<Document>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.documents.values().find(|doc| doc.share_link == share_link).cloned())
    }

    async fn update_document(&self, id: DocumentId, update: DocumentUpdate) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let document = tables
            .documents
            .get_mut(&id)
            .ok_or(StoreError::NotFound { entity: "Document", id })?;
        update.apply_to(document);
        document.updated_at = Utc::now();
        Ok(())
    }

    async fn get_user_documents(&self, user_id: UserId) -> Result<Vec<Document>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.documents.values().filter(|doc| doc.owner_id == user_id).cloned().collect())
    }

    async fn create_version(&self, insert: InsertDocumentVersion) -> Result<DocumentVersion, StoreError> {
        let mut tables = self.tables.write().await;
        let version = DocumentVersion {
            id: tables.version_ids.next(),
            document_id: insert.document_id,
            content: insert.content,
            author_id: insert.author_id,
            description: insert.description,
            created_at: Utc::now(),
        };
        tables.versions.insert(version.id, version.clone());
        Ok(version)
    }

    async fn get_document_versions(&self, document_id: DocumentId) -> Result<Vec<DocumentVersion>, StoreError> {
        let tables = self.tables.read().await;
        let mut versions: Vec<DocumentVersion> = tables
            .versions
            .values()
            .filter(|version| version.document_id == document_id)
            .cloned()
            .collect();
        // Ids break ties between versions saved within the same instant
        versions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(versions)
    }

    async fn create_chat_message(&self, insert: InsertChatMessage) -> Result<ChatMessage, StoreError> {
        let mut tables = self.tables.write().await;
        let message = ChatMessage {
            id: tables.message_ids.next(),
            document_id: insert.document_id,
            author_id: insert.author_id,
            content: insert.content,
            created_at: Utc::now(),
        };
        tables.messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn get_chat_messages(&self, document_id: DocumentId) -> Result<Vec<ChatMessage>, StoreError> {
        let tables = self.tables.read().await;
        let mut messages: Vec<ChatMessage> = tables
            .messages
            .values()
            .filter(|message| message.document_id == document_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(messages)
    }

    async fn add_collaborator(&self, document_id: DocumentId, user_id: UserId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let exists = tables
            .collaborators
            .values()
            .any(|c| c.document_id == document_id && c.user_id == user_id);
        if !exists {
            let collaborator = DocumentCollaborator {
                id: tables.collaborator_ids.next(),
                document_id,
                user_id,
                joined_at: Utc::now(),
            };
            tables.collaborators.insert(collaborator.id, collaborator);
        }
        Ok(())
    }

    async fn get_document_collaborators(&self, document_id: DocumentId) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .collaborators
            .values()
            .filter(|c| c.document_id == document_id)
            .filter_map(|c| tables.users.get(&c.user_id).cloned())
            .collect())
    }

    async fn remove_collaborator(&self, document_id: DocumentId, user_id: UserId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .collaborators
            .retain(|_, c| !(c.document_id == document_id && c.user_id == user_id));
        Ok(())
    }
}
