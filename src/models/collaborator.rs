use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DocumentId, UserId};

/// Membership of a user in a document, recorded on first join
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentCollaborator {
    pub id: i64,
    pub document_id: DocumentId,
    pub user_id: UserId,
    pub joined_at: DateTime<Utc>,
}
