use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{require_non_empty, Validate};

/// A registered editor user
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub display_name: String,
    /// Colour used for the user's cursor and presence badge
    pub color: String,
    pub is_online: bool,
    pub last_seen: DateTime<Utc>,
}

/// Request body for creating a user
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InsertUser {
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub color: String,
}

impl Validate for InsertUser {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("username", &self.username)?;
        require_non_empty("email", &self.email)?;
        require_non_empty("displayName", &self.display_name)?;
        require_non_empty("color", &self.color)
    }
}
