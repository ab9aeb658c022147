pub mod chat;
pub mod collaborator;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod health;
pub mod messages;
pub mod user;
pub mod version;

pub use chat::*;
pub use collaborator::*;
pub use diagnostics::*;
pub use document::*;
pub use error::*;
pub use health::*;
pub use messages::*;
pub use user::*;
pub use version::*;

pub type UserId = i64;
pub type DocumentId = i64;

/// Request bodies that carry constraints beyond what deserialization checks
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("'{}' must not be empty", field));
    }
    Ok(())
}
