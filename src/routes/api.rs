use crate::{handlers::*, state::AppState};
use axum::{routing::{delete, get, post}, Router};

/// Create API routes
pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/diagnostics", get(diagnostics))
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
        .route("/users/:id/documents", get(get_user_documents))
        .route("/documents", post(create_document))
        .route("/documents/:id", get(get_document))
        .route("/documents/share/:share_link", get(get_document_by_share_link))
        .route("/documents/:id/versions", post(create_version).get(get_document_versions))
        .route("/documents/:id/messages", get(get_chat_messages))
        .route("/documents/:id/collaborators", get(get_document_collaborators))
        .route("/documents/:id/collaborators/:user_id", delete(remove_collaborator))
}
