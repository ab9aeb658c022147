use axum::{extract::{Path, State}, http::StatusCode, Json};
use tracing::info;

use super::store_failure;
use crate::models::{ApiError, DocumentId, User, UserId};
use crate::state::AppState;

/// Users who have joined the document at least once
pub async fn get_document_collaborators(
    State(state): State<AppState>,
    Path(document_id): Path<DocumentId>,
) -> Result<(StatusCode, Json<Vec<User>>), ApiError> {
    let users = state.store.get_document_collaborators(document_id).await.map_err(store_failure)?;
    Ok((StatusCode::OK, Json(users)))
}

pub async fn remove_collaborator(
    State(state): State<AppState>,
    Path((document_id, user_id)): Path<(DocumentId, UserId)>,
) -> Result<StatusCode, ApiError> {
    state.store.remove_collaborator(document_id, user_id).await.map_err(store_failure)?;
    info!("User {} removed from collaborators of document {}", user_id, document_id);
    Ok(StatusCode::NO_CONTENT)
}
