use axum::{extract::{Path, State}, http::StatusCode, Json};

use super::store_failure;
use crate::models::{ApiError, ChatMessage, DocumentId};
use crate::state::AppState;

/// Chat history of a document, oldest first
pub async fn get_chat_messages(
    State(state): State<AppState>,
    Path(document_id): Path<DocumentId>,
) -> Result<(StatusCode, Json<Vec<ChatMessage>>), ApiError> {
    let messages = state.store.get_chat_messages(document_id).await.map_err(store_failure)?;
    Ok((StatusCode::OK, Json(messages)))
}
