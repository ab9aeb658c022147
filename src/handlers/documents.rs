use axum::{extract::{rejection::JsonRejection, Path, State}, http::StatusCode, Json};
use tracing::info;

use super::{store_failure, validated};
use crate::models::{api_error, ApiError, Document, DocumentId, InsertDocument};
use crate::state::AppState;

/// Create a document
pub async fn create_document(
    State(state): State<AppState>,
    payload: Result<Json<InsertDocument>, JsonRejection>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    let insert = validated(payload)?;
    let document = state.store.create_document(insert).await.map_err(store_failure)?;
    info!("Document {} '{}' created by user {}", document.id, document.name, document.owner_id);
    Ok((StatusCode::OK, Json(document)))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<DocumentId>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    match state.store.get_document(id).await.map_err(store_failure)? {
        Some(document) => Ok((StatusCode::OK, Json(document))),
        None => Err(api_error(StatusCode::NOT_FOUND, "Document not found")),
    }
}

/// Resolve a share link to its document
pub async fn get_document_by_share_link(
    State(state): State<AppState>,
    Path(share_link): Path<String>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    match state.store.get_document_by_share_link(&share_link).await.map_err(store_failure)? {
        Some(document) => Ok((StatusCode::OK, Json(document))),
        None => Err(api_error(StatusCode::NOT_FOUND, "Document not found")),
    }
}
