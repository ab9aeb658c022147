use axum::{extract::{rejection::JsonRejection, Path, State}, http::StatusCode, Json};
use tracing::info;

use super::{store_failure, validated};
use crate::models::{ApiError, CreateVersionRequest, DocumentId, DocumentVersion};
use crate::state::AppState;

/// Save the given content as a new version of the document
pub async fn create_version(
    State(state): State<AppState>,
    Path(document_id): Path<DocumentId>,
    payload: Result<Json<CreateVersionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DocumentVersion>), ApiError> {
    let request = validated(payload)?;
    let version = state
        .store
        .create_version(request.for_document(document_id))
        .await
        .map_err(store_failure)?;
    info!("Version {} saved for document {}", version.id, document_id);
    Ok((StatusCode::OK, Json(version)))
}

/// Versions of a document, newest first
pub async fn get_document_versions(
    State(state): State<AppState>,
    Path(document_id): Path<DocumentId>,
) -> Result<(StatusCode, Json<Vec<DocumentVersion>>), ApiError> {
    let versions = state.store.get_document_versions(document_id).await.map_err(store_failure)?;
    Ok((StatusCode::OK, Json(versions)))
}
