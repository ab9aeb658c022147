use axum::{extract::{rejection::JsonRejection, Path, State}, http::StatusCode, Json};
use tracing::info;

use super::{store_failure, validated};
use crate::models::{api_error, ApiError, Document, InsertUser, User, UserId};
use crate::state::AppState;

/// Create a user
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<InsertUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let insert = validated(payload)?;
    let user = state.store.create_user(insert).await.map_err(store_failure)?;
    info!("User {} created as '{}'", user.id, user.username);
    Ok((StatusCode::OK, Json(user)))
}

/// Fetch a user by id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    match state.store.get_user(id).await.map_err(store_failure)? {
        Some(user) => Ok((StatusCode::OK, Json(user))),
        None => Err(api_error(StatusCode::NOT_FOUND, "User not found")),
    }
}

/// Documents owned by a user
pub async fn get_user_documents(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<(StatusCode, Json<Vec<Document>>), ApiError> {
    let documents = state.store.get_user_documents(user_id).await.map_err(store_failure)?;
    Ok((StatusCode::OK, Json(documents)))
}
