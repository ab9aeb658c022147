pub mod collaborators;
pub mod diagnostics;
pub mod documents;
pub mod health;
pub mod messages;
pub mod users;
pub mod versions;

pub use collaborators::*;
pub use diagnostics::*;
pub use documents::*;
pub use health::*;
pub use messages::*;
pub use users::*;
pub use versions::*;

use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use tracing::{error, warn};

use crate::db::StoreError;
use crate::models::{api_error, ApiError, Validate};

/// Unwrap a JSON body, turning syntax, shape and field errors into a 400
pub(crate) fn validated<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        api_error(StatusCode::BAD_REQUEST, rejection.body_text())
    })?;
    body.validate().map_err(|message| {
        warn!("Invalid request body: {}", message);
        api_error(StatusCode::BAD_REQUEST, message)
    })?;
    Ok(body)
}

pub(crate) fn store_failure(e: StoreError) -> ApiError {
    let status = match e {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Conflict(_) => StatusCode::CONFLICT,
    };
    error!("Store operation failed: {}", e);
    api_error(status, e.to_string())
}
