use axum::{extract::State, routing::post, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::response::ApiResponse;
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::schemas::upload::{PresignedUrlRequest, PresignedUrlResponse};
use crate::services::object_keys;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/presigned-url", post(presigned_url))
}

async fn presigned_url(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<PresignedUrlRequest>,
) -> Result<ApiResponse<PresignedUrlResponse>, ApiError> {
    validate_payload(&payload)?;
    let storage = state
        .storage()
        .ok_or_else(|| ApiError::ServiceUnavailable("File storage is not configured".to_string()))?;

    let folder = object_keys::sanitized_folder(payload.folder.as_deref())
        .ok_or_else(|| ApiError::BadRequest("Invalid folder".to_string()))?;
    let key = object_keys::presigned_key(&folder, &payload.file_name);
    let content_type = payload
        .content_type
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE);

    let expires_in = state.settings().storage().presigned_url_ttl();
    let url = storage
        .presign_put(&key, content_type, expires_in)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to generate presigned URL"))?;

    tracing::info!(user_id = %user.id, action = "presign_upload", key = %key, "Presigned upload URL issued");
    Ok(ApiResponse::ok(
        "Presigned URL generated successfully",
        PresignedUrlResponse { url, key, bucket_name: storage.bucket().to_string() },
    ))
}

#[cfg(test)]
mod tests;
