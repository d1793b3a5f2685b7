use axum::{
    extract::{Multipart, Path, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::response::ApiResponse;
use crate::api::upload::UploadForm;
use crate::api::validation::{validate_image_upload, validate_phone_number, validate_username};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::user::{
    AvatarResponse, ProfileResponse, UpdateProfileRequest, UpdateRoleRequest, UserResponse,
};
use crate::services::object_keys;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/profile", get(profile))
        .route("/update", put(update_profile))
        .route("/upload/user-image", post(upload_user_image))
        .route("/role", put(update_role))
        .route("/:id", get(get_user))
}

async fn list_users(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<UserResponse>>, ApiError> {
    let users = repositories::users::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list users"))?;

    Ok(ApiResponse::ok(
        "Users retrieved successfully",
        users.into_iter().map(UserResponse::from_db).collect(),
    ))
}

async fn get_user(
    Path(id): Path<Uuid>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<ApiResponse<UserResponse>, ApiError> {
    let user = repositories::users::find_by_id(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::ok("User retrieved successfully", UserResponse::from_db(user)))
}

async fn profile(CurrentUser(user): CurrentUser) -> ApiResponse<ProfileResponse> {
    ApiResponse::ok("Profile retrieved successfully", ProfileResponse::from_db(user))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

async fn update_profile(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<ApiResponse<ProfileResponse>, ApiError> {
    let username = non_empty(payload.username.as_deref());
    let phone_number = non_empty(payload.phone_number.as_deref());

    if let Some(username) = username {
        validate_username(username)?;
    }
    if let Some(phone_number) = phone_number {
        validate_phone_number(phone_number)?;
    }

    let updated = repositories::users::update_profile(
        state.db(),
        user.id,
        username,
        phone_number,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update profile"))?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %user.id, action = "profile_update", "Profile updated");
    Ok(ApiResponse::ok("Profile updated successfully", ProfileResponse::from_db(updated)))
}

async fn upload_user_image(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse<AvatarResponse>, ApiError> {
    let storage = state
        .storage()
        .ok_or_else(|| ApiError::ServiceUnavailable("File storage is not configured".to_string()))?;

    let limits = state.settings().storage();
    let mut form = UploadForm::read(multipart, limits.max_upload_bytes()).await?;
    let file = form.require_file()?;
    validate_image_upload(&file.filename, &file.content_type, &limits.allowed_image_extensions)?;

    let key = object_keys::user_image_key(user.id, &file.filename);
    let stored = storage
        .upload_bytes(key, object_keys::image_content_type(&file.filename), file.bytes)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to upload image"))?;

    repositories::users::set_avatar(state.db(), user.id, &stored.url, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update avatar"))?;

    tracing::info!(
        user_id = %user.id,
        action = "avatar_upload",
        key = %stored.key,
        size = stored.size,
        sha256 = %stored.sha256,
        "Avatar uploaded"
    );
    Ok(ApiResponse::ok("Avatar uploaded successfully", AvatarResponse { avatar_url: stored.url }))
}

async fn update_role(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<ApiResponse<UserResponse>, ApiError> {
    let user =
        repositories::users::set_role(state.db(), payload.id, payload.role, primitive_now_utc())
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update role"))?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(
        user_id = %admin.id,
        action = "role_update",
        target_user_id = %user.id,
        role = ?user.role,
        "User role changed"
    );
    Ok(ApiResponse::ok("Role updated successfully", UserResponse::from_db(user)))
}
