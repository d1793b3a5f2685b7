use axum::{
    extract::{Multipart, Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStaff;
use crate::api::response::{ApiResponse, Created};
use crate::api::upload::UploadForm;
use crate::api::validation::{validate_image_upload, validate_payload};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::QuestionGroup;
use crate::repositories;
use crate::schemas::question::QuestionResponse;
use crate::schemas::question_group::{
    CreateQuestionGroupRequest, GroupImageResponse, QuestionGroupResponse,
    UpdateQuestionGroupRequest,
};
use crate::schemas::IdResponse;
use crate::services::object_keys;

const GROUP_NOT_FOUND: &str = "Question group not found";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_group).put(update_group))
        .route("/images/upload", post(upload_image))
        .route("/images/:group_id", delete(remove_image))
        .route("/:id", delete(delete_group))
        .route("/:id/questions", get(list_questions))
}

fn order_taken(order: i32) -> String {
    format!("A question group with order {order} already exists in this section")
}

pub(crate) async fn fetch_group(state: &AppState, id: Uuid) -> Result<QuestionGroup, ApiError> {
    repositories::question_groups::find_by_id(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load question group"))?
        .ok_or_else(|| ApiError::NotFound(GROUP_NOT_FOUND.to_string()))
}

async fn create_group(
    CurrentStaff(user): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<CreateQuestionGroupRequest>,
) -> Result<Created<IdResponse>, ApiError> {
    validate_payload(&payload)?;
    let section = repositories::sections::find_by_id_and_type(
        state.db(),
        payload.section_id,
        payload.section_type,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to load section"))?
    .ok_or_else(|| ApiError::NotFound("Section not found".to_string()))?;

    let group = repositories::question_groups::create(
        state.db(),
        repositories::question_groups::CreateQuestionGroup {
            section_id: section.id,
            question_type: payload.question_type,
            position: payload.order,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| {
        ApiError::from_write(e, &order_taken(payload.order), "Failed to create question group")
    })?;

    tracing::info!(
        user_id = %user.id,
        action = "group_create",
        section_id = %section.id,
        group_id = %group.id,
        "Question group created"
    );
    Ok(ApiResponse::created("Question group created successfully", IdResponse { id: group.id }))
}

async fn update_group(
    CurrentStaff(user): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<UpdateQuestionGroupRequest>,
) -> Result<ApiResponse<QuestionGroupResponse>, ApiError> {
    validate_payload(&payload)?;

    let group = repositories::question_groups::update(
        state.db(),
        payload.id,
        repositories::question_groups::UpdateQuestionGroup {
            instruction: &payload.instruction,
            question_type: payload.question_type,
            position: payload.order,
            category: payload.category,
            content: payload.content,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| {
        ApiError::from_write(e, &order_taken(payload.order), "Failed to update question group")
    })?
    .ok_or_else(|| ApiError::NotFound(GROUP_NOT_FOUND.to_string()))?;

    tracing::info!(user_id = %user.id, action = "group_update", group_id = %group.id, "Question group updated");
    Ok(ApiResponse::ok("Question group updated successfully", QuestionGroupResponse::from_db(group)))
}

async fn upload_image(
    CurrentStaff(user): CurrentStaff,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Created<GroupImageResponse>, ApiError> {
    let storage = state
        .storage()
        .ok_or_else(|| ApiError::ServiceUnavailable("File storage is not configured".to_string()))?;

    let limits = state.settings().storage();
    let mut form = UploadForm::read(multipart, limits.max_upload_bytes()).await?;
    let group_id = form.uuid_field("group_id")?;
    let file = form.require_file()?;
    validate_image_upload(&file.filename, &file.content_type, &limits.allowed_image_extensions)?;

    let group = fetch_group(&state, group_id).await?;

    let key = object_keys::group_image_key(&file.filename);
    let stored = storage
        .upload_bytes(key, object_keys::image_content_type(&file.filename), file.bytes)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to upload image"))?;

    let updated = repositories::question_groups::set_image(
        state.db(),
        group.id,
        Some(&stored.url),
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update question group image"))?;
    if !updated {
        return Err(ApiError::NotFound(GROUP_NOT_FOUND.to_string()));
    }

    tracing::info!(
        user_id = %user.id,
        action = "group_image_upload",
        group_id = %group.id,
        key = %stored.key,
        size = stored.size,
        sha256 = %stored.sha256,
        "Question group image uploaded"
    );
    Ok(ApiResponse::created(
        "Image uploaded successfully",
        GroupImageResponse { image_url: stored.url },
    ))
}

async fn remove_image(
    Path(group_id): Path<Uuid>,
    CurrentStaff(user): CurrentStaff,
    State(state): State<AppState>,
) -> Result<ApiResponse<IdResponse>, ApiError> {
    let updated =
        repositories::question_groups::set_image(state.db(), group_id, None, primitive_now_utc())
            .await
            .map_err(|e| ApiError::internal(e, "Failed to remove question group image"))?;
    if !updated {
        return Err(ApiError::NotFound(GROUP_NOT_FOUND.to_string()));
    }

    tracing::info!(user_id = %user.id, action = "group_image_delete", group_id = %group_id, "Question group image removed");
    Ok(ApiResponse::ok("Image removed successfully", IdResponse { id: group_id }))
}

async fn delete_group(
    Path(id): Path<Uuid>,
    CurrentStaff(user): CurrentStaff,
    State(state): State<AppState>,
) -> Result<ApiResponse<IdResponse>, ApiError> {
    let group = fetch_group(&state, id).await?;
    let summary = repositories::question_groups::delete_cascade(state.db(), &group)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete question group"))?;

    tracing::info!(
        user_id = %user.id,
        action = "group_delete",
        group_id = %group.id,
        section_id = %group.section_id,
        questions = summary.questions,
        answer_keys = summary.answer_keys,
        renumbered = summary.renumbered,
        "Question group deleted"
    );
    Ok(ApiResponse::ok("Question group deleted successfully", IdResponse { id: group.id }))
}

async fn list_questions(
    Path(id): Path<Uuid>,
    CurrentStaff(_user): CurrentStaff,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<QuestionResponse>>, ApiError> {
    fetch_group(&state, id).await?;
    let questions = repositories::questions::list_by_group(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;

    Ok(ApiResponse::ok(
        "Questions retrieved successfully",
        questions.into_iter().map(QuestionResponse::from_db).collect(),
    ))
}
