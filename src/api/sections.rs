use axum::{
    extract::{Multipart, Path, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStaff;
use crate::api::ielts_tests::fetch_active_test;
use crate::api::response::{ApiResponse, Created};
use crate::api::upload::UploadForm;
use crate::api::validation::{validate_audio_upload, validate_payload};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Section;
use crate::db::types::SectionType;
use crate::repositories;
use crate::schemas::question_group::QuestionGroupResponse;
use crate::schemas::section::{
    AudioResponse, CreateSectionRequest, DeleteSectionRequest, UpdateTranscriptRequest,
};
use crate::schemas::IdResponse;
use crate::services::object_keys;

const SECTION_NOT_FOUND: &str = "Section not found";
const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_section).delete(delete_section))
        .route("/transcript", put(update_transcript))
        .route("/audio", put(upload_audio))
        .route("/:id/question-groups", get(list_question_groups))
}

pub(crate) async fn fetch_section(state: &AppState, id: Uuid) -> Result<Section, ApiError> {
    repositories::sections::find_by_id(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load section"))?
        .ok_or_else(|| ApiError::NotFound(SECTION_NOT_FOUND.to_string()))
}

async fn create_section(
    CurrentStaff(user): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<CreateSectionRequest>,
) -> Result<Created<IdResponse>, ApiError> {
    validate_payload(&payload)?;
    let test = fetch_active_test(&state, payload.test_id).await?;

    let section = repositories::sections::create(
        state.db(),
        repositories::sections::CreateSection {
            test_id: test.id,
            section_type: payload.section_type,
            position: payload.order,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| {
        ApiError::from_write(
            e,
            &format!(
                "{} section with order {} already exists in this test",
                payload.section_type.label(),
                payload.order
            ),
            "Failed to create section",
        )
    })?;

    tracing::info!(
        user_id = %user.id,
        action = "section_create",
        test_id = %test.id,
        section_id = %section.id,
        section_type = ?section.section_type,
        "Section created"
    );
    Ok(ApiResponse::created("Section created successfully", IdResponse { id: section.id }))
}

async fn update_transcript(
    CurrentStaff(user): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<UpdateTranscriptRequest>,
) -> Result<ApiResponse<IdResponse>, ApiError> {
    let section = repositories::sections::set_description(
        state.db(),
        payload.id,
        &payload.description,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update transcript"))?
    .ok_or_else(|| ApiError::NotFound(SECTION_NOT_FOUND.to_string()))?;

    tracing::info!(user_id = %user.id, action = "section_transcript", section_id = %section.id, "Transcript updated");
    Ok(ApiResponse::ok("Transcript updated successfully", IdResponse { id: section.id }))
}

async fn upload_audio(
    CurrentStaff(user): CurrentStaff,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse<AudioResponse>, ApiError> {
    let storage = state
        .storage()
        .ok_or_else(|| ApiError::ServiceUnavailable("File storage is not configured".to_string()))?;

    let mut form =
        UploadForm::read(multipart, state.settings().storage().max_audio_upload_bytes()).await?;
    let section_id = form.uuid_field("id")?;
    let file = form.require_file()?;
    validate_audio_upload(&file.content_type)?;

    let section = fetch_section(&state, section_id).await?;
    if section.section_type != SectionType::Listening {
        return Err(ApiError::BadRequest(
            "Audio can only be attached to Listening sections".to_string(),
        ));
    }

    let key = object_keys::section_audio_key(&file.filename);
    let stored = storage
        .upload_bytes(key, AUDIO_CONTENT_TYPE, file.bytes)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to upload audio"))?;

    repositories::sections::set_audio(state.db(), section.id, &stored.url, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update section audio"))?
        .ok_or_else(|| ApiError::NotFound(SECTION_NOT_FOUND.to_string()))?;

    tracing::info!(
        user_id = %user.id,
        action = "section_audio",
        section_id = %section.id,
        key = %stored.key,
        size = stored.size,
        "Section audio uploaded"
    );
    Ok(ApiResponse::ok("Audio uploaded successfully", AudioResponse { audio_url: stored.url }))
}

async fn delete_section(
    CurrentStaff(user): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<DeleteSectionRequest>,
) -> Result<ApiResponse<IdResponse>, ApiError> {
    let section = repositories::sections::find_by_id_and_type(
        state.db(),
        payload.section_id,
        payload.section_type,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to load section"))?
    .ok_or_else(|| {
        ApiError::NotFound(format!(
            "{} section with ID {} not found",
            payload.section_type.label(),
            payload.section_id
        ))
    })?;

    let summary = repositories::sections::delete_cascade(state.db(), &section)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete section"))?;

    tracing::info!(
        user_id = %user.id,
        action = "section_delete",
        section_id = %section.id,
        test_id = %section.test_id,
        groups = summary.groups,
        questions = summary.questions,
        answer_keys = summary.answer_keys,
        renumbered = summary.renumbered,
        "Section deleted"
    );
    Ok(ApiResponse::ok("Section deleted successfully", IdResponse { id: section.id }))
}

async fn list_question_groups(
    Path(id): Path<Uuid>,
    CurrentStaff(_user): CurrentStaff,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<QuestionGroupResponse>>, ApiError> {
    fetch_section(&state, id).await?;
    let groups = repositories::question_groups::list_by_section(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list question groups"))?;

    Ok(ApiResponse::ok(
        "Question groups retrieved successfully",
        groups.into_iter().map(QuestionGroupResponse::from_db).collect(),
    ))
}
