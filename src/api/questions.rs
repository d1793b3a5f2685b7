use axum::{
    extract::{Path, State},
    routing::{post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStaff;
use crate::api::question_groups::fetch_group;
use crate::api::response::{ApiResponse, Created};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Question;
use crate::repositories;
use crate::schemas::question::{
    AnswerKeyRequest, AnswerKeyResponse, CreateQuestionRequest, QuestionResponse,
    UpdateQuestionRequest,
};
use crate::schemas::IdResponse;
use crate::services::scoring;

const QUESTION_NOT_FOUND: &str = "Question not found";
const ANSWER_KEY_NOT_FOUND: &str = "Answer key not found";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_question))
        .route("/:id", put(update_question).delete(delete_question))
        .route(
            "/:id/answer-key",
            put(upsert_answer_key).get(get_answer_key).delete(delete_answer_key),
        )
}

fn order_taken(order: i32) -> String {
    format!("A question with order {order} already exists in this group")
}

async fn fetch_question(state: &AppState, id: Uuid) -> Result<Question, ApiError> {
    repositories::questions::find_by_id(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load question"))?
        .ok_or_else(|| ApiError::NotFound(QUESTION_NOT_FOUND.to_string()))
}

async fn create_question(
    CurrentStaff(user): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<Created<IdResponse>, ApiError> {
    validate_payload(&payload)?;
    let group = fetch_group(&state, payload.group_id).await?;

    let question = repositories::questions::create(
        state.db(),
        repositories::questions::CreateQuestion {
            group_id: group.id,
            title: &payload.title,
            content: payload.content,
            image: payload.image.as_deref(),
            position: payload.order,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| {
        ApiError::from_write(e, &order_taken(payload.order), "Failed to create question")
    })?;

    tracing::info!(
        user_id = %user.id,
        action = "question_create",
        group_id = %group.id,
        question_id = %question.id,
        "Question created"
    );
    Ok(ApiResponse::created("Question created successfully", IdResponse { id: question.id }))
}

async fn update_question(
    Path(id): Path<Uuid>,
    CurrentStaff(user): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<ApiResponse<QuestionResponse>, ApiError> {
    validate_payload(&payload)?;
    let conflict = order_taken(payload.order.unwrap_or_default());

    let question = repositories::questions::update(
        state.db(),
        id,
        repositories::questions::UpdateQuestion {
            title: payload.title.as_deref(),
            content: payload.content,
            image: payload.image.as_deref(),
            position: payload.order,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_write(e, &conflict, "Failed to update question"))?
    .ok_or_else(|| ApiError::NotFound(QUESTION_NOT_FOUND.to_string()))?;

    tracing::info!(user_id = %user.id, action = "question_update", question_id = %question.id, "Question updated");
    Ok(ApiResponse::ok("Question updated successfully", QuestionResponse::from_db(question)))
}

async fn delete_question(
    Path(id): Path<Uuid>,
    CurrentStaff(user): CurrentStaff,
    State(state): State<AppState>,
) -> Result<ApiResponse<IdResponse>, ApiError> {
    let question = fetch_question(&state, id).await?;
    let renumbered = repositories::questions::delete_and_compact(state.db(), &question)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete question"))?;

    tracing::info!(
        user_id = %user.id,
        action = "question_delete",
        question_id = %question.id,
        group_id = %question.group_id,
        renumbered,
        "Question deleted"
    );
    Ok(ApiResponse::ok("Question deleted successfully", IdResponse { id: question.id }))
}

async fn upsert_answer_key(
    Path(id): Path<Uuid>,
    CurrentStaff(user): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<AnswerKeyRequest>,
) -> Result<ApiResponse<AnswerKeyResponse>, ApiError> {
    let groups = scoring::parse_answer_key(&payload.answers)?;

    let test_id = repositories::questions::find_test_id(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to resolve question test"))?
        .ok_or_else(|| ApiError::NotFound(QUESTION_NOT_FOUND.to_string()))?;

    let key = repositories::answer_keys::upsert(
        state.db(),
        repositories::answer_keys::UpsertAnswerKey {
            question_id: id,
            test_id,
            answers: payload.answers,
            clarification: payload.clarification.as_deref(),
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to save answer key"))?;

    tracing::info!(
        user_id = %user.id,
        action = "answer_key_upsert",
        question_id = %id,
        test_id = %test_id,
        answer_groups = groups.len(),
        "Answer key saved"
    );
    Ok(ApiResponse::ok("Answer key saved successfully", AnswerKeyResponse::from_db(key)))
}

async fn get_answer_key(
    Path(id): Path<Uuid>,
    CurrentStaff(_user): CurrentStaff,
    State(state): State<AppState>,
) -> Result<ApiResponse<AnswerKeyResponse>, ApiError> {
    let key = repositories::answer_keys::find_by_question(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load answer key"))?
        .ok_or_else(|| ApiError::NotFound(ANSWER_KEY_NOT_FOUND.to_string()))?;

    Ok(ApiResponse::ok("Answer key retrieved successfully", AnswerKeyResponse::from_db(key)))
}

async fn delete_answer_key(
    Path(id): Path<Uuid>,
    CurrentStaff(user): CurrentStaff,
    State(state): State<AppState>,
) -> Result<ApiResponse<IdResponse>, ApiError> {
    let deleted = repositories::answer_keys::delete_by_question(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete answer key"))?;
    if !deleted {
        return Err(ApiError::NotFound(ANSWER_KEY_NOT_FOUND.to_string()));
    }

    tracing::info!(user_id = %user.id, action = "answer_key_delete", question_id = %id, "Answer key deleted");
    Ok(ApiResponse::ok("Answer key deleted successfully", IdResponse { id }))
}
