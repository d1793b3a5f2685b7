use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::pagination::PageQuery;
use crate::api::response::ApiResponse;
use crate::core::metrics;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::test_result::{
    CreateTestResultRequest, ScoreResponse, TestResultPage, TestResultResponse,
};
use crate::services::scoring;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_results).post(submit_result))
        .route("/:id", get(get_result))
}

async fn submit_result(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateTestResultRequest>,
) -> Result<ApiResponse<ScoreResponse>, ApiError> {
    let keys = repositories::answer_keys::list_for_grading(state.db(), payload.test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load answer keys"))?;

    let outcome = scoring::score_submission(payload.test_id, &keys, &payload.submission)?;
    let submission = serde_json::to_value(&payload.submission)
        .map_err(|e| ApiError::internal(e, "Failed to encode submission"))?;

    let result = repositories::test_results::create(
        state.db(),
        repositories::test_results::CreateTestResult {
            test_id: payload.test_id,
            user_id: user.id,
            correct_answers: outcome.correct,
            total_questions: outcome.total,
            score: outcome.score,
            submission,
            detail_analysis: outcome.detail_analysis(),
            time_spent: payload.time_spent.unwrap_or(0).max(0),
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to save test result"))?;

    metrics::record_test_result(result.score);
    tracing::info!(
        user_id = %user.id,
        action = "test_submit",
        test_id = %result.test_id,
        result_id = %result.id,
        correct = result.correct_answers,
        total = result.total_questions,
        score = result.score,
        "Test result recorded"
    );
    Ok(ApiResponse::ok("Test result submitted successfully", ScoreResponse::from_db(result)))
}

async fn get_result(
    Path(id): Path<Uuid>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<ApiResponse<TestResultResponse>, ApiError> {
    let result = repositories::test_results::find_for_user(state.db(), id, user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load test result"))?
        .ok_or_else(|| ApiError::NotFound("Test result not found".to_string()))?;

    Ok(ApiResponse::ok("Test result retrieved successfully", TestResultResponse::from_db(result)))
}

async fn list_results(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<ApiResponse<TestResultPage>, ApiError> {
    let total = repositories::test_results::count_for_user(state.db(), user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count test results"))?;
    let results =
        repositories::test_results::list_for_user(state.db(), user.id, page.offset(), page.limit())
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list test results"))?;

    Ok(ApiResponse::ok(
        "Test results retrieved successfully",
        TestResultPage {
            data: results.into_iter().map(TestResultResponse::from_db).collect(),
            total,
            page: page.page(),
            limit: page.limit(),
        },
    ))
}
