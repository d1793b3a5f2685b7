use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::IeltsTestResult;

const COLUMNS: &str = "\
    id, test_id, user_id, correct_answers, total_questions, score, submission, \
    detail_analysis, time_spent, created_at";

pub(crate) struct CreateTestResult {
    pub(crate) test_id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) correct_answers: i32,
    pub(crate) total_questions: i32,
    pub(crate) score: f64,
    pub(crate) submission: Value,
    pub(crate) detail_analysis: Value,
    pub(crate) time_spent: i32,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateTestResult) -> Result<IeltsTestResult, sqlx::Error> {
    sqlx::query_as::<_, IeltsTestResult>(&format!(
        "INSERT INTO ielts_test_results (
            id, test_id, user_id, correct_answers, total_questions, score,
            submission, detail_analysis, time_spent, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
        RETURNING {COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(params.test_id)
    .bind(params.user_id)
    .bind(params.correct_answers)
    .bind(params.total_questions)
    .bind(params.score)
    .bind(Json(params.submission))
    .bind(Json(params.detail_analysis))
    .bind(params.time_spent)
    .bind(params.now)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_for_user(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<IeltsTestResult>, sqlx::Error> {
    sqlx::query_as::<_, IeltsTestResult>(&format!(
        "SELECT {COLUMNS} FROM ielts_test_results WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_for_user(
    pool: &PgPool,
    user_id: Uuid,
    offset: i64,
    limit: i64,
) -> Result<Vec<IeltsTestResult>, sqlx::Error> {
    sqlx::query_as::<_, IeltsTestResult>(&format!(
        "SELECT {COLUMNS} FROM ielts_test_results
         WHERE user_id = $1
         ORDER BY created_at DESC
         OFFSET $2 LIMIT $3"
    ))
    .bind(user_id)
    .bind(offset.max(0))
    .bind(limit.clamp(1, 1000))
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM ielts_test_results WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
}
