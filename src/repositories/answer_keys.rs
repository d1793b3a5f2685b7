use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::{AnswerKey, GradingKey};

const COLUMNS: &str = "id, question_id, test_id, answers, clarification, created_at, updated_at";

pub(crate) async fn find_by_question(
    pool: &PgPool,
    question_id: Uuid,
) -> Result<Option<AnswerKey>, sqlx::Error> {
    sqlx::query_as::<_, AnswerKey>(&format!(
        "SELECT {COLUMNS} FROM answer_keys WHERE question_id = $1"
    ))
    .bind(question_id)
    .fetch_optional(pool)
    .await
}

pub(crate) struct UpsertAnswerKey<'a> {
    pub(crate) question_id: Uuid,
    pub(crate) test_id: Uuid,
    pub(crate) answers: Value,
    pub(crate) clarification: Option<&'a str>,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) async fn upsert(pool: &PgPool, params: UpsertAnswerKey<'_>) -> Result<AnswerKey, sqlx::Error> {
    sqlx::query_as::<_, AnswerKey>(&format!(
        "INSERT INTO answer_keys (
            id, question_id, test_id, answers, clarification, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$6)
        ON CONFLICT (question_id) DO UPDATE SET
            test_id = EXCLUDED.test_id,
            answers = EXCLUDED.answers,
            clarification = EXCLUDED.clarification,
            updated_at = EXCLUDED.updated_at
        RETURNING {COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(params.question_id)
    .bind(params.test_id)
    .bind(Json(params.answers))
    .bind(params.clarification)
    .bind(params.now)
    .fetch_one(pool)
    .await
}

pub(crate) async fn delete_by_question(pool: &PgPool, question_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM answer_keys WHERE question_id = $1")
        .bind(question_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Every key of the test together with the type of the group owning its question.
pub(crate) async fn list_for_grading(pool: &PgPool, test_id: Uuid) -> Result<Vec<GradingKey>, sqlx::Error> {
    sqlx::query_as::<_, GradingKey>(
        "SELECT k.question_id, g.question_type, k.answers
         FROM answer_keys k
         JOIN questions q ON q.id = k.question_id
         JOIN question_groups g ON g.id = q.group_id
         WHERE k.test_id = $1",
    )
    .bind(test_id)
    .fetch_all(pool)
    .await
}
