use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::Question;
use crate::repositories::ordering::{self, Siblings};

const COLUMNS: &str = "id, group_id, title, content, image, position, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_group(pool: &PgPool, group_id: Uuid) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE group_id = $1 ORDER BY position"
    ))
    .bind(group_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateQuestion<'a> {
    pub(crate) group_id: Uuid,
    pub(crate) title: &'a str,
    pub(crate) content: Value,
    pub(crate) image: Option<&'a str>,
    pub(crate) position: i32,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateQuestion<'_>) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (id, group_id, title, content, image, position, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$7,$7)
         RETURNING {COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(params.group_id)
    .bind(params.title)
    .bind(Json(params.content))
    .bind(params.image)
    .bind(params.position)
    .bind(params.now)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateQuestion<'a> {
    pub(crate) title: Option<&'a str>,
    pub(crate) content: Option<Value>,
    pub(crate) image: Option<&'a str>,
    pub(crate) position: Option<i32>,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: Uuid,
    params: UpdateQuestion<'_>,
) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "UPDATE questions SET
            title = COALESCE($1, title),
            content = COALESCE($2, content),
            image = COALESCE($3, image),
            position = COALESCE($4, position),
            updated_at = $5
         WHERE id = $6
         RETURNING {COLUMNS}"
    ))
    .bind(params.title)
    .bind(params.content.map(Json))
    .bind(params.image)
    .bind(params.position)
    .bind(params.now)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Deletes the question with its answer key and renumbers the rest of its group.
/// Returns the number of siblings that moved.
pub(crate) async fn delete_and_compact(pool: &PgPool, question: &Question) -> Result<usize, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM answer_keys WHERE question_id = $1")
        .bind(question.id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM questions WHERE id = $1").bind(question.id).execute(&mut *tx).await?;
    let moved = ordering::compact(&mut tx, Siblings::Questions { group_id: question.group_id }).await?;

    tx.commit().await?;
    Ok(moved)
}

/// Resolves the test a question belongs to through its group and section.
pub(crate) async fn find_test_id(pool: &PgPool, question_id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT s.test_id
         FROM questions q
         JOIN question_groups g ON g.id = q.group_id
         JOIN sections s ON s.id = g.section_id
         WHERE q.id = $1",
    )
    .bind(question_id)
    .fetch_optional(pool)
    .await
}
