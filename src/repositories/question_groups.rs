use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::QuestionGroup;
use crate::db::types::{QuestionGroupCategory, QuestionType};
use crate::repositories::ordering::{self, Siblings};
use crate::repositories::sections::CascadeSummary;

const COLUMNS: &str = "\
    g.id, g.section_id, s.section_type, g.instruction, g.question_type, g.position, \
    g.category, g.image, g.content, g.created_at, g.updated_at";

const JOIN: &str = "JOIN sections s ON s.id = g.section_id";

pub(crate) async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<QuestionGroup>, sqlx::Error> {
    sqlx::query_as::<_, QuestionGroup>(&format!(
        "SELECT {COLUMNS} FROM question_groups g {JOIN} WHERE g.id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_by_section(
    pool: &PgPool,
    section_id: Uuid,
) -> Result<Vec<QuestionGroup>, sqlx::Error> {
    sqlx::query_as::<_, QuestionGroup>(&format!(
        "SELECT {COLUMNS} FROM question_groups g {JOIN}
         WHERE g.section_id = $1 ORDER BY g.position"
    ))
    .bind(section_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateQuestionGroup {
    pub(crate) section_id: Uuid,
    pub(crate) question_type: QuestionType,
    pub(crate) position: i32,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateQuestionGroup,
) -> Result<QuestionGroup, sqlx::Error> {
    sqlx::query_as::<_, QuestionGroup>(&format!(
        "WITH g AS (
            INSERT INTO question_groups (
                id, section_id, instruction, question_type, position, created_at, updated_at
            ) VALUES ($1,$2,'',$3,$4,$5,$5)
            RETURNING *
        )
        SELECT {COLUMNS} FROM g {JOIN}"
    ))
    .bind(Uuid::new_v4())
    .bind(params.section_id)
    .bind(params.question_type)
    .bind(params.position)
    .bind(params.now)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateQuestionGroup<'a> {
    pub(crate) instruction: &'a str,
    pub(crate) question_type: QuestionType,
    pub(crate) position: i32,
    pub(crate) category: Option<QuestionGroupCategory>,
    pub(crate) content: Option<Value>,
    pub(crate) now: PrimitiveDateTime,
}

/// `category` and `content` are only replaced when provided.
pub(crate) async fn update(
    pool: &PgPool,
    id: Uuid,
    params: UpdateQuestionGroup<'_>,
) -> Result<Option<QuestionGroup>, sqlx::Error> {
    sqlx::query_as::<_, QuestionGroup>(&format!(
        "WITH g AS (
            UPDATE question_groups SET
                instruction = $1,
                question_type = $2,
                position = $3,
                category = COALESCE($4, category),
                content = COALESCE($5, content),
                updated_at = $6
            WHERE id = $7
            RETURNING *
        )
        SELECT {COLUMNS} FROM g {JOIN}"
    ))
    .bind(params.instruction)
    .bind(params.question_type)
    .bind(params.position)
    .bind(params.category)
    .bind(params.content.map(Json))
    .bind(params.now)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn set_image(
    pool: &PgPool,
    id: Uuid,
    image: Option<&str>,
    now: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE question_groups SET image = $1, updated_at = $2 WHERE id = $3")
        .bind(image)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Removes the group's questions and their answer keys. Returns `(questions, answer_keys)`.
pub(crate) async fn delete_content(
    tx: &mut Transaction<'_, Postgres>,
    group_id: Uuid,
) -> Result<(u64, u64), sqlx::Error> {
    let answer_keys = sqlx::query(
        "DELETE FROM answer_keys
         WHERE question_id IN (SELECT id FROM questions WHERE group_id = $1)",
    )
    .bind(group_id)
    .execute(&mut **tx)
    .await?
    .rows_affected();

    let questions = sqlx::query("DELETE FROM questions WHERE group_id = $1")
        .bind(group_id)
        .execute(&mut **tx)
        .await?
        .rows_affected();

    Ok((questions, answer_keys))
}

pub(crate) async fn delete_cascade(
    pool: &PgPool,
    group: &QuestionGroup,
) -> Result<CascadeSummary, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let (questions, answer_keys) = delete_content(&mut tx, group.id).await?;
    sqlx::query("DELETE FROM question_groups WHERE id = $1")
        .bind(group.id)
        .execute(&mut *tx)
        .await?;
    let renumbered =
        ordering::compact(&mut tx, Siblings::Groups { section_id: group.section_id }).await?;

    tx.commit().await?;
    Ok(CascadeSummary { groups: 1, questions, answer_keys, renumbered })
}

/// Compacts the groups of a section and the questions of each of those groups.
pub(crate) async fn compact_section(
    tx: &mut Transaction<'_, Postgres>,
    section_id: Uuid,
) -> Result<usize, sqlx::Error> {
    let mut moved = ordering::compact(tx, Siblings::Groups { section_id }).await?;

    let group_ids: Vec<Uuid> =
        sqlx::query_scalar("SELECT id FROM question_groups WHERE section_id = $1 ORDER BY position")
            .bind(section_id)
            .fetch_all(&mut **tx)
            .await?;

    for group_id in group_ids {
        moved += ordering::compact(tx, Siblings::Questions { group_id }).await?;
    }

    Ok(moved)
}
