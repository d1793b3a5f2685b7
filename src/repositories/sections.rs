use sqlx::{PgPool, Postgres, Transaction};
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::Section;
use crate::db::types::SectionType;
use crate::repositories::ordering::{self, Siblings};
use crate::repositories::question_groups;

const COLUMNS: &str = "\
    id, test_id, section_type, title, description, audio, position, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Section>, sqlx::Error> {
    sqlx::query_as::<_, Section>(&format!("SELECT {COLUMNS} FROM sections WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_id_and_type(
    pool: &PgPool,
    id: Uuid,
    section_type: SectionType,
) -> Result<Option<Section>, sqlx::Error> {
    sqlx::query_as::<_, Section>(&format!(
        "SELECT {COLUMNS} FROM sections WHERE id = $1 AND section_type = $2"
    ))
    .bind(id)
    .bind(section_type)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_by_test(pool: &PgPool, test_id: Uuid) -> Result<Vec<Section>, sqlx::Error> {
    sqlx::query_as::<_, Section>(&format!(
        "SELECT {COLUMNS} FROM sections WHERE test_id = $1 ORDER BY section_type, position"
    ))
    .bind(test_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateSection {
    pub(crate) test_id: Uuid,
    pub(crate) section_type: SectionType,
    pub(crate) position: i32,
    pub(crate) now: PrimitiveDateTime,
}

/// Listening sections start with an empty audio slot; other kinds carry no audio at all.
pub(crate) async fn create(pool: &PgPool, params: CreateSection) -> Result<Section, sqlx::Error> {
    let audio = (params.section_type == SectionType::Listening).then_some("");

    sqlx::query_as::<_, Section>(&format!(
        "INSERT INTO sections (
            id, test_id, section_type, description, audio, position, created_at, updated_at
        ) VALUES ($1,$2,$3,'',$4,$5,$6,$6)
        RETURNING {COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(params.test_id)
    .bind(params.section_type)
    .bind(audio)
    .bind(params.position)
    .bind(params.now)
    .fetch_one(pool)
    .await
}

pub(crate) async fn set_description(
    pool: &PgPool,
    id: Uuid,
    description: &str,
    now: PrimitiveDateTime,
) -> Result<Option<Section>, sqlx::Error> {
    sqlx::query_as::<_, Section>(&format!(
        "UPDATE sections SET description = $1, updated_at = $2 WHERE id = $3 RETURNING {COLUMNS}"
    ))
    .bind(description)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn set_audio(
    pool: &PgPool,
    id: Uuid,
    audio_url: &str,
    now: PrimitiveDateTime,
) -> Result<Option<Section>, sqlx::Error> {
    sqlx::query_as::<_, Section>(&format!(
        "UPDATE sections SET audio = $1, updated_at = $2 WHERE id = $3 RETURNING {COLUMNS}"
    ))
    .bind(audio_url)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Row counts removed by a cascading delete.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct CascadeSummary {
    pub(crate) groups: u64,
    pub(crate) questions: u64,
    pub(crate) answer_keys: u64,
    pub(crate) renumbered: usize,
}

/// Deletes the section with all of its content, then closes the position gaps left behind in
/// the test's remaining sections of the same type and in their groups and questions.
pub(crate) async fn delete_cascade(
    pool: &PgPool,
    section: &Section,
) -> Result<CascadeSummary, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let mut summary = CascadeSummary::default();
    let group_ids: Vec<Uuid> =
        sqlx::query_scalar("SELECT id FROM question_groups WHERE section_id = $1")
            .bind(section.id)
            .fetch_all(&mut *tx)
            .await?;

    for group_id in group_ids {
        let (questions, answer_keys) = question_groups::delete_content(&mut tx, group_id).await?;
        summary.questions += questions;
        summary.answer_keys += answer_keys;
        summary.groups += 1;
    }

    sqlx::query("DELETE FROM sections WHERE id = $1").bind(section.id).execute(&mut *tx).await?;

    summary.renumbered = compact_test(&mut tx, section.test_id, section.section_type).await?;

    tx.commit().await?;
    Ok(summary)
}

async fn compact_test(
    tx: &mut Transaction<'_, Postgres>,
    test_id: Uuid,
    section_type: SectionType,
) -> Result<usize, sqlx::Error> {
    let mut moved =
        ordering::compact(tx, Siblings::Sections { test_id, section_type }).await?;

    let section_ids: Vec<Uuid> = sqlx::query_scalar(
        "SELECT id FROM sections WHERE test_id = $1 AND section_type = $2 ORDER BY position",
    )
    .bind(test_id)
    .bind(section_type)
    .fetch_all(&mut **tx)
    .await?;

    for section_id in section_ids {
        moved += question_groups::compact_section(tx, section_id).await?;
    }

    Ok(moved)
}
