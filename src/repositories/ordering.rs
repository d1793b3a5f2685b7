use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::db::types::SectionType;
use crate::services::ordering::renumber_plan;

/// A set of rows that share one position sequence.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Siblings {
    Sections { test_id: Uuid, section_type: SectionType },
    Groups { section_id: Uuid },
    Questions { group_id: Uuid },
}

impl Siblings {
    fn table(self) -> &'static str {
        match self {
            Self::Sections { .. } => "sections",
            Self::Groups { .. } => "question_groups",
            Self::Questions { .. } => "questions",
        }
    }
}

/// Renumbers the siblings to 1..n keeping their relative order. Returns the number of moved rows.
///
/// Moved rows are first parked on negative positions so the unique `(parent, position)`
/// constraint holds after every row update.
pub(crate) async fn compact(
    tx: &mut Transaction<'_, Postgres>,
    siblings: Siblings,
) -> Result<usize, sqlx::Error> {
    let current = load_positions(tx, siblings).await?;
    let plan = renumber_plan(&current);
    if plan.is_empty() {
        return Ok(0);
    }

    let table = siblings.table();
    let (ids, positions): (Vec<Uuid>, Vec<i32>) = plan.into_iter().unzip();

    sqlx::query(&format!("UPDATE {table} SET position = -position WHERE id = ANY($1)"))
        .bind(&ids)
        .execute(&mut **tx)
        .await?;

    sqlx::query(&format!(
        "UPDATE {table} AS t
         SET position = v.position, updated_at = (NOW() AT TIME ZONE 'UTC')
         FROM UNNEST($1::uuid[], $2::int4[]) AS v(id, position)
         WHERE t.id = v.id"
    ))
    .bind(&ids)
    .bind(&positions)
    .execute(&mut **tx)
    .await?;

    Ok(ids.len())
}

async fn load_positions(
    tx: &mut Transaction<'_, Postgres>,
    siblings: Siblings,
) -> Result<Vec<(Uuid, i32)>, sqlx::Error> {
    match siblings {
        Siblings::Sections { test_id, section_type } => {
            sqlx::query_as(
                "SELECT id, position FROM sections
                 WHERE test_id = $1 AND section_type = $2
                 ORDER BY position FOR UPDATE",
            )
            .bind(test_id)
            .bind(section_type)
            .fetch_all(&mut **tx)
            .await
        }
        Siblings::Groups { section_id } => {
            sqlx::query_as(
                "SELECT id, position FROM question_groups
                 WHERE section_id = $1 ORDER BY position FOR UPDATE",
            )
            .bind(section_id)
            .fetch_all(&mut **tx)
            .await
        }
        Siblings::Questions { group_id } => {
            sqlx::query_as(
                "SELECT id, position FROM questions
                 WHERE group_id = $1 ORDER BY position FOR UPDATE",
            )
            .bind(group_id)
            .fetch_all(&mut **tx)
            .await
        }
    }
}
