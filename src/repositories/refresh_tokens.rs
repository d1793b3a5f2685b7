use sqlx::PgPool;
use time::{Duration, PrimitiveDateTime};
use uuid::Uuid;

use crate::db::models::RefreshToken;

const COLUMNS: &str = "\
    id, user_id, token, user_agent, ip_address, expires_at, revoked_at, created_at, updated_at";

pub(crate) async fn find_by_token(
    pool: &PgPool,
    token: &str,
) -> Result<Option<RefreshToken>, sqlx::Error> {
    sqlx::query_as::<_, RefreshToken>(&format!(
        "SELECT {COLUMNS} FROM refresh_tokens WHERE token = $1"
    ))
    .bind(token)
    .fetch_optional(pool)
    .await
}

pub(crate) struct StoreRefreshToken<'a> {
    pub(crate) user_id: Uuid,
    pub(crate) token: &'a str,
    pub(crate) user_agent: &'a str,
    pub(crate) ip_address: Option<&'a str>,
    pub(crate) expires_at: PrimitiveDateTime,
    pub(crate) now: PrimitiveDateTime,
}

/// One live token per user and user agent: an existing live row is overwritten, otherwise a new
/// row is inserted.
pub(crate) async fn upsert_for_agent(
    pool: &PgPool,
    params: StoreRefreshToken<'_>,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM refresh_tokens
         WHERE user_id = $1 AND user_agent = $2 AND revoked_at IS NULL
         ORDER BY created_at DESC
         LIMIT 1
         FOR UPDATE",
    )
    .bind(params.user_id)
    .bind(params.user_agent)
    .fetch_optional(&mut *tx)
    .await?;

    match existing {
        Some(id) => {
            sqlx::query(
                "UPDATE refresh_tokens
                 SET token = $1, ip_address = $2, expires_at = $3, updated_at = $4
                 WHERE id = $5",
            )
            .bind(params.token)
            .bind(params.ip_address)
            .bind(params.expires_at)
            .bind(params.now)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }
        None => {
            sqlx::query(
                "INSERT INTO refresh_tokens (
                    id, user_id, token, user_agent, ip_address, expires_at, created_at, updated_at
                ) VALUES ($1,$2,$3,$4,$5,$6,$7,$7)",
            )
            .bind(Uuid::new_v4())
            .bind(params.user_id)
            .bind(params.token)
            .bind(params.user_agent)
            .bind(params.ip_address)
            .bind(params.expires_at)
            .bind(params.now)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await
}

pub(crate) struct RotateRefreshToken<'a> {
    pub(crate) id: Uuid,
    pub(crate) current: &'a str,
    pub(crate) next: &'a str,
    pub(crate) ip_address: Option<&'a str>,
    pub(crate) expires_at: PrimitiveDateTime,
    pub(crate) now: PrimitiveDateTime,
}

/// Swaps `current` for `next` only while `current` is still the live token of the row. Returns
/// false when another rotation or a revoke got there first.
pub(crate) async fn rotate(
    pool: &PgPool,
    params: RotateRefreshToken<'_>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE refresh_tokens
         SET token = $1, ip_address = $2, expires_at = $3, updated_at = $4
         WHERE id = $5 AND token = $6 AND revoked_at IS NULL",
    )
    .bind(params.next)
    .bind(params.ip_address)
    .bind(params.expires_at)
    .bind(params.now)
    .bind(params.id)
    .bind(params.current)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn revoke(pool: &PgPool, id: Uuid, now: PrimitiveDateTime) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE refresh_tokens SET revoked_at = $1, updated_at = $1 WHERE id = $2")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub(crate) async fn revoke_for_user(
    pool: &PgPool,
    user_id: Uuid,
    token: &str,
    now: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE refresh_tokens SET revoked_at = $1, updated_at = $1
         WHERE user_id = $2 AND token = $3 AND revoked_at IS NULL",
    )
    .bind(now)
    .bind(user_id)
    .bind(token)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Removes tokens that were revoked or expired longer than `grace` ago.
pub(crate) async fn purge_stale(
    pool: &PgPool,
    now: PrimitiveDateTime,
    grace: Duration,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM refresh_tokens WHERE revoked_at < $1 OR expires_at < $1",
    )
    .bind(now - grace)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
