use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::TempUser;

const COLUMNS: &str =
    "id, email, username, hashed_password, otp_code, otp_expires_at, created_at";

pub(crate) async fn find_by_email(
    executor: impl sqlx::PgExecutor<'_>,
    email: &str,
) -> Result<Option<TempUser>, sqlx::Error> {
    sqlx::query_as::<_, TempUser>(&format!("SELECT {COLUMNS} FROM temp_users WHERE email = $1"))
        .bind(email)
        .fetch_optional(executor)
        .await
}

pub(crate) struct CreateTempUser<'a> {
    pub(crate) email: &'a str,
    pub(crate) username: &'a str,
    pub(crate) hashed_password: &'a str,
    pub(crate) otp_code: &'a str,
    pub(crate) otp_expires_at: PrimitiveDateTime,
    pub(crate) now: PrimitiveDateTime,
}

/// Replaces any pending registration for the same email.
pub(crate) async fn replace(pool: &PgPool, params: CreateTempUser<'_>) -> Result<TempUser, sqlx::Error> {
    let mut tx = pool.begin().await?;

    delete_by_email(&mut *tx, params.email).await?;

    let temp_user = sqlx::query_as::<_, TempUser>(&format!(
        "INSERT INTO temp_users (
            id, email, username, hashed_password, otp_code, otp_expires_at, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)
        RETURNING {COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(params.email)
    .bind(params.username)
    .bind(params.hashed_password)
    .bind(params.otp_code)
    .bind(params.otp_expires_at)
    .bind(params.now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(temp_user)
}

pub(crate) async fn delete_by_email(
    executor: impl sqlx::PgExecutor<'_>,
    email: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM temp_users WHERE email = $1")
        .bind(email)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete_expired(pool: &PgPool, now: PrimitiveDateTime) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM temp_users WHERE otp_expires_at <= $1")
        .bind(now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
