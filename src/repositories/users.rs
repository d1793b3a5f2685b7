use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::User;
use crate::db::types::UserRole;

const COLUMNS: &str = "\
    id, email, username, hashed_password, phone_number, avatar, role, \
    is_email_verified, last_login_at, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_email(
    executor: impl sqlx::PgExecutor<'_>,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await
}

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users ORDER BY created_at DESC"))
        .fetch_all(pool)
        .await
}

pub(crate) struct CreateUser<'a> {
    pub(crate) email: &'a str,
    pub(crate) username: &'a str,
    pub(crate) hashed_password: Option<&'a str>,
    pub(crate) avatar: Option<&'a str>,
    pub(crate) role: UserRole,
    pub(crate) is_email_verified: bool,
    pub(crate) last_login_at: Option<PrimitiveDateTime>,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateUser<'_>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (
            id, email, username, hashed_password, avatar, role,
            is_email_verified, last_login_at, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$9)
        RETURNING {COLUMNS}",
    ))
    .bind(Uuid::new_v4())
    .bind(params.email)
    .bind(params.username)
    .bind(params.hashed_password)
    .bind(params.avatar)
    .bind(params.role)
    .bind(params.is_email_verified)
    .bind(params.last_login_at)
    .bind(params.now)
    .fetch_one(executor)
    .await
}

pub(crate) async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    username: Option<&str>,
    phone_number: Option<&str>,
    now: PrimitiveDateTime,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET
            username = COALESCE($1, username),
            phone_number = COALESCE($2, phone_number),
            updated_at = $3
         WHERE id = $4
         RETURNING {COLUMNS}"
    ))
    .bind(username)
    .bind(phone_number)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn set_avatar(
    pool: &PgPool,
    id: Uuid,
    avatar: &str,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET avatar = $1, updated_at = $2 WHERE id = $3")
        .bind(avatar)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub(crate) async fn set_role(
    pool: &PgPool,
    id: Uuid,
    role: UserRole,
    now: PrimitiveDateTime,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET role = $1, updated_at = $2 WHERE id = $3 RETURNING {COLUMNS}"
    ))
    .bind(role)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn touch_last_login(
    executor: impl sqlx::PgExecutor<'_>,
    id: Uuid,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_login_at = $1, updated_at = $1 WHERE id = $2")
        .bind(now)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Forces the account into a verified administrator with the given password hash.
pub(crate) async fn promote_admin(
    pool: &PgPool,
    id: Uuid,
    hashed_password: &str,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE users
         SET hashed_password = $1, role = $2, is_email_verified = TRUE, updated_at = $3
         WHERE id = $4",
    )
    .bind(hashed_password)
    .bind(UserRole::Admin)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}
