use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::Blog;
use crate::db::types::{BlogStatus, BlogTheme};

const COLUMNS: &str = "id, name, content, status, theme, created_at, updated_at";

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<Blog>, sqlx::Error> {
    sqlx::query_as::<_, Blog>(&format!("SELECT {COLUMNS} FROM blogs ORDER BY created_at DESC"))
        .fetch_all(pool)
        .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Blog>, sqlx::Error> {
    sqlx::query_as::<_, Blog>(&format!("SELECT {COLUMNS} FROM blogs WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Blog>, sqlx::Error> {
    sqlx::query_as::<_, Blog>(&format!("SELECT {COLUMNS} FROM blogs WHERE name = $1"))
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateBlog<'a> {
    pub(crate) name: &'a str,
    pub(crate) content: &'a str,
    pub(crate) status: BlogStatus,
    pub(crate) theme: BlogTheme,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateBlog<'_>) -> Result<Blog, sqlx::Error> {
    sqlx::query_as::<_, Blog>(&format!(
        "INSERT INTO blogs (id, name, content, status, theme, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$6)
         RETURNING {COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(params.name)
    .bind(params.content)
    .bind(params.status)
    .bind(params.theme)
    .bind(params.now)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateBlog<'a> {
    pub(crate) name: Option<&'a str>,
    pub(crate) content: Option<&'a str>,
    pub(crate) status: Option<BlogStatus>,
    pub(crate) theme: Option<BlogTheme>,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: Uuid,
    params: UpdateBlog<'_>,
) -> Result<Option<Blog>, sqlx::Error> {
    sqlx::query_as::<_, Blog>(&format!(
        "UPDATE blogs SET
            name = COALESCE($1, name),
            content = COALESCE($2, content),
            status = COALESCE($3, status),
            theme = COALESCE($4, theme),
            updated_at = $5
         WHERE id = $6
         RETURNING {COLUMNS}"
    ))
    .bind(params.name)
    .bind(params.content)
    .bind(params.status)
    .bind(params.theme)
    .bind(params.now)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM blogs WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
