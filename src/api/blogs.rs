use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStaff;
use crate::api::response::{ApiResponse, Created};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::blog::{BlogResponse, CreateBlogRequest, UpdateBlogRequest};

const BLOG_NOT_FOUND: &str = "Blog not found";
const NAME_TAKEN: &str = "Blog name already exists";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_blogs).post(create_blog))
        .route("/name/:name", get(get_blog_by_name))
        .route("/:id", get(get_blog).put(update_blog).delete(delete_blog))
}

async fn list_blogs(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<BlogResponse>>, ApiError> {
    let blogs = repositories::blogs::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list blogs"))?;

    Ok(ApiResponse::ok(
        "Blogs retrieved successfully",
        blogs.into_iter().map(BlogResponse::from_db).collect(),
    ))
}

async fn get_blog(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<ApiResponse<BlogResponse>, ApiError> {
    let blog = repositories::blogs::find_by_id(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load blog"))?
        .ok_or_else(|| ApiError::NotFound(BLOG_NOT_FOUND.to_string()))?;

    Ok(ApiResponse::ok("Blog retrieved successfully", BlogResponse::from_db(blog)))
}

async fn get_blog_by_name(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<ApiResponse<BlogResponse>, ApiError> {
    let blog = repositories::blogs::find_by_name(state.db(), &name)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load blog"))?
        .ok_or_else(|| ApiError::NotFound(BLOG_NOT_FOUND.to_string()))?;

    Ok(ApiResponse::ok("Blog retrieved successfully", BlogResponse::from_db(blog)))
}

async fn create_blog(
    CurrentStaff(user): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<CreateBlogRequest>,
) -> Result<Created<BlogResponse>, ApiError> {
    validate_payload(&payload)?;

    let blog = repositories::blogs::create(
        state.db(),
        repositories::blogs::CreateBlog {
            name: payload.name.trim(),
            content: &payload.content,
            status: payload.status,
            theme: payload.theme,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_write(e, NAME_TAKEN, "Failed to create blog"))?;

    tracing::info!(user_id = %user.id, action = "blog_create", blog_id = %blog.id, "Blog created");
    Ok(ApiResponse::created("Blog created successfully", BlogResponse::from_db(blog)))
}

async fn update_blog(
    Path(id): Path<Uuid>,
    CurrentStaff(user): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<UpdateBlogRequest>,
) -> Result<ApiResponse<BlogResponse>, ApiError> {
    validate_payload(&payload)?;

    let blog = repositories::blogs::update(
        state.db(),
        id,
        repositories::blogs::UpdateBlog {
            name: payload.name.as_deref().map(str::trim),
            content: payload.content.as_deref(),
            status: payload.status,
            theme: payload.theme,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_write(e, NAME_TAKEN, "Failed to update blog"))?
    .ok_or_else(|| ApiError::NotFound(BLOG_NOT_FOUND.to_string()))?;

    tracing::info!(user_id = %user.id, action = "blog_update", blog_id = %blog.id, "Blog updated");
    Ok(ApiResponse::ok("Blog updated successfully", BlogResponse::from_db(blog)))
}

async fn delete_blog(
    Path(id): Path<Uuid>,
    CurrentStaff(user): CurrentStaff,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::blogs::delete(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete blog"))?;
    if !deleted {
        return Err(ApiError::NotFound(BLOG_NOT_FOUND.to_string()));
    }

    tracing::info!(user_id = %user.id, action = "blog_delete", blog_id = %id, "Blog deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests;
