use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Blog;
use crate::db::types::{BlogStatus, BlogTheme};

const fn default_status() -> BlogStatus {
    BlogStatus::Draft
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CreateBlogRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub(crate) name: String,
    pub(crate) content: String,
    #[serde(default = "default_status")]
    pub(crate) status: BlogStatus,
    pub(crate) theme: BlogTheme,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct UpdateBlogRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) content: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<BlogStatus>,
    #[serde(default)]
    pub(crate) theme: Option<BlogTheme>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BlogResponse {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) content: String,
    pub(crate) status: BlogStatus,
    pub(crate) theme: BlogTheme,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl BlogResponse {
    pub(crate) fn from_db(blog: Blog) -> Self {
        Self {
            id: blog.id,
            name: blog.name,
            content: blog.content,
            status: blog.status,
            theme: blog.theme,
            created_at: format_primitive(blog.created_at),
            updated_at: format_primitive(blog.updated_at),
        }
    }
}
