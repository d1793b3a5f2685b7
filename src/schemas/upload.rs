use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct PresignedUrlRequest {
    #[serde(alias = "fileName")]
    #[validate(length(min = 1, max = 255, message = "file_name must be 1 to 255 characters"))]
    pub(crate) file_name: String,
    #[serde(default)]
    pub(crate) folder: Option<String>,
    #[serde(default, alias = "contentType")]
    pub(crate) content_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PresignedUrlResponse {
    pub(crate) url: String,
    pub(crate) key: String,
    pub(crate) bucket_name: String,
}
