use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

pub(crate) mod auth;
pub(crate) mod blog;
pub(crate) mod ielts_test;
pub(crate) mod question;
pub(crate) mod question_group;
pub(crate) mod section;
pub(crate) mod test_result;
pub(crate) mod upload;
pub(crate) mod user;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: String,
    pub(crate) status: String,
    pub(crate) components: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) message: String,
    pub(crate) version: String,
    pub(crate) docs_url: String,
}

/// Payload of create and delete endpoints that only echo the affected row.
#[derive(Debug, Serialize)]
pub(crate) struct IdResponse {
    pub(crate) id: Uuid,
}
