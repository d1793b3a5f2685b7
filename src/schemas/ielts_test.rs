use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::IeltsTest;
use crate::db::types::{TestSkill, TestStatus};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CreateIeltsTestRequest {
    #[serde(alias = "testName")]
    #[validate(length(min = 1, max = 255, message = "Test name must be 1 to 255 characters"))]
    pub(crate) test_name: String,
    pub(crate) skill: TestSkill,
    #[validate(range(min = 1, message = "Duration must be positive"))]
    pub(crate) duration: i32,
    #[serde(default)]
    pub(crate) order: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct UpdateIeltsTestRequest {
    #[serde(alias = "testName")]
    #[validate(length(min = 1, max = 255, message = "Test name must be 1 to 255 characters"))]
    pub(crate) test_name: String,
    #[validate(range(min = 1, message = "Duration must be positive"))]
    pub(crate) duration: i32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateStatusRequest {
    pub(crate) status: TestStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SkillFilter {
    #[serde(default)]
    pub(crate) skill: Option<TestSkill>,
}

#[derive(Debug, Serialize)]
pub(crate) struct IeltsTestResponse {
    pub(crate) id: Uuid,
    pub(crate) test_name: String,
    pub(crate) skill: TestSkill,
    pub(crate) duration: i32,
    pub(crate) order: Option<i32>,
    pub(crate) status: TestStatus,
    pub(crate) slug: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl IeltsTestResponse {
    pub(crate) fn from_db(test: IeltsTest) -> Self {
        Self {
            id: test.id,
            test_name: test.test_name,
            skill: test.skill,
            duration: test.duration,
            order: test.display_order,
            status: test.status,
            slug: test.slug,
            created_at: format_primitive(test.created_at),
            updated_at: format_primitive(test.updated_at),
        }
    }
}
