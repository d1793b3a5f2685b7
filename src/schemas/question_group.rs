use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::QuestionGroup;
use crate::db::types::{QuestionGroupCategory, QuestionType, SectionType};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CreateQuestionGroupRequest {
    #[serde(alias = "sectionId")]
    pub(crate) section_id: Uuid,
    #[serde(alias = "sectionType")]
    pub(crate) section_type: SectionType,
    #[serde(rename = "type")]
    pub(crate) question_type: QuestionType,
    #[validate(range(min = 1, message = "Order must be positive"))]
    pub(crate) order: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct UpdateQuestionGroupRequest {
    pub(crate) id: Uuid,
    #[serde(default)]
    pub(crate) instruction: String,
    #[serde(rename = "type")]
    pub(crate) question_type: QuestionType,
    #[validate(range(min = 1, message = "Order must be positive"))]
    pub(crate) order: i32,
    #[serde(default)]
    pub(crate) category: Option<QuestionGroupCategory>,
    #[serde(default)]
    pub(crate) content: Option<Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionGroupResponse {
    pub(crate) id: Uuid,
    pub(crate) section_id: Uuid,
    pub(crate) section_type: SectionType,
    pub(crate) instruction: String,
    #[serde(rename = "type")]
    pub(crate) question_type: QuestionType,
    pub(crate) order: i32,
    pub(crate) category: Option<QuestionGroupCategory>,
    pub(crate) image: Option<String>,
    pub(crate) content: Option<Value>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl QuestionGroupResponse {
    pub(crate) fn from_db(group: QuestionGroup) -> Self {
        Self {
            id: group.id,
            section_id: group.section_id,
            section_type: group.section_type,
            instruction: group.instruction,
            question_type: group.question_type,
            order: group.position,
            category: group.category,
            image: group.image,
            content: group.content.map(|content| content.0),
            created_at: format_primitive(group.created_at),
            updated_at: format_primitive(group.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GroupImageResponse {
    pub(crate) image_url: String,
}
