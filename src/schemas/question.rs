use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{AnswerKey, Question};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CreateQuestionRequest {
    #[serde(alias = "groupId")]
    pub(crate) group_id: Uuid,
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub(crate) title: String,
    pub(crate) content: Value,
    #[serde(default)]
    pub(crate) image: Option<String>,
    #[validate(range(min = 1, message = "Order must be positive"))]
    pub(crate) order: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct UpdateQuestionRequest {
    #[serde(default)]
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) content: Option<Value>,
    #[serde(default)]
    pub(crate) image: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, message = "Order must be positive"))]
    pub(crate) order: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: Uuid,
    pub(crate) group_id: Uuid,
    pub(crate) title: String,
    pub(crate) content: Value,
    pub(crate) image: Option<String>,
    pub(crate) order: i32,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl QuestionResponse {
    pub(crate) fn from_db(question: Question) -> Self {
        Self {
            id: question.id,
            group_id: question.group_id,
            title: question.title,
            content: question.content.0,
            image: question.image,
            order: question.position,
            created_at: format_primitive(question.created_at),
            updated_at: format_primitive(question.updated_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerKeyRequest {
    pub(crate) answers: Value,
    #[serde(default)]
    pub(crate) clarification: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerKeyResponse {
    pub(crate) id: Uuid,
    pub(crate) question_id: Uuid,
    pub(crate) test_id: Uuid,
    pub(crate) answers: Value,
    pub(crate) clarification: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl AnswerKeyResponse {
    pub(crate) fn from_db(key: AnswerKey) -> Self {
        Self {
            id: key.id,
            question_id: key.question_id,
            test_id: key.test_id,
            answers: key.answers.0,
            clarification: key.clarification,
            created_at: format_primitive(key.created_at),
            updated_at: format_primitive(key.updated_at),
        }
    }
}
