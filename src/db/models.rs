use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::types::{
    BlogStatus, BlogTheme, QuestionGroupCategory, QuestionType, SectionType, TestSkill,
    TestStatus, UserRole,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: Uuid,
    pub(crate) email: String,
    pub(crate) username: String,
    /// Absent for accounts created through Google sign-in.
    pub(crate) hashed_password: Option<String>,
    pub(crate) phone_number: Option<String>,
    pub(crate) avatar: Option<String>,
    pub(crate) role: UserRole,
    pub(crate) is_email_verified: bool,
    pub(crate) last_login_at: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Pending registration waiting for its OTP.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct TempUser {
    pub(crate) id: Uuid,
    pub(crate) email: String,
    pub(crate) username: String,
    pub(crate) hashed_password: String,
    pub(crate) otp_code: String,
    pub(crate) otp_expires_at: PrimitiveDateTime,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct RefreshToken {
    pub(crate) id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) token: String,
    pub(crate) user_agent: String,
    pub(crate) ip_address: Option<String>,
    pub(crate) expires_at: PrimitiveDateTime,
    pub(crate) revoked_at: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct IeltsTest {
    pub(crate) id: Uuid,
    pub(crate) test_name: String,
    pub(crate) slug: String,
    pub(crate) skill: TestSkill,
    pub(crate) duration: i32,
    pub(crate) display_order: Option<i32>,
    pub(crate) status: TestStatus,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
    pub(crate) deleted_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Section {
    pub(crate) id: Uuid,
    pub(crate) test_id: Uuid,
    pub(crate) section_type: SectionType,
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) audio: Option<String>,
    pub(crate) position: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct QuestionGroup {
    pub(crate) id: Uuid,
    pub(crate) section_id: Uuid,
    /// Joined from the owning section.
    pub(crate) section_type: SectionType,
    pub(crate) instruction: String,
    pub(crate) question_type: QuestionType,
    pub(crate) position: i32,
    pub(crate) category: Option<QuestionGroupCategory>,
    pub(crate) image: Option<String>,
    pub(crate) content: Option<Json<Value>>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: Uuid,
    pub(crate) group_id: Uuid,
    pub(crate) title: String,
    pub(crate) content: Json<Value>,
    pub(crate) image: Option<String>,
    pub(crate) position: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct AnswerKey {
    pub(crate) id: Uuid,
    pub(crate) question_id: Uuid,
    pub(crate) test_id: Uuid,
    pub(crate) answers: Json<Value>,
    pub(crate) clarification: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Answer key joined with the type of the group its question belongs to.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct GradingKey {
    pub(crate) question_id: Uuid,
    pub(crate) question_type: QuestionType,
    pub(crate) answers: Json<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct IeltsTestResult {
    pub(crate) id: Uuid,
    pub(crate) test_id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) correct_answers: i32,
    pub(crate) total_questions: i32,
    pub(crate) score: f64,
    pub(crate) submission: Json<Value>,
    pub(crate) detail_analysis: Json<Value>,
    pub(crate) time_spent: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Blog {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) content: String,
    pub(crate) status: BlogStatus,
    pub(crate) theme: BlogTheme,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}
