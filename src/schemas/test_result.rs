use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::core::time::format_primitive;
use crate::db::models::IeltsTestResult;
use crate::services::scoring::SubmittedQuestion;

#[derive(Debug, Deserialize)]
pub(crate) struct CreateTestResultRequest {
    #[serde(alias = "testId")]
    pub(crate) test_id: Uuid,
    #[serde(default)]
    pub(crate) submission: Vec<SubmittedQuestion>,
    #[serde(default, alias = "timeSpent")]
    pub(crate) time_spent: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreResponse {
    pub(crate) id: Uuid,
    pub(crate) correct_answers: i32,
    pub(crate) total_questions: i32,
    pub(crate) score: f64,
    pub(crate) details: Value,
}

impl ScoreResponse {
    pub(crate) fn from_db(result: IeltsTestResult) -> Self {
        Self {
            id: result.id,
            correct_answers: result.correct_answers,
            total_questions: result.total_questions,
            score: result.score,
            details: result.detail_analysis.0,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TestResultResponse {
    pub(crate) id: Uuid,
    pub(crate) test_id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) correct_answers: i32,
    pub(crate) total_questions: i32,
    pub(crate) score: f64,
    pub(crate) submission: Value,
    pub(crate) details: Value,
    pub(crate) time_spent: i32,
    pub(crate) created_at: String,
}

impl TestResultResponse {
    pub(crate) fn from_db(result: IeltsTestResult) -> Self {
        Self {
            id: result.id,
            test_id: result.test_id,
            user_id: result.user_id,
            correct_answers: result.correct_answers,
            total_questions: result.total_questions,
            score: result.score,
            submission: result.submission.0,
            details: result.detail_analysis.0,
            time_spent: result.time_spent,
            created_at: format_primitive(result.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TestResultPage {
    pub(crate) data: Vec<TestResultResponse>,
    pub(crate) total: i64,
    pub(crate) page: i64,
    pub(crate) limit: i64,
}
