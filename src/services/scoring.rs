use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::db::models::GradingKey;

#[derive(Debug, Error)]
pub(crate) enum ScoringError {
    #[error("No answer keys found for test ID: {0}")]
    NoAnswerKeys(Uuid),
    #[error("Submission must be a non-empty array")]
    EmptySubmission,
    #[error("Invalid answer key: {0}")]
    InvalidAnswerKey(String),
}

/// Stored answer key layout: one entry per answer group of the question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnswerGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) answer_group_id: Option<Value>,
    pub(crate) answers: Vec<AcceptedAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AcceptedAnswer {
    pub(crate) part_index: i32,
    pub(crate) answer_text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) alternatives: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SubmittedQuestion {
    #[serde(alias = "questionId")]
    pub(crate) question_id: Uuid,
    #[serde(default)]
    pub(crate) answers: Vec<SubmittedAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SubmittedAnswer {
    #[serde(alias = "partIndex")]
    pub(crate) part_index: i32,
    #[serde(alias = "answerText")]
    pub(crate) answer_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScoreOutcome {
    pub(crate) correct: i32,
    pub(crate) total: i32,
    pub(crate) score: f64,
}

impl ScoreOutcome {
    pub(crate) fn detail_analysis(&self) -> Value {
        json!({ "correctCount": self.correct, "totalQuestions": self.total })
    }
}

/// Parses and checks a stored or incoming answer key.
pub(crate) fn parse_answer_key(value: &Value) -> Result<Vec<AnswerGroup>, ScoringError> {
    let groups: Vec<AnswerGroup> = serde_json::from_value(value.clone())
        .map_err(|err| ScoringError::InvalidAnswerKey(err.to_string()))?;

    if groups.is_empty() {
        return Err(ScoringError::InvalidAnswerKey("at least one answer group is required".into()));
    }
    if groups.iter().any(|group| group.answers.is_empty()) {
        return Err(ScoringError::InvalidAnswerKey("answer groups must not be empty".into()));
    }

    Ok(groups)
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

struct ParsedKey {
    question_type_graded: bool,
    accepted: HashMap<i32, HashSet<String>>,
}

/// Grades a submission against the test's answer keys.
///
/// The denominator counts every expected answer of every key, whether or not the question was
/// answered. Only auto-graded question types can earn credit, and each `(question, part)` pair
/// is credited at most once so the score stays within 0..=100.
pub(crate) fn score_submission(
    test_id: Uuid,
    keys: &[GradingKey],
    submission: &[SubmittedQuestion],
) -> Result<ScoreOutcome, ScoringError> {
    if keys.is_empty() {
        return Err(ScoringError::NoAnswerKeys(test_id));
    }
    if submission.is_empty() {
        return Err(ScoringError::EmptySubmission);
    }

    let mut total = 0i32;
    let mut parsed: HashMap<Uuid, ParsedKey> = HashMap::with_capacity(keys.len());

    for key in keys {
        let groups = match parse_answer_key(&key.answers.0) {
            Ok(groups) => groups,
            Err(err) => {
                tracing::warn!(
                    question_id = %key.question_id,
                    error = %err,
                    "Skipping malformed answer key"
                );
                continue;
            }
        };

        let mut accepted: HashMap<i32, HashSet<String>> = HashMap::new();
        for group in groups {
            for answer in group.answers {
                total += 1;
                let entry = accepted.entry(answer.part_index).or_default();
                entry.insert(normalize(&answer.answer_text));
                entry.extend(answer.alternatives.iter().map(|alt| normalize(alt)));
            }
        }

        parsed.insert(
            key.question_id,
            ParsedKey { question_type_graded: key.question_type.is_auto_graded(), accepted },
        );
    }

    let mut credited: HashSet<(Uuid, i32)> = HashSet::new();
    for question in submission {
        let Some(key) = parsed.get(&question.question_id) else {
            continue;
        };
        if !key.question_type_graded {
            continue;
        }

        for answer in &question.answers {
            let is_correct = key
                .accepted
                .get(&answer.part_index)
                .is_some_and(|accepted| accepted.contains(&normalize(&answer.answer_text)));
            if is_correct {
                credited.insert((question.question_id, answer.part_index));
            }
        }
    }

    let correct = i32::try_from(credited.len()).unwrap_or(i32::MAX).min(total);
    let score = if total > 0 {
        f64::from(correct) / f64::from(total) * 100.0
    } else {
        0.0
    };

    Ok(ScoreOutcome { correct, total, score })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::types::QuestionType;
    use sqlx::types::Json;

    fn key(question_id: Uuid, question_type: QuestionType, answers: Value) -> GradingKey {
        GradingKey { question_id, question_type, answers: Json(answers) }
    }

    fn submitted(question_id: Uuid, answers: &[(i32, &str)]) -> SubmittedQuestion {
        SubmittedQuestion {
            question_id,
            answers: answers
                .iter()
                .map(|(part_index, text)| SubmittedAnswer {
                    part_index: *part_index,
                    answer_text: text.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn scores_case_insensitive_matches_and_alternatives() {
        let q1 = Uuid::new_v4();
        let q2 = Uuid::new_v4();
        let keys = vec![
            key(
                q1,
                QuestionType::FillInTheBlank,
                json!([{
                    "answerGroupId": 1,
                    "answers": [
                        {"partIndex": 0, "answerText": "Library", "alternatives": ["the library"]},
                        {"partIndex": 1, "answerText": "Tuesday"}
                    ]
                }]),
            ),
            key(
                q2,
                QuestionType::MultipleChoice,
                json!([{"answerGroupId": 2, "answers": [{"partIndex": 0, "answerText": "B"}]}]),
            ),
        ];
        let submission = vec![
            submitted(q1, &[(0, "  THE LIBRARY "), (1, "wednesday")]),
            submitted(q2, &[(0, "b")]),
        ];

        let outcome = score_submission(Uuid::new_v4(), &keys, &submission).expect("score");
        assert_eq!(outcome.correct, 2);
        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.score, 2.0 / 3.0 * 100.0);
        assert!(outcome.score > 66.666 && outcome.score < 66.667);
        assert_eq!(outcome.detail_analysis(), json!({"correctCount": 2, "totalQuestions": 3}));
    }

    #[test]
    fn unanswered_questions_still_count_towards_total() {
        let q1 = Uuid::new_v4();
        let q2 = Uuid::new_v4();
        let keys = vec![
            key(q1, QuestionType::TickBox, json!([{"answers": [{"partIndex": 0, "answerText": "A"}]}])),
            key(q2, QuestionType::TickBox, json!([{"answers": [{"partIndex": 0, "answerText": "C"}]}])),
        ];

        let outcome =
            score_submission(Uuid::new_v4(), &keys, &[submitted(q1, &[(0, "a")])]).expect("score");
        assert_eq!((outcome.correct, outcome.total), (1, 2));
        assert_eq!(outcome.score, 50.0);
    }

    #[test]
    fn non_objective_groups_earn_no_credit() {
        let q1 = Uuid::new_v4();
        let keys = vec![key(
            q1,
            QuestionType::Matching,
            json!([{"answers": [{"partIndex": 0, "answerText": "iv"}]}]),
        )];

        let outcome =
            score_submission(Uuid::new_v4(), &keys, &[submitted(q1, &[(0, "iv")])]).expect("score");
        assert_eq!((outcome.correct, outcome.total), (0, 1));
        assert_eq!(outcome.score, 0.0);
    }

    #[test]
    fn duplicate_answers_are_credited_once() {
        let q1 = Uuid::new_v4();
        let keys = vec![key(
            q1,
            QuestionType::MultipleChoice,
            json!([{"answers": [{"partIndex": 0, "answerText": "A"}]}]),
        )];
        let submission = vec![submitted(q1, &[(0, "A"), (0, "a")]), submitted(q1, &[(0, "A")])];

        let outcome = score_submission(Uuid::new_v4(), &keys, &submission).expect("score");
        assert_eq!(outcome.correct, 1);
        assert_eq!(outcome.score, 100.0);
    }

    #[test]
    fn unknown_questions_and_malformed_keys_are_ignored() {
        let q1 = Uuid::new_v4();
        let broken = Uuid::new_v4();
        let keys = vec![
            key(q1, QuestionType::FillInTheBlank, json!([{"answers": [{"partIndex": 1, "answerText": "x"}]}])),
            key(broken, QuestionType::FillInTheBlank, json!({"unexpected": true})),
        ];
        let submission = vec![submitted(Uuid::new_v4(), &[(1, "x")]), submitted(q1, &[(2, "x")])];

        let outcome = score_submission(Uuid::new_v4(), &keys, &submission).expect("score");
        assert_eq!((outcome.correct, outcome.total), (0, 1));
    }

    #[test]
    fn rejects_missing_keys_and_empty_submissions() {
        let test_id = Uuid::new_v4();
        let err = score_submission(test_id, &[], &[submitted(Uuid::new_v4(), &[])]).unwrap_err();
        assert_eq!(err.to_string(), format!("No answer keys found for test ID: {test_id}"));

        let keys = vec![key(
            Uuid::new_v4(),
            QuestionType::TickBox,
            json!([{"answers": [{"partIndex": 0, "answerText": "A"}]}]),
        )];
        let err = score_submission(test_id, &keys, &[]).unwrap_err();
        assert!(matches!(err, ScoringError::EmptySubmission));
    }

    #[test]
    fn answer_key_validation() {
        assert!(parse_answer_key(&json!([{"answers": [{"partIndex": 0, "answerText": "A"}]}])).is_ok());
        assert!(parse_answer_key(&json!([])).is_err());
        assert!(parse_answer_key(&json!([{"answers": []}])).is_err());
        assert!(parse_answer_key(&json!([{"answers": [{"partIndex": "zero"}]}])).is_err());
    }
}
