/// Quiz sessions: the live attempt and the scored result it turns into.

use super::{Collection, Entity, Mutable, Question};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An in-progress quiz session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub id: String,
    pub user_id: String,
    pub quiz_id: String,
    pub started_at: String,
    #[serde(default)]
    pub last_index: usize,
    /// questionId -> chosen option
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
}

impl Attempt {
    pub fn new(user_id: &str, quiz_id: &str) -> Self {
        Attempt {
            id: String::new(),
            user_id: user_id.to_string(),
            quiz_id: quiz_id.to_string(),
            started_at: String::new(),
            last_index: 0,
            answers: BTreeMap::new(),
        }
    }
}

impl Entity for Attempt {
    const COLLECTION: Collection = Collection::Attempts;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn on_create(&mut self, now: &str) {
        if self.started_at.is_empty() {
            self.started_at = now.to_string();
        }
    }
}

impl Mutable for Attempt {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDetail {
    pub question_id: String,
    pub chosen: String,
    pub is_correct: bool,
}

/// Scored outcome of a completed session. Immutable once saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: String,
    pub user_id: String,
    pub quiz_id: String,
    pub score: u32,
    pub total: u32,
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub details: Vec<AnswerDetail>,
}

impl QuizResult {
    /// Score `answers` against every question of the quiz.
    /// Unanswered questions count as wrong with an empty choice.
    pub fn grade(
        user_id: &str,
        quiz_id: &str,
        questions: &[Question],
        answers: &BTreeMap<String, String>,
    ) -> Self {
        let details: Vec<AnswerDetail> = questions
            .iter()
            .map(|question| {
                let chosen = answers.get(&question.id).cloned().unwrap_or_default();
                AnswerDetail {
                    question_id: question.id.clone(),
                    is_correct: question.is_correct(&chosen),
                    chosen,
                }
            })
            .collect();

        QuizResult {
            id: String::new(),
            user_id: user_id.to_string(),
            quiz_id: quiz_id.to_string(),
            score: details.iter().filter(|d| d.is_correct).count() as u32,
            total: questions.len() as u32,
            date: String::new(),
            duration_sec: None,
            started_at: None,
            finished_at: None,
            details,
        }
    }

    /// Grade a finished attempt, carrying over its start time
    pub fn from_attempt(attempt: &Attempt, questions: &[Question], finished_at: &str) -> Self {
        let mut result = Self::grade(&attempt.user_id, &attempt.quiz_id, questions, &attempt.answers);
        result.started_at = Some(attempt.started_at.clone());
        result.finished_at = Some(finished_at.to_string());

        if let (Ok(start), Ok(end)) = (
            chrono::DateTime::parse_from_rfc3339(&attempt.started_at),
            chrono::DateTime::parse_from_rfc3339(finished_at),
        ) {
            result.duration_sec = u64::try_from((end - start).num_seconds()).ok();
        }

        result
    }
}

impl Entity for QuizResult {
    const COLLECTION: Collection = Collection::Results;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn on_create(&mut self, now: &str) {
        self.date = now.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OptionLetter, QuestionOptions};

    fn question(id: &str, correct: OptionLetter) -> Question {
        let mut q = Question::multiple_choice("quiz", id, QuestionOptions::default(), correct);
        q.id = id.to_string();
        q
    }

    #[test]
    fn test_grade_counts_correct_answers() {
        let questions = vec![
            question("q1", OptionLetter::A),
            question("q2", OptionLetter::B),
            question("q3", OptionLetter::C),
        ];
        let mut answers = BTreeMap::new();
        answers.insert("q1".to_string(), "A".to_string());
        answers.insert("q2".to_string(), "C".to_string());

        let result = QuizResult::grade("u1", "quiz", &questions, &answers);

        assert_eq!(result.score, 1);
        assert_eq!(result.total, 3);
        assert_eq!(result.details.len(), 3);
        assert_eq!(result.details[2].chosen, "");
        assert!(!result.details[2].is_correct);
    }

    #[test]
    fn test_from_attempt_computes_duration() {
        let mut attempt = Attempt::new("u1", "quiz");
        attempt.started_at = "2026-03-02T14:00:00.000Z".to_string();
        attempt.answers.insert("q1".to_string(), "A".to_string());

        let result = QuizResult::from_attempt(
            &attempt,
            &[question("q1", OptionLetter::A)],
            "2026-03-02T14:05:30.000Z",
        );

        assert_eq!(result.score, 1);
        assert_eq!(result.duration_sec, Some(330));
        assert_eq!(result.started_at.as_deref(), Some("2026-03-02T14:00:00.000Z"));
    }

    #[test]
    fn test_attempt_wire_format() {
        let mut attempt = Attempt::new("u1", "quiz");
        attempt.answers.insert("q1".to_string(), "D".to_string());
        attempt.last_index = 1;

        let json = serde_json::to_value(&attempt).unwrap();
        assert_eq!(json["lastIndex"], 1);
        assert_eq!(json["answers"]["q1"], "D");
        assert_eq!(json["userId"], "u1");
    }
}
