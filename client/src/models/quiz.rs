/// Quiz and question models.

use super::{Collection, Entity, Mutable};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Math,
    Chem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub created_by: String,
    pub grade: String,
    pub subject: Subject,
    #[serde(default)]
    pub created_at: String,
}

impl Quiz {
    pub fn new(title: &str, description: &str, created_by: &str, grade: &str, subject: Subject) -> Self {
        Quiz {
            id: String::new(),
            title: title.to_string(),
            description: description.to_string(),
            created_by: created_by.to_string(),
            grade: grade.to_string(),
            subject,
            created_at: String::new(),
        }
    }
}

impl Entity for Quiz {
    const COLLECTION: Collection = Collection::Quizzes;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn on_create(&mut self, now: &str) {
        self.created_at = now.to_string();
    }
}

impl Mutable for Quiz {}

/// Multiple choice or free-text answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    #[default]
    Alternativas,
    Discursiva,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum OptionLetter {
    #[default]
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub const ALL: [OptionLetter; 4] = [OptionLetter::A, OptionLetter::B, OptionLetter::C, OptionLetter::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionLetter::A => "A",
            OptionLetter::B => "B",
            OptionLetter::C => "C",
            OptionLetter::D => "D",
        }
    }

    /// Case-insensitive parse of a single letter
    pub fn parse(s: &str) -> Option<OptionLetter> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Some(OptionLetter::A),
            "B" => Some(OptionLetter::B),
            "C" => Some(OptionLetter::C),
            "D" => Some(OptionLetter::D),
            _ => None,
        }
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuestionOptions {
    #[serde(rename = "A", default)]
    pub a: String,
    #[serde(rename = "B", default)]
    pub b: String,
    #[serde(rename = "C", default)]
    pub c: String,
    #[serde(rename = "D", default)]
    pub d: String,
}

impl QuestionOptions {
    pub fn get(&self, letter: OptionLetter) -> &str {
        match letter {
            OptionLetter::A => &self.a,
            OptionLetter::B => &self.b,
            OptionLetter::C => &self.c,
            OptionLetter::D => &self.d,
        }
    }

    pub fn set(&mut self, letter: OptionLetter, text: String) {
        match letter {
            OptionLetter::A => self.a = text,
            OptionLetter::B => self.b = text,
            OptionLetter::C => self.c = text,
            OptionLetter::D => self.d = text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub quiz_id: String,
    #[serde(rename = "type", default)]
    pub question_type: QuestionType,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich_text: Option<String>,
    #[serde(default)]
    pub options: QuestionOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich_options: Option<QuestionOptions>,
    #[serde(default)]
    pub correct_option: OptionLetter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Image embedded as a data URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Question {
    pub fn multiple_choice(
        quiz_id: &str,
        text: &str,
        options: QuestionOptions,
        correct_option: OptionLetter,
    ) -> Self {
        Question {
            id: String::new(),
            quiz_id: quiz_id.to_string(),
            question_type: QuestionType::Alternativas,
            text: text.to_string(),
            rich_text: None,
            options,
            rich_options: None,
            correct_option,
            explanation: None,
            image_url: None,
            tags: Vec::new(),
        }
    }

    pub fn is_correct(&self, chosen: &str) -> bool {
        self.question_type == QuestionType::Alternativas && chosen == self.correct_option.as_str()
    }
}

impl Entity for Question {
    const COLLECTION: Collection = Collection::Questions;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Mutable for Question {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_options() -> QuestionOptions {
        QuestionOptions {
            a: "3".to_string(),
            b: "4".to_string(),
            c: "5".to_string(),
            d: "6".to_string(),
        }
    }

    #[test]
    fn test_option_letter_parse() {
        assert_eq!(OptionLetter::parse("b"), Some(OptionLetter::B));
        assert_eq!(OptionLetter::parse(" D "), Some(OptionLetter::D));
        assert_eq!(OptionLetter::parse("E"), None);
    }

    #[test]
    fn test_question_wire_format() {
        let mut question = Question::multiple_choice("quiz-1", "Quanto é 2+2?", sample_options(), OptionLetter::B);
        question.id = "q1".to_string();

        let json = serde_json::to_value(&question).unwrap();
        assert_eq!(json["quizId"], "quiz-1");
        assert_eq!(json["type"], "alternativas");
        assert_eq!(json["correctOption"], "B");
        assert_eq!(json["options"]["A"], "3");
        assert!(json.get("imageUrl").is_none());
    }

    #[test]
    fn test_question_defaults_for_legacy_rows() {
        let json = r#"{"id":"q1","quizId":"z","text":"T","options":{"A":"x","B":"y"},"correctOption":"A"}"#;
        let question: Question = serde_json::from_str(json).unwrap();

        assert_eq!(question.question_type, QuestionType::Alternativas);
        assert_eq!(question.options.get(OptionLetter::C), "");
        assert!(question.tags.is_empty());
    }

    #[test]
    fn test_is_correct() {
        let question = Question::multiple_choice("z", "T", sample_options(), OptionLetter::B);
        assert!(question.is_correct("B"));
        assert!(!question.is_correct("A"));
        assert!(!question.is_correct(""));
    }

    #[test]
    fn test_quiz_subject_serialization() {
        let quiz = Quiz::new("Frações", "Lista 1", "teacher-1", "6EF", Subject::Math);
        let json = serde_json::to_value(&quiz).unwrap();
        assert_eq!(json["subject"], "math");
        assert_eq!(json["createdBy"], "teacher-1");
    }
}
