/// Plain-text question import.
///
/// Blocks are separated by a line of three or more dashes. Each block reads:
///
/// ```text
/// PERGUNTA: Quanto é 2+2?
/// A) 3
/// B) 4
/// C) 5
/// D) 6
/// CORRETA: B
/// EXPLICACAO: Soma simples.
/// ```
///
/// Blocks missing the question text, option A, option B or the correct letter
/// are skipped without error.

use crate::models::{OptionLetter, Question, QuestionOptions};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BLOCK_SEPARATOR: Regex = Regex::new(r"\n-{3,}\n").expect("block separator pattern");
    static ref QUESTION_TEXT: Regex = Regex::new(r"(?i)PERGUNTA:\s*(.+)").expect("question pattern");
    static ref CORRECT_OPTION: Regex = Regex::new(r"(?i)CORRETA:\s*([ABCD])").expect("correct option pattern");
    static ref EXPLANATION: Regex = Regex::new(r"(?is)EXPLICACAO:\s*(.+)").expect("explanation pattern");
    static ref OPTION_LINES: [(OptionLetter, Regex); 4] = OptionLetter::ALL.map(|letter| {
        let pattern = format!(r"(?i)\n{}\)\s*(.+)", letter.as_str());
        (letter, Regex::new(&pattern).expect("option pattern"))
    });
}

/// A well-formed block, ready to become a question
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuestion {
    pub text: String,
    pub options: QuestionOptions,
    pub correct_option: OptionLetter,
    pub explanation: Option<String>,
}

impl ParsedQuestion {
    pub fn into_question(self, quiz_id: &str) -> Question {
        let mut question =
            Question::multiple_choice(quiz_id, &self.text, self.options, self.correct_option);
        question.explanation = self.explanation;
        question
    }
}

/// Parse every well-formed block in `text`, in order
pub fn parse_questions(text: &str) -> Vec<ParsedQuestion> {
    let normalized = text.replace("\r\n", "\n");
    BLOCK_SEPARATOR
        .split(&normalized)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .filter_map(parse_block)
        .collect()
}

fn capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_block(block: &str) -> Option<ParsedQuestion> {
    let text = capture(&QUESTION_TEXT, block)?;

    let mut options = QuestionOptions::default();
    for (letter, re) in OPTION_LINES.iter() {
        if let Some(option_text) = capture(re, block) {
            options.set(*letter, option_text);
        }
    }
    if options.a.is_empty() || options.b.is_empty() {
        log::debug!("Skipping block without options A and B: {}", text);
        return None;
    }

    let correct_option = CORRECT_OPTION
        .captures(block)
        .and_then(|caps| caps.get(1))
        .and_then(|m| OptionLetter::parse(&m.as_str().to_uppercase()));
    let Some(correct_option) = correct_option else {
        log::debug!("Skipping block without correct option: {}", text);
        return None;
    };

    Some(ParsedQuestion {
        text,
        options,
        correct_option,
        explanation: capture(&EXPLANATION, block),
    })
}
