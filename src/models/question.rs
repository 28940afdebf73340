// src/models/question.rs

use serde::{Deserialize, Serialize};

/// Minimum number of options a question may hold.
pub const MIN_OPTIONS: usize = 2;
/// Maximum number of options a question may hold.
pub const MAX_OPTIONS: usize = 6;

/// One multiple-choice question inside a quiz.
///
/// Stored as a JSON object in the quiz's `questions` column. The wire
/// field `correctOption` is a 0-based index into `options`; answers are
/// matched against the option's literal text, not its index (see the
/// scoring engine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// The text content of the question.
    pub text: String,

    /// Ordered list of options (e.g., ["Option A", "Option B"]).
    pub options: Vec<String>,

    /// 0-based index of the correct option.
    #[serde(rename = "correctOption")]
    pub correct_option: usize,
}

impl Question {
    /// A blank question as the authoring workflow starts it: two empty
    /// options with the first marked correct.
    pub fn draft() -> Self {
        Self {
            text: String::new(),
            options: vec![String::new(), String::new()],
            correct_option: 0,
        }
    }

    /// The literal text of the correct option, if the index is in range.
    pub fn correct_answer(&self) -> Option<&str> {
        self.options.get(self.correct_option).map(String::as_str)
    }
}

/// The ordered question list a quiz draft is built from.
///
/// All mutations keep two invariants: every question holds between
/// `MIN_OPTIONS` and `MAX_OPTIONS` options, and `correct_option` stays a
/// valid index. Operations that would break them are rejected and leave
/// the set unchanged; the caller gets `false` back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn into_questions(self) -> Vec<Question> {
        self.questions
    }

    /// Appends a blank question (two empty options, first one correct).
    pub fn add_question(&mut self) {
        self.questions.push(Question::draft());
    }

    /// Appends an empty option to the question at `question_index`.
    /// Rejected when the question already holds `MAX_OPTIONS` options.
    pub fn add_option(&mut self, question_index: usize) -> bool {
        let Some(q) = self.questions.get_mut(question_index) else {
            return false;
        };
        if q.options.len() >= MAX_OPTIONS {
            return false;
        }
        q.options.push(String::new());
        true
    }

    /// Removes the option at `option_index` from the question at
    /// `question_index`. Rejected when the question is already at
    /// `MIN_OPTIONS`. When the removed option sits at or before the
    /// correct one, `correct_option` shifts down so it keeps pointing at
    /// the same logical answer, or the first option if the answer itself
    /// was removed.
    pub fn remove_option(&mut self, question_index: usize, option_index: usize) -> bool {
        let Some(q) = self.questions.get_mut(question_index) else {
            return false;
        };
        if q.options.len() <= MIN_OPTIONS || option_index >= q.options.len() {
            return false;
        }
        q.options.remove(option_index);
        if q.correct_option >= option_index {
            q.correct_option = q.correct_option.saturating_sub(1);
        }
        true
    }

    /// Marks the option at `option_index` as the correct answer.
    pub fn set_correct_option(&mut self, question_index: usize, option_index: usize) -> bool {
        let Some(q) = self.questions.get_mut(question_index) else {
            return false;
        };
        if option_index >= q.options.len() {
            return false;
        }
        q.correct_option = option_index;
        true
    }
}

impl From<Vec<Question>> for QuestionSet {
    fn from(questions: Vec<Question>) -> Self {
        Self { questions }
    }
}
