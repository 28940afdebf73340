// src/models/quiz.rs

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use crate::error::AppError;
use crate::models::question::{MAX_OPTIONS, MIN_OPTIONS, Question, QuestionSet};

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,

    pub title: String,

    pub description: Option<String>,

    /// Deadline shown to students. Wire name kept from the portal contract.
    #[serde(rename = "dueDate")]
    pub due_date: chrono::DateTime<chrono::Utc>,

    /// Visibility scope: which cohort sees this quiz.
    pub branch: String,
    pub year: String,
    pub semester: String,
    pub subject: String,

    /// The authored question list, stored as a JSON array.
    pub questions: Json<QuestionSet>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Quiz {
    /// Question count, which is also the maximum attainable score.
    pub fn max_score(&self) -> i64 {
        self.questions.0.len() as i64
    }
}

/// Catalog entry for the student view: the quiz plus the viewer's own
/// attempt status, all derived from the attempt log on every fetch.
#[derive(Debug, Serialize)]
pub struct QuizWithStatus {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub has_attempted: bool,
    pub best_score: Option<i64>,
    pub total_attempts: i64,
}

/// DTO for authoring a new quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters."))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters."))]
    pub description: Option<String>,

    /// Optional on the wire so a missing or null deadline surfaces as a
    /// validation error instead of a deserialization failure.
    #[serde(rename = "dueDate")]
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,

    pub branch: String,
    pub year: String,
    pub semester: String,
    pub subject: String,

    pub questions: Vec<Question>,
}

/// Query filter for the unscoped (teacher) catalog listing.
#[derive(Debug, Deserialize)]
pub struct QuizFilter {
    pub branch: String,
    pub year: String,
    pub semester: String,
    pub subject: String,
}

/// Authoring-time validation failures. Recoverable: surfaced to the
/// author as 400, the quiz is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizValidationError {
    MissingScope,
    MissingTitle,
    MissingDueDate,
    NoQuestions,
    EmptyQuestionText(usize),
    TooFewOptions(usize),
    TooManyOptions(usize),
    DuplicateOptions(usize),
    EmptyOption(usize),
    CorrectOptionOutOfRange(usize),
}

impl fmt::Display for QuizValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingScope => write!(f, "Branch, year, semester and subject are required"),
            Self::MissingTitle => write!(f, "Title is required"),
            Self::MissingDueDate => write!(f, "Due date is required"),
            Self::NoQuestions => write!(f, "A quiz needs at least one question"),
            Self::EmptyQuestionText(i) => write!(f, "Question {} text is required", i + 1),
            Self::TooFewOptions(i) => {
                write!(f, "Question {} must have at least {} options", i + 1, MIN_OPTIONS)
            }
            Self::TooManyOptions(i) => {
                write!(f, "Question {} must have at most {} options", i + 1, MAX_OPTIONS)
            }
            Self::DuplicateOptions(i) => write!(f, "Question {} has duplicate options", i + 1),
            Self::EmptyOption(i) => write!(f, "Question {} has an empty option", i + 1),
            Self::CorrectOptionOutOfRange(i) => {
                write!(f, "Correct option index out of range for question {}", i + 1)
            }
        }
    }
}

impl From<QuizValidationError> for AppError {
    fn from(err: QuizValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Validates a quiz draft before submission, fail-fast.
///
/// Rule order: scope first, then title, then due date, then each
/// question in display order (text, option count, distinctness, blank
/// options, answer index).
pub fn validate_quiz(payload: &CreateQuizRequest) -> Result<(), QuizValidationError> {
    let scope_complete = [&payload.branch, &payload.year, &payload.semester, &payload.subject]
        .iter()
        .all(|field| !field.trim().is_empty());
    if !scope_complete {
        return Err(QuizValidationError::MissingScope);
    }

    if payload.title.trim().is_empty() {
        return Err(QuizValidationError::MissingTitle);
    }

    if payload.due_date.is_none() {
        return Err(QuizValidationError::MissingDueDate);
    }

    if payload.questions.is_empty() {
        return Err(QuizValidationError::NoQuestions);
    }

    for (i, q) in payload.questions.iter().enumerate() {
        if q.text.trim().is_empty() {
            return Err(QuizValidationError::EmptyQuestionText(i));
        }
        if q.options.len() < MIN_OPTIONS {
            return Err(QuizValidationError::TooFewOptions(i));
        }
        if q.options.len() > MAX_OPTIONS {
            return Err(QuizValidationError::TooManyOptions(i));
        }
        let distinct: HashSet<String> = q
            .options
            .iter()
            .map(|opt| opt.trim().to_lowercase())
            .collect();
        if distinct.len() != q.options.len() {
            return Err(QuizValidationError::DuplicateOptions(i));
        }
        if q.options.iter().any(|opt| opt.trim().is_empty()) {
            return Err(QuizValidationError::EmptyOption(i));
        }
        if q.correct_option >= q.options.len() {
            return Err(QuizValidationError::CorrectOptionOutOfRange(i));
        }
    }

    Ok(())
}

/// Normalizes a scope tuple the same way on both sides of the filter:
/// authored quizzes and student profiles must match byte-for-byte.
pub fn normalized_scope(branch: &str, year: &str, semester: &str) -> (String, String, String) {
    (
        branch.trim().to_uppercase(),
        year.trim().to_string(),
        semester.trim().to_string(),
    )
}
