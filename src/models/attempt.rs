// src/models/attempt.rs

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};

/// Represents the 'quiz_attempts' table in the database.
/// One row per scored submission; rows are never updated or deleted by
/// the engine, so a retake is simply another row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub quiz_id: i64,
    pub student_id: i64,
    /// Denormalized at submission time so results stay readable even if
    /// the profile changes later.
    pub student_name: String,
    pub score: i64,
    /// Question count at the time of the attempt. Captured, not
    /// recomputed, so historical attempts stay valid.
    pub total: i64,
    /// 0-based question index -> the selected option's literal text.
    pub answers: Option<Json<HashMap<usize, String>>>,
    pub attempted_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitAttemptRequest {
    pub quiz_id: i64,

    /// The student's answers, keyed by 0-based question index. Values are
    /// the selected option's displayed text, which is what the scoring
    /// engine compares against the answer key. Questions left out simply
    /// score nothing.
    #[serde(default)]
    pub answers: HashMap<usize, String>,
}

/// One row of the per-attempt breakdown in the analytics view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptSummary {
    pub student_name: String,
    pub score: i64,
    pub percentage: i64,
    pub attempted_at: chrono::DateTime<chrono::Utc>,
}

/// Aggregated view over a quiz's full attempt history. Derived on every
/// request from the attempt log; nothing here is persisted.
#[derive(Debug, Serialize)]
pub struct QuizAnalytics {
    pub quiz_id: i64,
    pub quiz_title: String,
    pub quiz_subject: String,
    pub total_attempts: i64,
    /// Distinct students, regardless of how many retakes each made.
    pub students_attempted: i64,
    /// Mean score rounded to 2 decimals; 0 when nobody attempted.
    pub average_score: f64,
    /// Question count of the quiz, the highest attainable score.
    pub max_score: i64,
    /// Attempt count per grade letter. All five letters are present,
    /// zeros included; chart views drop the empty ones.
    pub grade_distribution: BTreeMap<String, i64>,
    /// Attempt count per raw score, keys ascending.
    pub score_distribution: BTreeMap<i64, i64>,
    /// Per-attempt rows in submission order.
    pub attempts_data: Vec<AttemptSummary>,
}
