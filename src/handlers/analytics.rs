// src/handlers/analytics.rs

use std::collections::{BTreeMap, HashSet};

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        attempt::{AttemptSummary, QuizAnalytics, QuizAttempt},
        quiz::Quiz,
    },
    utils::jwt::{Claims, require_role},
};

const GRADE_LETTERS: [&str; 5] = ["A", "B", "C", "D", "F"];

/// An attempt's percentage of the maximum score, rounded to the nearest
/// integer. Defined as 0 for a quiz with no questions so aggregation
/// stays total.
pub fn percentage_of(score: i64, max_score: i64) -> i64 {
    if max_score <= 0 {
        return 0;
    }
    ((score as f64 / max_score as f64) * 100.0).round() as i64
}

/// Grade letter for a percentage, inclusive lower bounds:
/// >=90 A, >=80 B, >=70 C, >=60 D, else F.
pub fn grade_letter(percentage: i64) -> &'static str {
    match percentage {
        p if p >= 90 => "A",
        p if p >= 80 => "B",
        p if p >= 70 => "C",
        p if p >= 60 => "D",
        _ => "F",
    }
}

/// Folds a quiz's attempt history into the analytics view.
///
/// Pure over its inputs. Attempts are expected in submission order and
/// the per-attempt breakdown preserves it. Zero attempts and zero
/// questions are ordinary inputs, not errors.
pub fn aggregate(quiz: &Quiz, attempts: &[QuizAttempt]) -> QuizAnalytics {
    let max_score = quiz.max_score();

    let students_attempted = attempts
        .iter()
        .map(|a| a.student_id)
        .collect::<HashSet<_>>()
        .len() as i64;

    let average_score = if attempts.is_empty() {
        0.0
    } else {
        let total: i64 = attempts.iter().map(|a| a.score).sum();
        (total as f64 / attempts.len() as f64 * 100.0).round() / 100.0
    };

    let mut grade_distribution: BTreeMap<String, i64> = GRADE_LETTERS
        .iter()
        .map(|letter| (letter.to_string(), 0))
        .collect();
    let mut score_distribution: BTreeMap<i64, i64> = BTreeMap::new();
    let mut attempts_data = Vec::with_capacity(attempts.len());

    for attempt in attempts {
        let percentage = percentage_of(attempt.score, max_score);
        *grade_distribution
            .entry(grade_letter(percentage).to_string())
            .or_insert(0) += 1;
        *score_distribution.entry(attempt.score).or_insert(0) += 1;
        attempts_data.push(AttemptSummary {
            student_name: attempt.student_name.clone(),
            score: attempt.score,
            percentage,
            attempted_at: attempt.attempted_at,
        });
    }

    QuizAnalytics {
        quiz_id: quiz.id,
        quiz_title: quiz.title.clone(),
        quiz_subject: quiz.subject.clone(),
        total_attempts: attempts.len() as i64,
        students_attempted,
        average_score,
        max_score,
        grade_distribution,
        score_distribution,
        attempts_data,
    }
}

/// Returns grade and score distributions plus summary statistics for one
/// quiz, recomputed from the full attempt log on every request.
pub async fn quiz_analytics(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&claims, "teacher")?;

    let quiz = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, title, description, due_date, branch, year, semester, subject, questions, created_at
        FROM quizzes
        WHERE id = $1
        "#,
    )
    .bind(quiz_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    // Ascending id = submission order, which keeps the breakdown stable.
    let attempts = sqlx::query_as::<_, QuizAttempt>(
        r#"
        SELECT id, quiz_id, student_id, student_name, score, total, answers, attempted_at
        FROM quiz_attempts
        WHERE quiz_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(quiz_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(aggregate(&quiz, &attempts)))
}
