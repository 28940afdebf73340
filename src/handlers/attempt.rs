// src/handlers/attempt.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        attempt::{QuizAttempt, SubmitAttemptRequest},
        question::Question,
        quiz::Quiz,
    },
    utils::jwt::{Claims, require_role},
};

/// Grades a submitted answer set against the quiz's answer key.
///
/// One point per question whose submitted text equals the correct
/// option's literal text. Matching is by displayed value, not index:
/// that is what the authoring UI stores. Unanswered questions count as
/// wrong, never as an error. Pure: same inputs, same score.
pub fn score_answers(questions: &[Question], answers: &HashMap<usize, String>) -> i64 {
    questions
        .iter()
        .enumerate()
        .filter(|(i, q)| match (answers.get(i), q.correct_answer()) {
            (Some(given), Some(correct)) => given == correct,
            _ => false,
        })
        .count() as i64
}

/// Scores a submission and appends it to the attempt log.
///
/// * The viewer must carry a usable student identity; otherwise nothing
///   is recorded.
/// * `total` is captured at scoring time from the quiz's question count.
/// * Every call appends an independent attempt. Retakes are unlimited;
///   best scores are derived later, never stored here.
pub async fn submit_attempt(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = claims.user_id()?;

    let quiz = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, title, description, due_date, branch, year, semester, subject, questions, created_at
        FROM quizzes
        WHERE id = $1
        "#,
    )
    .bind(payload.quiz_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let score = score_answers(quiz.questions.0.questions(), &payload.answers);
    let total = quiz.max_score();

    let attempt = sqlx::query_as::<_, QuizAttempt>(
        r#"
        INSERT INTO quiz_attempts (quiz_id, student_id, student_name, score, total, answers)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, quiz_id, student_id, student_name, score, total, answers, attempted_at
        "#,
    )
    .bind(quiz.id)
    .bind(student_id)
    .bind(&claims.name)
    .bind(score)
    .bind(total)
    .bind(sqlx::types::Json(&payload.answers))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to record attempt: {:?}", e);
        AppError::from(e)
    })?;

    tracing::info!(
        "Student {} scored {}/{} on quiz {}",
        student_id,
        score,
        total,
        quiz.id
    );

    Ok((StatusCode::CREATED, Json(attempt)))
}

/// Lists all attempts for a quiz, newest first. Teacher view behind the
/// results dashboard.
pub async fn list_attempts_for_quiz(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&claims, "teacher")?;

    let quiz_exists = sqlx::query("SELECT id FROM quizzes WHERE id = $1")
        .bind(quiz_id)
        .fetch_optional(&pool)
        .await?;
    if quiz_exists.is_none() {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    let attempts = sqlx::query_as::<_, QuizAttempt>(
        r#"
        SELECT id, quiz_id, student_id, student_name, score, total, answers, attempted_at
        FROM quiz_attempts
        WHERE quiz_id = $1
        ORDER BY attempted_at DESC
        "#,
    )
    .bind(quiz_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(attempts))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str, options: &[&str], correct: usize) -> Question {
        Question {
            text: text.to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_option: correct,
        }
    }

    fn answers(pairs: &[(usize, &str)]) -> HashMap<usize, String> {
        pairs.iter().map(|(i, s)| (*i, s.to_string())).collect()
    }

    #[test]
    fn correct_answer_scores_one() {
        let questions = vec![question("2+2?", &["3", "4"], 1)];
        assert_eq!(score_answers(&questions, &answers(&[(0, "4")])), 1);
    }

    #[test]
    fn wrong_answer_scores_zero() {
        let questions = vec![question("2+2?", &["3", "4"], 1)];
        assert_eq!(score_answers(&questions, &answers(&[(0, "3")])), 0);
    }

    #[test]
    fn missing_answer_counts_as_wrong() {
        let questions = vec![question("2+2?", &["3", "4"], 1)];
        assert_eq!(score_answers(&questions, &HashMap::new()), 0);
    }

    #[test]
    fn matches_by_option_text_not_index() {
        // The answer key resolves to the option's displayed text; a
        // submission carrying the right text for the wrong index concept
        // does not exist on the wire, only text does.
        let questions = vec![question("Capital?", &["Paris", "Rome"], 0)];
        assert_eq!(score_answers(&questions, &answers(&[(0, "Paris")])), 1);
        assert_eq!(score_answers(&questions, &answers(&[(0, "paris")])), 0);
    }

    #[test]
    fn answers_for_unknown_indices_are_ignored() {
        let questions = vec![question("2+2?", &["3", "4"], 1)];
        assert_eq!(score_answers(&questions, &answers(&[(0, "4"), (7, "4")])), 1);
    }

    #[test]
    fn scoring_is_deterministic() {
        let questions = vec![
            question("2+2?", &["3", "4"], 1),
            question("3+3?", &["6", "9"], 0),
        ];
        let submitted = answers(&[(0, "4"), (1, "9")]);

        let first = score_answers(&questions, &submitted);
        for _ in 0..10 {
            assert_eq!(score_answers(&questions, &submitted), first);
        }
        assert_eq!(first, 1);
    }

    #[test]
    fn full_marks_when_everything_matches() {
        let questions = vec![
            question("2+2?", &["3", "4"], 1),
            question("3+3?", &["6", "9"], 0),
        ];
        assert_eq!(score_answers(&questions, &answers(&[(0, "4"), (1, "6")])), 2);
    }
}
