// src/handlers/quiz.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        question::QuestionSet,
        quiz::{
            CreateQuizRequest, Quiz, QuizFilter, QuizWithStatus, normalized_scope, validate_quiz,
        },
    },
    utils::jwt::{Claims, require_role},
};

const QUIZ_COLUMNS: &str =
    "id, title, description, due_date, branch, year, semester, subject, questions, created_at";

/// Creates a new quiz from a validated draft.
///
/// * Runs the ordered authoring validation (scope, title, due date, then
///   every question) and rejects the draft on the first failure.
/// * Normalizes the scope tuple so catalog filtering matches exactly.
/// * Persists and returns the quiz with its server-assigned id.
pub async fn create_quiz(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&claims, "teacher")?;

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    validate_quiz(&payload)?;

    // Guaranteed present by validate_quiz; keep the error path anyway.
    let due_date = payload
        .due_date
        .ok_or(crate::models::quiz::QuizValidationError::MissingDueDate)?;

    let (branch, year, semester) =
        normalized_scope(&payload.branch, &payload.year, &payload.semester);

    let quiz = sqlx::query_as::<_, Quiz>(&format!(
        r#"
        INSERT INTO quizzes (title, description, due_date, branch, year, semester, subject, questions)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {QUIZ_COLUMNS}
        "#
    ))
    .bind(payload.title.trim())
    .bind(&payload.description)
    .bind(due_date)
    .bind(&branch)
    .bind(&year)
    .bind(&semester)
    .bind(payload.subject.trim())
    .bind(sqlx::types::Json(QuestionSet::from(payload.questions)))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create quiz: {:?}", e);
        AppError::from(e)
    })?;

    tracing::info!("Quiz {} created for {}/{}/{}", quiz.id, branch, year, semester);

    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Lists quizzes matching an explicit scope filter, newest first.
/// This is the unscoped catalog: the caller says exactly which cohort
/// and subject it wants, nothing is inferred from the viewer.
pub async fn list_quizzes(
    State(pool): State<PgPool>,
    Query(filter): Query<QuizFilter>,
) -> Result<impl IntoResponse, AppError> {
    let quizzes = sqlx::query_as::<_, Quiz>(&format!(
        r#"
        SELECT {QUIZ_COLUMNS}
        FROM quizzes
        WHERE branch = $1 AND year = $2 AND semester = $3 AND subject = $4
        ORDER BY created_at DESC
        "#
    ))
    .bind(&filter.branch)
    .bind(&filter.year)
    .bind(&filter.semester)
    .bind(&filter.subject)
    .fetch_all(&pool)
    .await?;

    Ok(Json(quizzes))
}

/// Helper row for deriving a student's attempt status per quiz.
#[derive(sqlx::FromRow)]
struct AttemptScore {
    quiz_id: i64,
    score: i64,
}

/// Lists the quizzes visible to the current student, each annotated with
/// the viewer's own attempt status.
///
/// Visibility follows the student's profile scope (branch/year/semester).
/// `has_attempted`, `best_score` and `total_attempts` are folded from the
/// attempt log on every call; the log is the single source of truth.
pub async fn student_quizzes(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&claims, "student")?;
    let student_id = claims.user_id()?;

    let (branch, year, semester) = normalized_scope(&claims.branch, &claims.year, &claims.semester);

    let quizzes = sqlx::query_as::<_, Quiz>(&format!(
        r#"
        SELECT {QUIZ_COLUMNS}
        FROM quizzes
        WHERE branch = $1 AND year = $2 AND semester = $3
        ORDER BY created_at DESC
        "#
    ))
    .bind(&branch)
    .bind(&year)
    .bind(&semester)
    .fetch_all(&pool)
    .await?;

    let attempts = sqlx::query_as::<_, AttemptScore>(
        "SELECT quiz_id, score FROM quiz_attempts WHERE student_id = $1",
    )
    .bind(student_id)
    .fetch_all(&pool)
    .await?;

    // quiz_id -> (best score, attempt count), derived fresh each time
    let mut status: HashMap<i64, (i64, i64)> = HashMap::new();
    for attempt in attempts {
        let entry = status.entry(attempt.quiz_id).or_insert((attempt.score, 0));
        if attempt.score > entry.0 {
            entry.0 = attempt.score;
        }
        entry.1 += 1;
    }

    let result: Vec<QuizWithStatus> = quizzes
        .into_iter()
        .map(|quiz| {
            let entry = status.get(&quiz.id);
            QuizWithStatus {
                has_attempted: entry.is_some(),
                best_score: entry.map(|(best, _)| *best),
                total_attempts: entry.map(|(_, count)| *count).unwrap_or(0),
                quiz,
            }
        })
        .collect();

    Ok(Json(result))
}

/// Fetches a single quiz by id.
pub async fn get_quiz(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = sqlx::query_as::<_, Quiz>(&format!(
        "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1"
    ))
    .bind(quiz_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    Ok(Json(quiz))
}

/// Deletes a quiz. Irreversible; the attempt log for it goes with it
/// (ON DELETE CASCADE), so no orphaned attempts survive.
pub async fn delete_quiz(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&claims, "teacher")?;

    let result = sqlx::query("DELETE FROM quizzes WHERE id = $1")
        .bind(quiz_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    tracing::info!("Quiz {} deleted", quiz_id);

    Ok(Json(serde_json::json!({
        "message": "Quiz deleted successfully"
    })))
}
