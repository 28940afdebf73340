// src/routes.rs

use axum::{
    Router, http::Method, middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{analytics, attempt, quiz},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * All quiz routes sit behind the bearer-token middleware; role checks
///   happen in the handlers that need them.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool, Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let quiz_routes = Router::new()
        .route("/quizzes", get(quiz::list_quizzes).post(quiz::create_quiz))
        .route("/quizzes/student", get(quiz::student_quizzes))
        .route("/quizzes/{id}", get(quiz::get_quiz).delete(quiz::delete_quiz))
        .route("/quizzes/{id}/attempts", get(attempt::list_attempts_for_quiz))
        .route("/quizzes/{id}/analytics", get(analytics::quiz_analytics))
        .route("/quiz-attempts", post(attempt::submit_attempt))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api", quiz_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
