// src/routes.rs

use axum::{
    Router, http::Method, middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, exams, questions},
    state::AppState,
    utils::jwt::{auth_middleware, instructor_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, questions, exams).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, store, config).
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

    let require_auth = middleware::from_fn_with_state(state.config.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let question_routes = Router::new()
        .route("/", get(questions::list_questions))
        .route("/stats", get(questions::bank_stats))
        .route("/{id}", get(questions::get_question))
        // Protected question routes
        .merge(
            Router::new()
                .route("/", post(questions::create_question))
                .route(
                    "/{id}",
                    put(questions::update_question).delete(questions::delete_question),
                )
                .layer(require_auth.clone()),
        );

    let exam_routes = Router::new()
        .route("/{exam_id}", get(exams::get_exam))
        .route("/{exam_id}/submit", post(exams::submit_exam))
        // Generation is the one instructor-gated operation: the role check
        // runs before the body is even validated.
        .merge(
            Router::new()
                .route("/generate", post(exams::generate_exam))
                .layer(middleware::from_fn(instructor_middleware))
                .layer(require_auth.clone()),
        )
        // Protected editing routes
        .merge(
            Router::new()
                .route("/{exam_id}", delete(exams::delete_exam))
                .route(
                    "/{exam_id}/items/{item_id}",
                    put(exams::replace_exam_item).delete(exams::delete_exam_item),
                )
                .route("/{exam_id}/candidates", get(exams::list_candidates))
                .layer(require_auth),
        );

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/questions", question_routes)
        .nest("/api/exams", exam_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
