pub mod candidate_routes;
pub mod docs;
pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::AppState;

/// API routes with state applied. Static assets and middleware layers are added by the binary.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/test-db", get(health::test_db))
        .route("/api/openapi.json", get(docs::openapi_json))
        .route(
            "/api/candidates",
            get(candidate_routes::list_candidates).post(candidate_routes::create_candidate),
        )
        .route("/api/candidates/stats", get(candidate_routes::candidate_stats))
        .route(
            "/api/candidates/:id",
            get(candidate_routes::get_candidate)
                .put(candidate_routes::update_candidate)
                .delete(candidate_routes::delete_candidate),
        )
        .route(
            "/api/candidates/:id/advance",
            post(candidate_routes::advance_candidate),
        )
        .route(
            "/api/candidates/:id/comments",
            post(candidate_routes::add_comment),
        )
        .route(
            "/api/candidates/:id/interviewers",
            post(candidate_routes::add_interviewer),
        )
        .route(
            "/api/candidates/:id/interviewers/:name",
            delete(candidate_routes::remove_interviewer),
        )
        .with_state(state)
}
