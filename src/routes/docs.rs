use axum::Json;
use utoipa::OpenApi;

use crate::dto::candidate_dto::{
    AddInterviewerPayload, CreateCandidatePayload, CreateCommentPayload, InterviewersResponse,
    StageAdvanceResponse, UpdateCandidatePayload,
};
use crate::dto::health_dto::{ConnectionDetails, ConnectionProbeResponse};
use crate::models::candidate::{Candidate, Comment, CommentStatus, Status};
use crate::models::stats::StageStats;
use crate::routes::{candidate_routes, health};

#[derive(OpenApi)]
#[openapi(
    info(title = "Interview Tracker API"),
    paths(
        health::health,
        health::test_db,
        candidate_routes::list_candidates,
        candidate_routes::create_candidate,
        candidate_routes::get_candidate,
        candidate_routes::update_candidate,
        candidate_routes::delete_candidate,
        candidate_routes::candidate_stats,
        candidate_routes::advance_candidate,
        candidate_routes::add_comment,
        candidate_routes::add_interviewer,
        candidate_routes::remove_interviewer,
    ),
    components(schemas(
        Candidate,
        Comment,
        Status,
        CommentStatus,
        CreateCandidatePayload,
        CreateCommentPayload,
        UpdateCandidatePayload,
        AddInterviewerPayload,
        InterviewersResponse,
        StageAdvanceResponse,
        StageStats,
        ConnectionProbeResponse,
        ConnectionDetails,
    )),
    tags(
        (name = "candidates", description = "Candidates moving through the interview stages"),
        (name = "health", description = "Liveness and database connectivity")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_candidate_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/candidates"));
        assert!(doc.paths.paths.contains_key("/api/candidates/{id}/advance"));
        assert!(doc.paths.paths.contains_key("/api/test-db"));
    }
}
