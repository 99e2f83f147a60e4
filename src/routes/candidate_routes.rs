use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::candidate_dto::{
        AddInterviewerPayload, CreateCandidatePayload, CreateCommentPayload,
        InterviewersResponse, StageAdvanceResponse, UpdateCandidatePayload,
    },
    error::{Error, Result},
    models::{
        candidate::{Candidate, Comment},
        stats::{stage_stats, StageStats},
    },
    AppState,
};

/// `{}` with 200: what the single-candidate endpoint answers for ids it cannot resolve.
fn empty_object() -> Response {
    (StatusCode::OK, Json(json!({}))).into_response()
}

fn candidate_not_found(id: Uuid) -> Error {
    Error::NotFound(format!("Candidate {} not found", id))
}

#[utoipa::path(
    get,
    path = "/api/candidates",
    tag = "candidates",
    responses(
        (status = 200, description = "All candidates, newest first", body = [Candidate])
    )
)]
#[axum::debug_handler]
pub async fn list_candidates(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let candidates = state.candidate_service.list_candidates().await?;
    Ok(Json(candidates))
}

#[utoipa::path(
    post,
    path = "/api/candidates",
    tag = "candidates",
    request_body = CreateCandidatePayload,
    responses(
        (status = 201, description = "Candidate created with its interviewers and comments", body = Candidate),
        (status = 400, description = "Invalid payload"),
        (status = 500, description = "Nothing was stored")
    )
)]
#[axum::debug_handler]
pub async fn create_candidate(
    State(state): State<AppState>,
    Json(payload): Json<CreateCandidatePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let candidate = state.candidate_service.create_candidate(payload).await?;
    Ok((StatusCode::CREATED, Json(candidate)))
}

#[utoipa::path(
    get,
    path = "/api/candidates/{id}",
    tag = "candidates",
    params(("id" = String, Path, description = "Candidate ID")),
    responses(
        (status = 200, description = "The candidate, or `{}` when the id matches nothing", body = Candidate)
    )
)]
#[axum::debug_handler]
pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(empty_object());
    };
    match state.candidate_service.get_candidate(id).await? {
        Some(candidate) => Ok(Json(candidate).into_response()),
        None => Ok(empty_object()),
    }
}

#[utoipa::path(
    put,
    path = "/api/candidates/{id}",
    tag = "candidates",
    params(("id" = String, Path, description = "Candidate ID")),
    request_body = UpdateCandidatePayload,
    responses(
        (status = 200, description = "The updated candidate, or `{}` when the id matches nothing", body = Candidate),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn update_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCandidatePayload>,
) -> Result<Response> {
    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(empty_object());
    };
    payload.validate()?;
    match state.candidate_service.update_candidate(id, payload).await? {
        Some(candidate) => Ok(Json(candidate).into_response()),
        None => Ok(empty_object()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/candidates/{id}",
    tag = "candidates",
    params(("id" = String, Path, description = "Candidate ID")),
    responses(
        (status = 200, description = "Deleted along with its comments and interviewers; `{}` either way")
    )
)]
#[axum::debug_handler]
pub async fn delete_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    if let Ok(id) = Uuid::parse_str(&id) {
        state.candidate_service.delete_candidate(id).await?;
    }
    Ok(empty_object())
}

#[utoipa::path(
    get,
    path = "/api/candidates/stats",
    tag = "candidates",
    responses(
        (status = 200, description = "Totals and success rate per stage", body = [StageStats])
    )
)]
#[axum::debug_handler]
pub async fn candidate_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let counts = state.candidate_service.stage_counts().await?;
    Ok(Json(stage_stats(counts)))
}

#[utoipa::path(
    post,
    path = "/api/candidates/{id}/advance",
    tag = "candidates",
    params(("id" = Uuid, Path, description = "Candidate ID")),
    responses(
        (status = 200, description = "Candidate accepted and copied to the next stage", body = StageAdvanceResponse),
        (status = 404, description = "Candidate not found"),
        (status = 409, description = "Candidate is at the final stage")
    )
)]
#[axum::debug_handler]
pub async fn advance_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let advance = state
        .candidate_service
        .advance_stage(id)
        .await?
        .ok_or_else(|| candidate_not_found(id))?;
    Ok(Json::<StageAdvanceResponse>(advance))
}

#[utoipa::path(
    post,
    path = "/api/candidates/{id}/comments",
    tag = "candidates",
    params(("id" = Uuid, Path, description = "Candidate ID")),
    request_body = CreateCommentPayload,
    responses(
        (status = 201, description = "Comment stored", body = Comment),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateCommentPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let comment = state
        .candidate_service
        .add_comment(id, payload)
        .await?
        .ok_or_else(|| candidate_not_found(id))?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[utoipa::path(
    post,
    path = "/api/candidates/{id}/interviewers",
    tag = "candidates",
    params(("id" = Uuid, Path, description = "Candidate ID")),
    request_body = AddInterviewerPayload,
    responses(
        (status = 201, description = "Interviewer assigned", body = InterviewersResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn add_interviewer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddInterviewerPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let interviewers = state
        .candidate_service
        .add_interviewer(id, payload.name.trim().to_string())
        .await?
        .ok_or_else(|| candidate_not_found(id))?;
    Ok((
        StatusCode::CREATED,
        Json(InterviewersResponse {
            candidate_id: id,
            interviewers,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/candidates/{id}/interviewers/{name}",
    tag = "candidates",
    params(
        ("id" = Uuid, Path, description = "Candidate ID"),
        ("name" = String, Path, description = "Interviewer name")
    ),
    responses(
        (status = 200, description = "Remaining interviewers", body = InterviewersResponse),
        (status = 404, description = "Candidate not found")
    )
)]
#[axum::debug_handler]
pub async fn remove_interviewer(
    State(state): State<AppState>,
    Path((id, name)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse> {
    let interviewers = state
        .candidate_service
        .remove_interviewer(id, name)
        .await?
        .ok_or_else(|| candidate_not_found(id))?;
    Ok(Json(InterviewersResponse {
        candidate_id: id,
        interviewers,
    }))
}
