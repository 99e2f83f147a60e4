use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::candidate::{Candidate, CommentStatus, Stage, Status};

/// Body of `POST /api/candidates`. Keys are camelCase; snake_case spellings are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCandidatePayload {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[serde(alias = "job_title")]
    #[validate(length(min = 1, max = 255))]
    pub job_title: String,
    #[serde(default)]
    #[schema(value_type = Option<i32>, minimum = 1, maximum = 3)]
    pub stage: Option<Stage>,
    #[serde(default)]
    pub status: Option<Status>,
    pub cv: Option<String>,
    #[serde(alias = "interview_date")]
    pub interview_date: Option<DateTime<Utc>>,
    #[serde(alias = "meeting_location")]
    pub meeting_location: Option<String>,
    #[serde(alias = "meeting_link")]
    pub meeting_link: Option<String>,
    #[serde(alias = "suggested_job_title")]
    pub suggested_job_title: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_interviewer_names"))]
    pub interviewers: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub comments: Vec<CreateCommentPayload>,
}

impl CreateCandidatePayload {
    /// Trimmed interviewer names with repeats dropped, first occurrence kept.
    pub fn unique_interviewers(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.interviewers
            .iter()
            .map(|name| name.trim())
            .filter(|name| seen.insert(*name))
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentPayload {
    #[serde(alias = "interviewer_name")]
    #[validate(length(min = 1, max = 255))]
    pub interviewer_name: String,
    #[validate(length(min = 1))]
    pub text: String,
    #[serde(default)]
    pub status: CommentStatus,
}

/// Field-level update for `PUT /api/candidates/{id}`. Absent fields are left untouched.
/// The stage is not part of it; it only changes through the advance operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCandidatePayload {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[serde(alias = "job_title")]
    #[validate(length(min = 1, max = 255))]
    pub job_title: Option<String>,
    pub status: Option<Status>,
    pub cv: Option<String>,
    #[serde(alias = "interview_date")]
    pub interview_date: Option<DateTime<Utc>>,
    #[serde(alias = "meeting_location")]
    pub meeting_location: Option<String>,
    #[serde(alias = "meeting_link")]
    pub meeting_link: Option<String>,
    #[serde(alias = "suggested_job_title")]
    pub suggested_job_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddInterviewerPayload {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InterviewersResponse {
    pub candidate_id: uuid::Uuid,
    pub interviewers: Vec<String>,
}

/// Result of moving a candidate forward: the accepted record and the new one at the next stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageAdvanceResponse {
    pub previous: Candidate,
    pub next: Candidate,
}

#[allow(clippy::ptr_arg)]
fn validate_interviewer_names(names: &Vec<String>) -> Result<(), ValidationError> {
    for name in names {
        let len = name.trim().chars().count();
        if len == 0 || name.chars().count() > 255 {
            return Err(ValidationError::new("interviewer_name_length"));
        }
    }
    Ok(())
}

/// Blank optional strings are stored as NULL.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "name": "Ana",
            "email": "a@x.com",
            "jobTitle": "Engineer",
            "stage": 1,
            "status": "pending",
            "interviewers": ["Bob"],
            "comments": []
        })
    }

    #[test]
    fn accepts_camel_case_payload() {
        let payload: CreateCandidatePayload = serde_json::from_value(sample()).unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.job_title, "Engineer");
        assert_eq!(payload.stage, Some(Stage::Initial));
        assert_eq!(payload.interviewers, vec!["Bob".to_string()]);
    }

    #[test]
    fn accepts_snake_case_aliases_and_missing_lists() {
        let payload: CreateCandidatePayload = serde_json::from_value(json!({
            "name": "Ana",
            "email": "a@x.com",
            "job_title": "Engineer",
            "meeting_link": "https://meet.example/abc"
        }))
        .unwrap();
        assert_eq!(payload.job_title, "Engineer");
        assert_eq!(payload.meeting_link.as_deref(), Some("https://meet.example/abc"));
        assert!(payload.interviewers.is_empty());
        assert!(payload.comments.is_empty());
        assert_eq!(payload.stage, None);
    }

    #[test]
    fn rejects_bad_email_and_blank_interviewer() {
        let mut value = sample();
        value["email"] = json!("not-an-email");
        let payload: CreateCandidatePayload = serde_json::from_value(value).unwrap();
        assert!(payload.validate().is_err());

        let mut value = sample();
        value["interviewers"] = json!(["Bob", "  "]);
        let payload: CreateCandidatePayload = serde_json::from_value(value).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn validates_nested_comments() {
        let mut value = sample();
        value["comments"] = json!([{ "interviewerName": "Bob", "text": "", "status": "passed" }]);
        let payload: CreateCandidatePayload = serde_json::from_value(value).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_stage() {
        let mut value = sample();
        value["stage"] = json!(4);
        assert!(serde_json::from_value::<CreateCandidatePayload>(value).is_err());
    }

    #[test]
    fn duplicate_interviewers_collapse_in_order() {
        let mut value = sample();
        value["interviewers"] = json!(["Bob", "Eve", "Bob"]);
        let payload: CreateCandidatePayload = serde_json::from_value(value).unwrap();
        assert_eq!(payload.unique_interviewers(), vec!["Bob".to_string(), "Eve".to_string()]);
    }

    #[test]
    fn interviewers_differing_only_by_whitespace_collapse() {
        let mut value = sample();
        value["interviewers"] = json!(["Bob", "Bob ", " Bob", " Eve "]);
        let payload: CreateCandidatePayload = serde_json::from_value(value).unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.unique_interviewers(), vec!["Bob".to_string(), "Eve".to_string()]);
    }

    #[test]
    fn blank_optionals_become_none() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some("cv.pdf".into())), Some("cv.pdf".into()));
    }
}
