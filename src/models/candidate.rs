use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
#[error("stage must be 1, 2 or 3, got {0}")]
pub struct InvalidStage(pub i32);

#[derive(Debug, thiserror::Error)]
#[error("unknown status '{0}'")]
pub struct InvalidStatus(pub String);

/// One of the three sequential interview phases. Serialized as its number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Stage {
    Initial,
    Technical,
    Final,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Initial, Stage::Technical, Stage::Final];

    pub fn number(self) -> i32 {
        match self {
            Stage::Initial => 1,
            Stage::Technical => 2,
            Stage::Final => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Initial => "Initial Interview",
            Stage::Technical => "Technical Assessment",
            Stage::Final => "Final Interview",
        }
    }

    /// The stage a candidate moves to when accepted, `None` after the final one.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Initial => Some(Stage::Technical),
            Stage::Technical => Some(Stage::Final),
            Stage::Final => None,
        }
    }
}

impl Default for Stage {
    fn default() -> Self {
        Stage::Initial
    }
}

impl TryFrom<i32> for Stage {
    type Error = InvalidStage;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Stage::Initial),
            2 => Ok(Stage::Technical),
            3 => Ok(Stage::Final),
            other => Err(InvalidStage(other)),
        }
    }
}

impl From<Stage> for i32 {
    fn from(stage: Stage) -> Self {
        stage.number()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Accepted => "accepted",
            Status::Rejected => "rejected",
        }
    }
}

impl FromStr for Status {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Status::Pending),
            "accepted" => Ok(Status::Accepted),
            "rejected" => Ok(Status::Rejected),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for Status {
    type Error = InvalidStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Outcome an interviewer attaches to a comment. Rows written without one default to pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    #[default]
    Pending,
    Passed,
    Failed,
}

impl CommentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CommentStatus::Pending => "pending",
            CommentStatus::Passed => "passed",
            CommentStatus::Failed => "failed",
        }
    }
}

impl FromStr for CommentStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CommentStatus::Pending),
            "passed" => Ok(CommentStatus::Passed),
            "failed" => Ok(CommentStatus::Failed),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for CommentStatus {
    type Error = InvalidStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub interviewer_name: String,
    pub text: String,
    #[sqlx(try_from = "String")]
    pub status: CommentStatus,
    pub timestamp: DateTime<Utc>,
}

/// A `candidates` row as stored.
#[derive(Debug, Clone, FromRow)]
pub struct CandidateRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub job_title: String,
    #[sqlx(try_from = "i32")]
    pub stage: Stage,
    #[sqlx(try_from = "String")]
    pub status: Status,
    pub cv: Option<String>,
    pub interview_date: Option<DateTime<Utc>>,
    pub meeting_location: Option<String>,
    pub meeting_link: Option<String>,
    pub suggested_job_title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A candidate row joined with its aggregated interviewers and comments.
#[derive(Debug, Clone, FromRow)]
pub struct CandidateRow {
    #[sqlx(flatten)]
    pub record: CandidateRecord,
    pub interviewers: Vec<String>,
    pub comments: Json<Vec<Comment>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub job_title: String,
    #[schema(value_type = i32, minimum = 1, maximum = 3)]
    pub stage: Stage,
    pub status: Status,
    pub cv: Option<String>,
    pub interview_date: Option<DateTime<Utc>>,
    pub meeting_location: Option<String>,
    pub meeting_link: Option<String>,
    pub suggested_job_title: Option<String>,
    pub interviewers: Vec<String>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Candidate {
    pub fn from_record(
        record: CandidateRecord,
        interviewers: Vec<String>,
        comments: Vec<Comment>,
    ) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            job_title: record.job_title,
            stage: record.stage,
            status: record.status,
            cv: record.cv,
            interview_date: record.interview_date,
            meeting_location: record.meeting_location,
            meeting_link: record.meeting_link,
            suggested_job_title: record.suggested_job_title,
            interviewers,
            comments,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<CandidateRow> for Candidate {
    fn from(row: CandidateRow) -> Self {
        Candidate::from_record(row.record, row.interviewers, row.comments.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stage_round_trips_through_its_number() {
        for stage in Stage::ALL {
            assert_eq!(Stage::try_from(stage.number()).unwrap(), stage);
        }
        assert!(Stage::try_from(0).is_err());
        assert!(Stage::try_from(4).is_err());
    }

    #[test]
    fn stage_only_moves_forward() {
        assert_eq!(Stage::Initial.next(), Some(Stage::Technical));
        assert_eq!(Stage::Technical.next(), Some(Stage::Final));
        assert_eq!(Stage::Final.next(), None);
    }

    #[test]
    fn stage_rejects_out_of_range_json() {
        assert_eq!(serde_json::from_value::<Stage>(json!(2)).unwrap(), Stage::Technical);
        assert!(serde_json::from_value::<Stage>(json!(7)).is_err());
        assert_eq!(serde_json::to_value(Stage::Final).unwrap(), json!(3));
    }

    #[test]
    fn statuses_parse_their_wire_names() {
        assert_eq!("accepted".parse::<Status>().unwrap(), Status::Accepted);
        assert!("hired".parse::<Status>().is_err());
        assert_eq!("failed".parse::<CommentStatus>().unwrap(), CommentStatus::Failed);
        assert_eq!(Status::Rejected.as_str(), "rejected");
    }

    #[test]
    fn aggregated_comment_json_decodes() {
        let raw = json!([{
            "id": "3f0c1c7e-8a5e-4d8c-9f0e-7f7b9a2b1c11",
            "interviewerName": "Bob",
            "text": "Strong fundamentals",
            "status": "passed",
            "timestamp": "2024-03-01T09:30:00.123456+00:00"
        }]);
        let comments: Vec<Comment> = serde_json::from_value(raw).unwrap();
        assert_eq!(comments[0].interviewer_name, "Bob");
        assert_eq!(comments[0].status, CommentStatus::Passed);
    }

    #[test]
    fn candidate_serializes_camel_case() {
        let now = Utc::now();
        let candidate = Candidate::from_record(
            CandidateRecord {
                id: Uuid::new_v4(),
                name: "Ana".into(),
                email: "a@x.com".into(),
                job_title: "Engineer".into(),
                stage: Stage::Initial,
                status: Status::Pending,
                cv: None,
                interview_date: None,
                meeting_location: None,
                meeting_link: None,
                suggested_job_title: None,
                created_at: now,
                updated_at: now,
            },
            vec![],
            vec![],
        );
        let value = serde_json::to_value(&candidate).unwrap();
        assert_eq!(value["jobTitle"], "Engineer");
        assert_eq!(value["stage"], 1);
        assert_eq!(value["status"], "pending");
        assert_eq!(value["comments"], json!([]));
        assert_eq!(value["interviewers"], json!([]));
        assert!(value["suggestedJobTitle"].is_null());
    }
}
