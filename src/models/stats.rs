use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::candidate::{Stage, Status};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageStats {
    #[schema(value_type = i32)]
    pub stage: Stage,
    pub name: String,
    pub total: i64,
    pub pending: i64,
    pub accepted: i64,
    pub rejected: i64,
    /// Accepted share of the stage, rounded to a whole percent.
    pub success_rate: i64,
}

impl StageStats {
    fn empty(stage: Stage) -> Self {
        Self {
            stage,
            name: stage.name().to_string(),
            total: 0,
            pending: 0,
            accepted: 0,
            rejected: 0,
            success_rate: 0,
        }
    }
}

/// Folds `(stage, status, count)` rows into one entry per stage, in stage order.
/// Stages with no candidates are still reported.
pub fn stage_stats<I>(counts: I) -> Vec<StageStats>
where
    I: IntoIterator<Item = (Stage, Status, i64)>,
{
    let mut stats: Vec<StageStats> = Stage::ALL.iter().map(|s| StageStats::empty(*s)).collect();

    for (stage, status, count) in counts {
        let entry = &mut stats[(stage.number() - 1) as usize];
        entry.total += count;
        match status {
            Status::Pending => entry.pending += count,
            Status::Accepted => entry.accepted += count,
            Status::Rejected => entry.rejected += count,
        }
    }

    for entry in &mut stats {
        entry.success_rate = success_rate(entry.accepted, entry.total);
    }
    stats
}

fn success_rate(accepted: i64, total: i64) -> i64 {
    if total == 0 {
        return 0;
    }
    ((accepted as f64 / total as f64) * 100.0).round() as i64
}
