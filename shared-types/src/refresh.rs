use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::Company;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshStatus {
    Updated,
    Blocked,
    Failed,
}

/// Result of one refresh attempt for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefreshOutcome {
    pub id: i64,
    pub name: String,
    pub status: RefreshStatus,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefreshProgress {
    pub current: u64,
    pub total: u64,
}

/// Aggregate of one bulk refresh run.
///
/// `success_count + blocked_count + failure_count == total` always holds; a
/// cancelled run reports only the records it actually attempted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefreshSummary {
    pub total: u64,
    pub success_count: u64,
    pub blocked_count: u64,
    pub failure_count: u64,
    pub blocked: Vec<RefreshOutcome>,
    pub failures: Vec<RefreshOutcome>,
    pub cancelled: bool,
}

impl RefreshSummary {
    pub fn record(&mut self, outcome: RefreshOutcome) {
        self.total += 1;
        match outcome.status {
            RefreshStatus::Updated => self.success_count += 1,
            RefreshStatus::Blocked => {
                self.blocked_count += 1;
                self.blocked.push(outcome);
            }
            RefreshStatus::Failed => {
                self.failure_count += 1;
                self.failures.push(outcome);
            }
        }
    }

    /// An all-success run has nothing worth showing.
    pub fn has_issues(&self) -> bool {
        self.blocked_count > 0 || self.failure_count > 0
    }
}

#[derive(Debug, Default, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct StartRefreshRequest {
    pub actor_name: Option<String>,
    pub model_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefreshStateResponse {
    pub running: bool,
    pub progress: Option<RefreshProgress>,
    pub summary: Option<RefreshSummary>,
    pub blocked: BTreeMap<i64, String>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SingleRefreshResponse {
    pub outcome: RefreshOutcome,
    pub company: Option<Company>,
}
