use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::Company;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateReason {
    Website,
    Name,
}

/// An existing record that conflicts with a candidate company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DuplicateMatch {
    pub existing: Company,
    pub reason: DuplicateReason,
}

#[derive(Debug, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct CheckDuplicateRequest {
    pub name: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DuplicateResponse {
    pub duplicate: Option<DuplicateMatch>,
}
