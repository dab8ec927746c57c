use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct StartDirectoryImportRequest {
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DirectoryImportStatus {
    pub running: bool,
    pub url: Option<String>,
    pub listings_found: u64,
    pub imported: u64,
    pub skipped_duplicates: u64,
    pub failed: u64,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CancelDirectoryImportResponse {
    pub canceled: bool,
    pub message: String,
}
