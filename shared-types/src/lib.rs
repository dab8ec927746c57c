use serde::{Deserialize, Serialize};

pub mod ai_model;
pub mod company;
pub mod directory;
pub mod duplicate;
pub mod refresh;
pub mod scrape;

pub use ai_model::{AiModel, AiModelsResponse, AiProvider};
pub use company::{
    BulkDeleteRequest, BulkDeleteResponse, CompaniesResponse, Company, CompanyField,
    CompanyInput, ValidationErrorResponse,
};
pub use directory::{
    CancelDirectoryImportResponse, DirectoryImportStatus, StartDirectoryImportRequest,
};
pub use duplicate::{CheckDuplicateRequest, DuplicateMatch, DuplicateReason, DuplicateResponse};
pub use refresh::{
    RefreshOutcome, RefreshProgress, RefreshStateResponse, RefreshStatus, RefreshSummary,
    SingleRefreshResponse, StartRefreshRequest,
};
pub use scrape::{ScrapeMeta, ScrapeRequest, ScrapeResponse, ScrapedCompany};

/// Error response for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
