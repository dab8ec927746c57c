use shared_types::*;
use std::fs;
use std::path::Path;
use ts_rs::TS;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Generate TypeScript definitions for API types
    let mut types = Vec::new();

    // Company types
    types.push(clean_type(Company::export_to_string()?));
    types.push(clean_type(CompanyField::export_to_string()?));
    types.push(clean_type(CompanyInput::export_to_string()?));
    types.push(clean_type(CompaniesResponse::export_to_string()?));
    types.push(clean_type(BulkDeleteRequest::export_to_string()?));
    types.push(clean_type(BulkDeleteResponse::export_to_string()?));
    types.push(clean_type(ValidationErrorResponse::export_to_string()?));

    // Duplicate detection types
    types.push(clean_type(DuplicateReason::export_to_string()?));
    types.push(clean_type(DuplicateMatch::export_to_string()?));
    types.push(clean_type(CheckDuplicateRequest::export_to_string()?));
    types.push(clean_type(DuplicateResponse::export_to_string()?));

    // Refresh types
    types.push(clean_type(RefreshStatus::export_to_string()?));
    types.push(clean_type(RefreshOutcome::export_to_string()?));
    types.push(clean_type(RefreshProgress::export_to_string()?));
    types.push(clean_type(RefreshSummary::export_to_string()?));
    types.push(clean_type(StartRefreshRequest::export_to_string()?));
    types.push(clean_type(RefreshStateResponse::export_to_string()?));
    types.push(clean_type(SingleRefreshResponse::export_to_string()?));

    // Scrape types
    types.push(clean_type(ScrapedCompany::export_to_string()?));
    types.push(clean_type(ScrapeMeta::export_to_string()?));
    types.push(clean_type(ScrapeRequest::export_to_string()?));
    types.push(clean_type(ScrapeResponse::export_to_string()?));

    // AI model types
    types.push(clean_type(AiProvider::export_to_string()?));
    types.push(clean_type(AiModel::export_to_string()?));
    types.push(clean_type(AiModelsResponse::export_to_string()?));

    // Directory import types
    types.push(clean_type(StartDirectoryImportRequest::export_to_string()?));
    types.push(clean_type(DirectoryImportStatus::export_to_string()?));
    types.push(clean_type(CancelDirectoryImportResponse::export_to_string()?));

    let output_dir = Path::new("../client/src/api-types");
    fs::create_dir_all(output_dir)?;

    let output_path = output_dir.join("types.ts");
    let output = types.join("\n\n");

    fs::write(&output_path, output)?;
    println!("Generated TypeScript types in {}", output_path.display());

    Ok(())
}

fn clean_type(mut type_def: String) -> String {
    type_def.retain(|c| c != '\r');

    // Keep imports when a definition references another exported type
    let lines: Vec<&str> = type_def.lines().collect();
    let has_import = lines
        .iter()
        .any(|line| line.trim().starts_with("import type"));

    let filtered: Vec<&str> = lines
        .iter()
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed.starts_with("import type") {
                return has_import;
            }
            // Filter out the generated comment line
            !trimmed.starts_with("// This file was generated")
                && !trimmed.starts_with("/* This file was generated")
        })
        .cloned()
        .collect();

    let result = filtered.join("\n").trim().to_string();
    if result.is_empty() {
        result
    } else {
        format!("{}\n", result)
    }
}
