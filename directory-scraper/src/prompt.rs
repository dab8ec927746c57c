use schemars::schema_for;
use shared_types::ScrapedCompany;

const FORMATTING_RULES: &str = r#"CRITICAL INSTRUCTIONS:
- ONLY extract information that is EXPLICITLY stated in the text
- DO NOT guess, infer, or make assumptions about any field
- Formatting instructions, modify the data you extract so that it follows these conventions:
- For company_name: extract as-is with no formatting changes
- For street_address: use full words (e.g., "123 Main Street" not "123 Main St.")
- For city: capitalize first letter only (e.g., "Tyler" not "tyler" or "TYLER")
- For state: capitalize first letter only (e.g., "Texas" not "texas" or "TEXAS"), and return the full name of the state, not the abbreviation (e.g., "Texas" not "TX")
- For postal_code: must be exactly 5 digits with no spaces or hyphens (e.g., "75701" not "75701-1234")
- For email_address: must be valid format with text@domain.extension (e.g., "info@example.com")
- For phone_number: must be in format 123-456-7890 with hyphens (not parentheses or spaces)
- For website_url: remove http:// or https:// prefix, keep only domain (e.g., "www.example.com" not "https://www.example.com"). Add "www." if missing.
- For notes: input the sentence "Scrape generated with AI\n" if any information was found
- For ai_description: extract factual information as-is with no formatting changes
- If you cannot find verified information for a field, use an empty string ""
- When in doubt, leave the field empty rather than guessing
- Do NOT include any text outside the JSON object"#;

/// `{ "field": string, ... }` listing of every property of `ScrapedCompany`.
pub fn output_schema() -> String {
    let schema = schema_for!(ScrapedCompany);
    let fields: Vec<String> = schema
        .schema
        .object
        .as_ref()
        .map(|object| {
            object
                .properties
                .keys()
                .map(|name| format!("  \"{name}\": string"))
                .collect()
        })
        .unwrap_or_default();

    format!("{{\n{}\n}}", fields.join(",\n"))
}

pub fn build_extraction_prompt(url: &str, page_text: &str) -> String {
    format!(
        "You will output ONLY a JSON object with the following schema: {}\n\n\
         Extract company information from the following text content from {}:\n\n\
         {}\n\n\
         {}",
        output_schema(),
        url,
        page_text,
        FORMATTING_RULES
    )
}
