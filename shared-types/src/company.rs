use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Company {
    pub id: i64,
    pub company_name: String,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub email_address: Option<String>,
    pub phone_number: Option<String>,
    pub website_url: Option<String>,
    pub note_text: Option<String>,
    pub ai_description: Option<String>,
    pub last_updated_by: Option<String>,
    pub added_at: i64,
    pub last_updated_at: i64,
}

impl Company {
    /// Website with surrounding whitespace removed, or `None` when blank.
    pub fn website(&self) -> Option<&str> {
        self.website_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Single-line address in the "street city, state zip" form the dashboard shows.
    pub fn address(&self) -> String {
        let street_city = [self.street_address.as_deref(), self.city.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let state_zip = [self.state.as_deref(), self.postal_code.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        [street_city, state_zip]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Name used in summaries; falls back to the website, then the id.
    pub fn display_name(&self) -> String {
        if !self.company_name.trim().is_empty() {
            return self.company_name.clone();
        }
        match self.website() {
            Some(url) => url.to_string(),
            None => format!("Company #{}", self.id),
        }
    }
}

/// Editable company fields, keyed the way the dashboard forms and the scrape
/// payload name them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    TS,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CompanyField {
    CompanyName,
    StreetAddress,
    City,
    State,
    PostalCode,
    EmailAddress,
    PhoneNumber,
    WebsiteUrl,
    NoteText,
    AiDescription,
}

/// Form values for create and partial update. `None` leaves a column alone,
/// an empty string clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CompanyInput {
    pub company_name: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub email_address: Option<String>,
    pub phone_number: Option<String>,
    pub website_url: Option<String>,
    pub note_text: Option<String>,
    pub ai_description: Option<String>,
    pub last_updated_by: Option<String>,
}

impl CompanyInput {
    pub fn get(&self, field: CompanyField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: CompanyField, value: Option<String>) {
        *self.slot_mut(field) = value;
    }

    fn slot(&self, field: CompanyField) -> &Option<String> {
        match field {
            CompanyField::CompanyName => &self.company_name,
            CompanyField::StreetAddress => &self.street_address,
            CompanyField::City => &self.city,
            CompanyField::State => &self.state,
            CompanyField::PostalCode => &self.postal_code,
            CompanyField::EmailAddress => &self.email_address,
            CompanyField::PhoneNumber => &self.phone_number,
            CompanyField::WebsiteUrl => &self.website_url,
            CompanyField::NoteText => &self.note_text,
            CompanyField::AiDescription => &self.ai_description,
        }
    }

    fn slot_mut(&mut self, field: CompanyField) -> &mut Option<String> {
        match field {
            CompanyField::CompanyName => &mut self.company_name,
            CompanyField::StreetAddress => &mut self.street_address,
            CompanyField::City => &mut self.city,
            CompanyField::State => &mut self.state,
            CompanyField::PostalCode => &mut self.postal_code,
            CompanyField::EmailAddress => &mut self.email_address,
            CompanyField::PhoneNumber => &mut self.phone_number,
            CompanyField::WebsiteUrl => &mut self.website_url,
            CompanyField::NoteText => &mut self.note_text,
            CompanyField::AiDescription => &mut self.ai_description,
        }
    }
}

impl From<&Company> for CompanyInput {
    fn from(company: &Company) -> Self {
        Self {
            company_name: Some(company.company_name.clone()),
            street_address: company.street_address.clone(),
            city: company.city.clone(),
            state: company.state.clone(),
            postal_code: company.postal_code.clone(),
            email_address: company.email_address.clone(),
            phone_number: company.phone_number.clone(),
            website_url: company.website_url.clone(),
            note_text: company.note_text.clone(),
            ai_description: company.ai_description.clone(),
            last_updated_by: company.last_updated_by.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CompaniesResponse {
    pub companies: Vec<Company>,
}

#[derive(Debug, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct BulkDeleteRequest {
    pub ids: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BulkDeleteResponse {
    pub deleted: u64,
    pub failed: Vec<i64>,
}

/// Field-scoped validation failures returned with HTTP 400.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ValidationErrorResponse {
    pub error: String,
    pub fields: std::collections::BTreeMap<CompanyField, String>,
}
