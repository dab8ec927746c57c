use schemars::JsonSchema;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

/// Fields the LLM scraper can fill in. Anything it could not verify comes
/// back empty or missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
#[ts(export)]
pub struct ScrapedCompany {
    #[serde(default)]
    #[serde(deserialize_with = "scalar_as_string")]
    pub company_name: Option<String>,
    #[serde(default)]
    #[serde(deserialize_with = "scalar_as_string")]
    pub street_address: Option<String>,
    #[serde(default)]
    #[serde(deserialize_with = "scalar_as_string")]
    pub city: Option<String>,
    #[serde(default)]
    #[serde(deserialize_with = "scalar_as_string")]
    pub state: Option<String>,
    #[serde(default)]
    #[serde(deserialize_with = "scalar_as_string")]
    pub postal_code: Option<String>,
    #[serde(default)]
    #[serde(deserialize_with = "scalar_as_string")]
    pub email_address: Option<String>,
    #[serde(default)]
    #[serde(deserialize_with = "scalar_as_string")]
    pub phone_number: Option<String>,
    #[serde(default)]
    #[serde(deserialize_with = "scalar_as_string")]
    pub website_url: Option<String>,
    #[serde(default)]
    #[serde(deserialize_with = "scalar_as_string")]
    pub notes: Option<String>,
    #[serde(default)]
    #[serde(deserialize_with = "scalar_as_string")]
    pub ai_description: Option<String>,
}

/// Models sometimes answer `"postal_code": 75701` or a bare number for a
/// phone. Scalars are kept as text and normalized later.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(text)) => Ok(Some(text)),
        Some(serde_json::Value::Number(number)) => Ok(Some(number.to_string())),
        Some(serde_json::Value::Bool(flag)) => Ok(Some(flag.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string or scalar, found {}",
            other
        ))),
    }
}

/// Which model produced a scrape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScrapeMeta {
    pub model_id: String,
    pub provider: String,
    pub label: String,
}

#[derive(Debug, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct ScrapeRequest {
    pub url: String,
    pub model_id: Option<String>,
    #[serde(default)]
    pub check_duplicate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScrapeResponse {
    pub success: bool,
    pub data: Option<ScrapedCompany>,
    pub error: Option<String>,
    #[serde(default)]
    pub blocked: bool,
    pub normalized_url: Option<String>,
    pub meta: Option<ScrapeMeta>,
}
