use crate::database::AsyncDbConnection;
use anyhow::{anyhow, Result};
use rusqlite::types::Value;
use rusqlite::{OptionalExtension, Row};
use shared_types::{Company, CompanyField, CompanyInput};
use strum::IntoEnumIterator;

use crate::config::DEFAULT_ACTOR;

pub const MAX_ACTOR_CHARS: usize = 100;

const COMPANY_COLUMNS: &str = "id, company_name, street_address, city, state, postal_code,
    email_address, phone_number, website_url, note_text, ai_description, last_updated_by,
    added_at, last_updated_at";

/// Actor recorded on a write: trimmed, capped at 100 chars, `"System"` when blank.
pub fn resolve_last_updated_by(actor: Option<&str>) -> String {
    let actor = actor.map(str::trim).unwrap_or("");
    if actor.is_empty() {
        return DEFAULT_ACTOR.to_string();
    }
    actor.chars().take(MAX_ACTOR_CHARS).collect()
}

/// Whether an error came from the case-insensitive company name index.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn company_from_row(row: &Row) -> rusqlite::Result<Company> {
    Ok(Company {
        id: row.get(0)?,
        company_name: row.get(1)?,
        street_address: row.get(2)?,
        city: row.get(3)?,
        state: row.get(4)?,
        postal_code: row.get(5)?,
        email_address: row.get(6)?,
        phone_number: row.get(7)?,
        website_url: row.get(8)?,
        note_text: row.get(9)?,
        ai_description: row.get(10)?,
        last_updated_by: row.get(11)?,
        added_at: row.get(12)?,
        last_updated_at: row.get(13)?,
    })
}

/// Optional text column value: blank strings are stored as NULL.
fn column_value(value: Option<&str>) -> Value {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Value::Text(text.to_string()),
        _ => Value::Null,
    }
}

fn optional_fields() -> impl Iterator<Item = CompanyField> {
    CompanyField::iter().filter(|field| *field != CompanyField::CompanyName)
}

pub async fn insert_company(conn: AsyncDbConnection, input: &CompanyInput) -> Result<Company> {
    let name = input.company_name.as_deref().map(str::trim).unwrap_or("");
    if name.is_empty() {
        return Err(anyhow!("Company name is required"));
    }

    let conn = conn.lock().await?;
    let now = chrono::Utc::now().timestamp();

    let mut columns = vec!["company_name".to_string()];
    let mut values = vec![Value::Text(name.to_string())];
    for field in optional_fields() {
        columns.push(field.as_ref().to_string());
        values.push(column_value(input.get(field)));
    }
    columns.extend(["last_updated_by", "added_at", "last_updated_at"].map(String::from));
    values.push(Value::Text(resolve_last_updated_by(
        input.last_updated_by.as_deref(),
    )));
    values.push(Value::Integer(now));
    values.push(Value::Integer(now));

    let placeholders = vec!["?"; values.len()].join(", ");
    let sql = format!(
        "INSERT INTO companies ({}) VALUES ({}) RETURNING {}",
        columns.join(", "),
        placeholders,
        COMPANY_COLUMNS
    );

    let company = conn.query_row(
        &sql,
        rusqlite::params_from_iter(values),
        company_from_row,
    )?;

    Ok(company)
}

pub async fn get_company(conn: AsyncDbConnection, id: i64) -> Result<Option<Company>> {
    let conn = conn.lock().await?;

    let company = conn
        .query_row(
            &format!("SELECT {} FROM companies WHERE id = ?", COMPANY_COLUMNS),
            [id],
            company_from_row,
        )
        .optional()?;

    Ok(company)
}

/// All companies in creation order.
pub async fn list_companies(conn: AsyncDbConnection) -> Result<Vec<Company>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM companies ORDER BY id ASC",
        COMPANY_COLUMNS
    ))?;

    let companies = stmt
        .query_map([], company_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(companies)
}

/// Partial update. Only fields present in `input` change; an empty string
/// clears an optional column. The actor and timestamp are always stamped.
/// Returns `None` when no company has this id.
pub async fn update_company(
    conn: AsyncDbConnection,
    id: i64,
    input: &CompanyInput,
) -> Result<Option<Company>> {
    let mut assignments = Vec::new();
    let mut values = Vec::new();

    if let Some(name) = input.company_name.as_deref() {
        let name = name.trim();
        if name.is_empty() {
            return Err(anyhow!("Company name is required"));
        }
        assignments.push("company_name = ?".to_string());
        values.push(Value::Text(name.to_string()));
    }
    for field in optional_fields() {
        if let Some(value) = input.get(field) {
            assignments.push(format!("{} = ?", field.as_ref()));
            values.push(column_value(Some(value)));
        }
    }
    assignments.push("last_updated_by = ?".to_string());
    values.push(Value::Text(resolve_last_updated_by(
        input.last_updated_by.as_deref(),
    )));
    assignments.push("last_updated_at = ?".to_string());
    values.push(Value::Integer(chrono::Utc::now().timestamp()));
    values.push(Value::Integer(id));

    {
        let conn = conn.lock().await?;
        let sql = format!(
            "UPDATE companies SET {} WHERE id = ?",
            assignments.join(", ")
        );
        let changed = conn.execute(&sql, rusqlite::params_from_iter(values))?;
        if changed == 0 {
            return Ok(None);
        }
    }

    get_company(conn, id).await
}

/// Returns whether a row was removed.
pub async fn delete_company(conn: AsyncDbConnection, id: i64) -> Result<bool> {
    let conn = conn.lock().await?;
    let deleted = conn.execute("DELETE FROM companies WHERE id = ?", [id])?;
    Ok(deleted > 0)
}

/// Deletes every id in one transaction; ids with no row come back as failed.
pub async fn delete_companies(conn: AsyncDbConnection, ids: &[i64]) -> Result<(u64, Vec<i64>)> {
    let mut conn = conn.lock().await?;
    let tx = conn.transaction()?;

    let mut deleted = 0u64;
    let mut failed = Vec::new();
    {
        let mut stmt = tx.prepare("DELETE FROM companies WHERE id = ?")?;
        for id in ids {
            match stmt.execute([id])? {
                0 => failed.push(*id),
                _ => deleted += 1,
            }
        }
    }
    tx.commit()?;

    Ok((deleted, failed))
}
