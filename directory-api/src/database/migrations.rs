use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS companies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_name VARCHAR NOT NULL,
            street_address VARCHAR,
            city VARCHAR,
            state VARCHAR,
            postal_code VARCHAR,
            email_address VARCHAR,
            phone_number VARCHAR,
            website_url VARCHAR,
            note_text VARCHAR,
            ai_description VARCHAR,
            last_updated_by VARCHAR,
            added_at BIGINT NOT NULL,
            last_updated_at BIGINT NOT NULL
        )",
        [],
    )?;

    // Backstop for two clients creating the same company at once
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_companies_name_nocase
            ON companies(company_name COLLATE NOCASE)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_companies_website
            ON companies(website_url)",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'companies'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_company_name_is_unique_ignoring_case() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO companies (company_name, added_at, last_updated_at) VALUES ('Acme', 0, 0)",
            [],
        )
        .unwrap();
        let second = conn.execute(
            "INSERT INTO companies (company_name, added_at, last_updated_at) VALUES ('ACME', 0, 0)",
            [],
        );
        assert!(second.is_err());
    }
}
