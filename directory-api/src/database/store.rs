use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared_types::{Company, CompanyInput};

use crate::database::companies as db;
use crate::database::AsyncDbConnection;

/// Persistence seen by the refresh jobs.
#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn list_companies(&self) -> Result<Vec<Company>>;

    async fn get_company(&self, id: i64) -> Result<Option<Company>>;

    /// Fails when the company does not exist.
    async fn update_company(&self, id: i64, input: CompanyInput) -> Result<Company>;
}

#[derive(Clone)]
pub struct SqliteCompanyStore {
    conn: AsyncDbConnection,
}

impl SqliteCompanyStore {
    pub fn new(conn: AsyncDbConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl CompanyStore for SqliteCompanyStore {
    async fn list_companies(&self) -> Result<Vec<Company>> {
        db::list_companies(self.conn.clone()).await
    }

    async fn get_company(&self, id: i64) -> Result<Option<Company>> {
        db::get_company(self.conn.clone(), id).await
    }

    async fn update_company(&self, id: i64, input: CompanyInput) -> Result<Company> {
        db::update_company(self.conn.clone(), id, &input)
            .await?
            .ok_or_else(|| anyhow!("Company {} not found", id))
    }
}
