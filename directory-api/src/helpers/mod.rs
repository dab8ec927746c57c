pub mod company_create;
pub mod database;
