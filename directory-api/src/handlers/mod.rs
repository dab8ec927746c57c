pub mod ai_models;
pub mod companies;
pub mod directory;
pub mod refresh;
pub mod scrape;
