pub mod bulk_refresh;
pub mod directory_import_manager;
pub mod refresh_manager;
