use std::path::PathBuf;
use std::sync::Arc;

use crate::database::Database;

/// Returns the path to the directory database based on the operating system
///
/// # Platform-specific paths
///
/// - **macOS**: `~/Library/Application Support/business-directory/db.sqlite`
/// - **Linux**: `~/.local/share/business-directory/db.sqlite`
/// - **Windows**: `%LOCALAPPDATA%\business-directory\db.sqlite`
pub fn get_db_path() -> anyhow::Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(data_dir.join("business-directory").join("db.sqlite"))
}

/// Opens (and migrates) the database, at `configured` when set.
pub fn initialize_database(configured: Option<PathBuf>) -> anyhow::Result<(Arc<Database>, PathBuf)> {
    let db_path = match configured {
        Some(path) => path,
        None => get_db_path()?,
    };

    let db = Database::new(&db_path)?;
    Ok((Arc::new(db), db_path))
}
