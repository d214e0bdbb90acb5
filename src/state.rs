//! Application state management

use crate::config::{Config, DB_FILE_NAME};
use crate::db;
use crate::sources::HttpSource;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Application state holding configuration and the database location
pub struct AppState {
    pub config: Config,
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize application state, creating the data directory and schema
    pub fn new(config: Config) -> Result<Self> {
        let data_dir = config.resolve_data_dir();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        let db_path = data_dir.join(DB_FILE_NAME);
        let conn = db::open(&db_path).context("Failed to open database")?;
        db::init_schema(&conn).context("Failed to initialize schema")?;

        tracing::info!("Using database at {:?}", db_path);

        Ok(Self {
            config,
            db_path,
            data_dir,
        })
    }

    /// Get a new database connection (each call creates a new connection)
    pub fn get_db_connection(&self) -> Result<rusqlite::Connection> {
        Ok(db::open(&self.db_path)?)
    }

    /// HTTP source configured with the request timeout
    pub fn http_source(&self) -> Result<HttpSource> {
        Ok(HttpSource::new(self.config.request_timeout())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference;

    #[test]
    fn test_state_creates_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: Some(dir.path().join("nested")),
            ..Default::default()
        };

        let state = AppState::new(config).unwrap();
        assert!(state.db_path.exists());

        let conn = state.get_db_connection().unwrap();
        db::upsert_chapter(&conn, &reference::placeholder_chapter(1)).unwrap();

        // a second connection sees committed data
        let other = state.get_db_connection().unwrap();
        assert_eq!(db::list_chapters(&other).unwrap().len(), 1);
    }

    #[test]
    fn test_reopen_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        AppState::new(config.clone()).unwrap();
        AppState::new(config).unwrap();
    }
}
