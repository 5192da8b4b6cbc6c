//! Database operations

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use super::models::StoredSettings;
use crate::error::Result;
use crate::oracle::ApiSettings;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS api_settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                base_url TEXT NOT NULL,
                api_key TEXT NOT NULL,
                model TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }

    /// Stored settings, or `None` if nothing was ever saved.
    pub fn stored_settings(&self) -> Result<Option<StoredSettings>> {
        let stored = self.conn
            .query_row(
                "SELECT base_url, api_key, model, updated_at FROM api_settings WHERE id = 1",
                [],
                |row| {
                    Ok(StoredSettings {
                        settings: ApiSettings {
                            base_url: row.get(0)?,
                            api_key: row.get(1)?,
                            model: row.get(2)?,
                        },
                        updated_at: row.get::<_, i64>(3)? as u64,
                    })
                },
            )
            .optional()?;
        Ok(stored)
    }

    pub fn load_settings(&self) -> Result<ApiSettings> {
        Ok(self.stored_settings()?.map(|s| s.settings).unwrap_or_default())
    }

    pub fn save_settings(&self, settings: &ApiSettings) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO api_settings (id, base_url, api_key, model, updated_at)
            VALUES (1, ?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                base_url = excluded.base_url,
                api_key = excluded.api_key,
                model = excluded.model,
                updated_at = excluded.updated_at
            "#,
            params![settings.base_url, settings.api_key, settings.model, Self::now() as i64],
        )?;
        tracing::info!(base_url = %settings.base_url, model = %settings.model, "saved API settings");
        Ok(())
    }
}
