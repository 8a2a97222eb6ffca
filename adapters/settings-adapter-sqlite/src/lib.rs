//! SQLite-backed storage for the maintenance settings record.
//!
//! The record lives in a `settings` key-value table under a single name, as
//! a JSON document.

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::path::Path;

use pausegate::prelude::*;
use pausegate::settings_adapter::{SettingsAdapter, WriteOutcome};

mod schema;
mod setting;

/// Name under which the maintenance record is stored
pub const SETTINGS_NAME: &str = "pausegate_settings";

const DB_FILE: &str = "settings.db";

#[derive(Debug)]
pub struct SettingsAdapterSqlite {
	db: SqlitePool,
}

impl SettingsAdapterSqlite {
	/// Open (or create) the database inside `dir`
	pub async fn new(dir: impl AsRef<Path>) -> ClResult<Self> {
		tokio::fs::create_dir_all(dir.as_ref()).await?;

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(dir.as_ref().join(DB_FILE))
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("DB: {:#?}", err))
			.map_err(|_| Error::DbError)?;

		schema::init_db(&db)
			.await
			.inspect_err(|err| error!("DB schema: {:#?}", err))
			.map_err(|_| Error::DbError)?;

		Ok(Self { db })
	}
}

#[async_trait]
impl SettingsAdapter for SettingsAdapterSqlite {
	async fn read_settings(&self) -> ClResult<Option<serde_json::Value>> {
		setting::read(&self.db, SETTINGS_NAME).await
	}

	async fn write_settings(&self, value: &serde_json::Value) -> ClResult<WriteOutcome> {
		setting::write(&self.db, SETTINGS_NAME, value).await
	}

	async fn delete_settings(&self) -> ClResult<()> {
		setting::delete(&self.db, SETTINGS_NAME).await
	}
}

// vim: ts=4
