//! Settings key-value store
//!
//! Values are stored as JSON text. A stored value that no longer parses is
//! reported as missing, so the defaults take over.

use sqlx::{Row, SqlitePool};

use pausegate::prelude::*;
use pausegate::settings_adapter::WriteOutcome;

fn parse(value: Option<String>, name: &str) -> Option<serde_json::Value> {
	let text = value?;
	serde_json::from_str(&text)
		.inspect_err(|err| warn!("Stored setting '{}' is not valid JSON: {}", name, err))
		.ok()
}

pub(crate) async fn read(db: &SqlitePool, name: &str) -> ClResult<Option<serde_json::Value>> {
	let row = sqlx::query("SELECT value FROM settings WHERE name = ?")
		.bind(name)
		.fetch_optional(db)
		.await
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)?;

	Ok(row.and_then(|r| parse(r.get("value"), name)))
}

/// Store a value. Writing the value that is already stored is `Unchanged`.
pub(crate) async fn write(
	db: &SqlitePool,
	name: &str,
	value: &serde_json::Value,
) -> ClResult<WriteOutcome> {
	let mut tx = db
		.begin()
		.await
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)?;

	let current = sqlx::query("SELECT value FROM settings WHERE name = ?")
		.bind(name)
		.fetch_optional(&mut *tx)
		.await
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)?
		.and_then(|r| parse(r.get("value"), name));

	if current.as_ref() == Some(value) {
		return Ok(WriteOutcome::Unchanged);
	}

	sqlx::query(
		"INSERT OR REPLACE INTO settings (name, value, updated_at) VALUES (?, ?, unixepoch())",
	)
	.bind(name)
	.bind(value.to_string())
	.execute(&mut *tx)
	.await
	.inspect_err(|err| warn!("DB: {:#?}", err))
	.map_err(|_| Error::DbError)?;

	tx.commit().await.inspect_err(|err| warn!("DB: {:#?}", err)).map_err(|_| Error::DbError)?;
	Ok(WriteOutcome::Updated)
}

pub(crate) async fn delete(db: &SqlitePool, name: &str) -> ClResult<()> {
	sqlx::query("DELETE FROM settings WHERE name = ?")
		.bind(name)
		.execute(db)
		.await
		.inspect_err(|err| warn!("DB: {:#?}", err))
		.map_err(|_| Error::DbError)?;
	Ok(())
}

// vim: ts=4
