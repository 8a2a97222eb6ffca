//! Settings adapter storage tests

use pausegate::settings_adapter::{SettingsAdapter, WriteOutcome};
use pausegate_settings_adapter_sqlite::SettingsAdapterSqlite;
use serde_json::json;
use tempfile::TempDir;

async fn create_test_adapter() -> (SettingsAdapterSqlite, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = SettingsAdapterSqlite::new(temp_dir.path()).await.expect("Failed to create adapter");
	(adapter, temp_dir)
}

#[tokio::test]
async fn test_read_missing_record() {
	let (adapter, _temp) = create_test_adapter().await;
	let value = adapter.read_settings().await.expect("read should succeed");
	assert!(value.is_none());
}

#[tokio::test]
async fn test_write_and_read_back() {
	let (adapter, _temp) = create_test_adapter().await;
	let record = json!({ "is_enabled": true, "whitelisted_ips": ["203.0.113.7"] });

	let outcome = adapter.write_settings(&record).await.expect("write should succeed");
	assert_eq!(outcome, WriteOutcome::Updated);

	let stored = adapter.read_settings().await.expect("read should succeed");
	assert_eq!(stored, Some(record));
}

#[tokio::test]
async fn test_identical_write_is_unchanged() {
	let (adapter, _temp) = create_test_adapter().await;
	let record = json!({ "heading": "Back soon" });

	adapter.write_settings(&record).await.expect("first write");
	let outcome = adapter.write_settings(&record).await.expect("second write");
	assert_eq!(outcome, WriteOutcome::Unchanged);

	let outcome = adapter.write_settings(&json!({ "heading": "Later" })).await.expect("third write");
	assert_eq!(outcome, WriteOutcome::Updated);
}

#[tokio::test]
async fn test_delete_record() {
	let (adapter, _temp) = create_test_adapter().await;
	adapter.write_settings(&json!({ "is_enabled": true })).await.expect("write");
	adapter.delete_settings().await.expect("delete");
	assert!(adapter.read_settings().await.expect("read").is_none());

	// Deleting twice is fine
	adapter.delete_settings().await.expect("second delete");
}

#[tokio::test]
async fn test_record_survives_reopen() {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	{
		let adapter = SettingsAdapterSqlite::new(temp_dir.path()).await.expect("open");
		adapter.write_settings(&json!({ "logo_id": 12 })).await.expect("write");
	}
	let adapter = SettingsAdapterSqlite::new(temp_dir.path()).await.expect("reopen");
	let stored = adapter.read_settings().await.expect("read");
	assert_eq!(stored, Some(json!({ "logo_id": 12 })));
}

// vim: ts=4
