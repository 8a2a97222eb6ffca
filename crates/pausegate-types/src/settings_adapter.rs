//! Adapter that persists the settings record.
//!
//! The record is stored as a single JSON document. Adapters do not interpret
//! it; merging with defaults happens in the settings service.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::prelude::*;

/// Result of a successful write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
	Updated,
	/// The stored document already matched. Not an error.
	Unchanged,
}

#[async_trait]
pub trait SettingsAdapter: Debug + Send + Sync {
	/// Read the stored document, `None` if it was never written
	async fn read_settings(&self) -> ClResult<Option<serde_json::Value>>;

	/// Replace the stored document
	async fn write_settings(&self, value: &serde_json::Value) -> ClResult<WriteOutcome>;

	/// Remove the stored document
	async fn delete_settings(&self) -> ClResult<()>;
}

/// Process-local settings storage, used for tests and ephemeral deployments
#[derive(Debug, Default)]
pub struct MemorySettingsAdapter {
	value: Mutex<Option<serde_json::Value>>,
	writes: AtomicUsize,
	fail_writes: AtomicBool,
}

impl MemorySettingsAdapter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_value(value: serde_json::Value) -> Self {
		Self { value: Mutex::new(Some(value)), ..Default::default() }
	}

	/// Number of `write_settings` calls that reached the store
	pub fn writes(&self) -> usize {
		self.writes.load(Ordering::SeqCst)
	}

	/// Make subsequent writes fail with `Error::DbError`
	pub fn fail_writes(&self, fail: bool) {
		self.fail_writes.store(fail, Ordering::SeqCst);
	}
}

#[async_trait]
impl SettingsAdapter for MemorySettingsAdapter {
	async fn read_settings(&self) -> ClResult<Option<serde_json::Value>> {
		Ok(self.value.lock().clone())
	}

	async fn write_settings(&self, value: &serde_json::Value) -> ClResult<WriteOutcome> {
		if self.fail_writes.load(Ordering::SeqCst) {
			return Err(Error::DbError);
		}
		self.writes.fetch_add(1, Ordering::SeqCst);
		let mut stored = self.value.lock();
		if stored.as_ref() == Some(value) {
			return Ok(WriteOutcome::Unchanged);
		}
		*stored = Some(value.clone());
		Ok(WriteOutcome::Updated)
	}

	async fn delete_settings(&self) -> ClResult<()> {
		*self.value.lock() = None;
		Ok(())
	}
}


// vim: ts=4
