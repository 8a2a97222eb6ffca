//! Settings service with snapshot caching and sanitized writes

use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;

use pausegate_types::settings::{SettingsPatch, SettingsRecord};
use pausegate_types::settings_adapter::{SettingsAdapter, WriteOutcome};

use crate::prelude::*;
use crate::sanitize::Sanitizer;

/// Settings service - main interface for reading and updating the maintenance record
pub struct SettingsService {
	adapter: Arc<dyn SettingsAdapter>,
	sanitizer: Arc<Sanitizer>,
	cache: RwLock<Option<Arc<SettingsRecord>>>,
	cache_enabled: bool,
	/// Serializes read-modify-write cycles
	write_lock: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for SettingsService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SettingsService")
			.field("adapter", &self.adapter)
			.field("cache_enabled", &self.cache_enabled)
			.finish_non_exhaustive()
	}
}

impl SettingsService {
	pub fn new(adapter: Arc<dyn SettingsAdapter>, sanitizer: Arc<Sanitizer>, cache_enabled: bool) -> Self {
		Self {
			adapter,
			sanitizer,
			cache: RwLock::new(None),
			cache_enabled,
			write_lock: tokio::sync::Mutex::new(()),
		}
	}

	/// Load the record, merged with defaults
	pub async fn get(&self) -> ClResult<Arc<SettingsRecord>> {
		if self.cache_enabled {
			if let Some(record) = self.cache.read().as_ref() {
				return Ok(record.clone());
			}
		}

		let record = match self.adapter.read_settings().await? {
			Some(stored) => SettingsRecord::from_stored(&stored),
			None => SettingsRecord::default(),
		};
		let record = Arc::new(record);
		if self.cache_enabled {
			*self.cache.write() = Some(record.clone());
		}
		Ok(record)
	}

	/// Like [`get`](Self::get), but falls back to defaults when storage fails
	pub async fn snapshot(&self) -> Arc<SettingsRecord> {
		match self.get().await {
			Ok(record) => record,
			Err(err) => {
				warn!("settings read failed, using defaults: {}", err);
				Arc::new(SettingsRecord::default())
			}
		}
	}

	/// Apply a raw JSON patch after sanitizing it
	pub async fn update_json(&self, raw: &Value) -> ClResult<Arc<SettingsRecord>> {
		if !raw.is_object() {
			return Err(Error::ValidationError("settings payload must be an object".into()));
		}
		let patch = self.sanitizer.settings_patch(raw);
		self.update(patch).await
	}

	/// Apply an already sanitized patch and persist the result
	pub async fn update(&self, patch: SettingsPatch) -> ClResult<Arc<SettingsRecord>> {
		let _guard = self.write_lock.lock().await;

		let mut record = (*self.get().await?).clone();
		if patch.is_empty() {
			return Ok(Arc::new(record));
		}
		record.apply(patch);
		self.store(record).await
	}

	async fn store(&self, record: SettingsRecord) -> ClResult<Arc<SettingsRecord>> {
		match self.adapter.write_settings(&record.to_value()).await {
			Ok(WriteOutcome::Updated) => info!("maintenance settings updated"),
			Ok(WriteOutcome::Unchanged) => debug!("maintenance settings unchanged"),
			Err(err) => {
				error!("failed to write maintenance settings: {}", err);
				self.invalidate();
				return Err(Error::SettingsWrite);
			}
		}

		let record = Arc::new(record);
		if self.cache_enabled {
			*self.cache.write() = Some(record.clone());
		}
		Ok(record)
	}

	/// Turn maintenance off. Returns `true` if the flag was actually flipped.
	pub async fn disable(&self) -> ClResult<bool> {
		self.disable_if(|_| true).await
	}

	/// Turn maintenance off if `condition` holds for the current record.
	///
	/// The condition is evaluated under the write lock, so no update can slip
	/// in between the check and the write.
	pub async fn disable_if<F>(&self, condition: F) -> ClResult<bool>
	where
		F: FnOnce(&SettingsRecord) -> bool + Send,
	{
		let _guard = self.write_lock.lock().await;

		let current = self.get().await?;
		if !current.is_enabled || !condition(&current) {
			return Ok(false);
		}
		let mut record = (*current).clone();
		record.is_enabled = false;
		self.store(record).await?;
		Ok(true)
	}

	/// Seed the stored record with defaults, or complete an existing one
	pub async fn install(&self) -> ClResult<()> {
		let _guard = self.write_lock.lock().await;

		match self.adapter.read_settings().await? {
			Some(stored) => {
				self.store(SettingsRecord::from_stored(&stored)).await?;
				debug!("maintenance settings merged with defaults");
			}
			None => {
				self.store(SettingsRecord::default()).await?;
				info!("maintenance settings installed with defaults");
			}
		}
		Ok(())
	}

	/// Remove the stored record
	pub async fn uninstall(&self) -> ClResult<()> {
		let _guard = self.write_lock.lock().await;

		self.adapter.delete_settings().await?;
		self.invalidate();
		info!("maintenance settings removed");
		Ok(())
	}

	pub fn invalidate(&self) {
		*self.cache.write() = None;
	}
}


// vim: ts=4
