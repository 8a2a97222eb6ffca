//! Install, shutdown and uninstall of the maintenance subsystem

use crate::auto_disable;
use crate::prelude::*;

/// Make sure a complete settings record is stored and register the
/// auto-disable tasks. Run once at server start.
pub async fn install(app: &App) -> ClResult<()> {
	app.settings.install().await?;
	auto_disable::register(app).await?;
	Ok(())
}

/// Stop scheduled work. The stored settings are kept.
pub fn shutdown(app: &App) {
	app.scheduler.shutdown();
}

/// Stop scheduled work and delete the stored settings
pub async fn uninstall(app: &App) -> ClResult<()> {
	shutdown(app);
	app.settings.uninstall().await
}

#[cfg(test)]
mod tests {
	use super::*;
	use pausegate_types::settings_adapter::{MemorySettingsAdapter, SettingsAdapter};
	use serde_json::json;
	use std::sync::Arc;

	use crate::app::{Adapters, AppBuilderOpts, AppState};
	use crate::auto_disable::{AUTO_DISABLE_SWEEP_KEY, AUTO_DISABLE_TASK_KEY};

	fn app(adapter: Arc<MemorySettingsAdapter>) -> App {
		let adapters = Adapters {
			settings_adapter: Some(adapter as Arc<dyn SettingsAdapter>),
			..Default::default()
		};
		AppState::new(AppBuilderOpts::default(), adapters).unwrap()
	}

	#[tokio::test]
	async fn test_install_shutdown_uninstall() {
		let adapter = Arc::new(MemorySettingsAdapter::with_value(json!({
			"is_enabled": true,
			"auto_disable_enabled": true,
			"countdown_datetime": "2999-06-01T12:00",
		})));
		let app = app(adapter.clone());

		install(&app).await.unwrap();
		let stored = adapter.read_settings().await.unwrap().unwrap();
		assert_eq!(stored["is_enabled"], json!(true));
		assert_eq!(stored["seo_title"], "Site Under Maintenance");
		assert!(app.scheduler.is_scheduled(AUTO_DISABLE_SWEEP_KEY));
		assert!(app.scheduler.is_scheduled(AUTO_DISABLE_TASK_KEY));

		shutdown(&app);
		assert!(!app.scheduler.is_scheduled(AUTO_DISABLE_TASK_KEY));
		assert!(adapter.read_settings().await.unwrap().is_some());

		uninstall(&app).await.unwrap();
		assert!(adapter.read_settings().await.unwrap().is_none());
	}
}

// vim: ts=4
