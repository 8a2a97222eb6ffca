//! Settings management handlers

use axum::{Json, extract::State};
use serde_json::Value;

use pausegate_core::auto_disable;
use pausegate_core::extract::Auth;
use pausegate_types::settings::SettingsRecord;

use crate::prelude::*;

/// GET /api/settings - the full record, merged with defaults
pub async fn get_settings(State(app): State<App>) -> ClResult<Json<SettingsRecord>> {
	let record = app.settings.get().await?;
	Ok(Json((*record).clone()))
}

/// POST /api/settings - merge a partial update, return the full record
pub async fn update_settings(
	State(app): State<App>,
	Auth(auth): Auth,
	Json(payload): Json<Value>,
) -> ClResult<Json<SettingsRecord>> {
	let record = app.settings.update_json(&payload).await?;
	info!(user = %auth.user, enabled = record.is_enabled, "Maintenance settings saved");

	auto_disable::sync_schedule(&app, &record);

	Ok(Json((*record).clone()))
}


// vim: ts=4
