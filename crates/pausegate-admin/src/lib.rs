//! Admin API handlers: reading and changing the maintenance settings

pub mod perm;
pub mod settings;

mod prelude;

use axum::{Router, middleware, routing::get};

use pausegate_core::middleware::optional_auth;

use crate::prelude::*;

/// Routes of the settings API, guarded by the manager role check
pub fn router(app: App) -> Router {
	Router::new()
		.route("/api/settings", get(settings::get_settings).post(settings::update_settings))
		.layer(middleware::from_fn_with_state(app.clone(), perm::require_manager))
		.layer(middleware::from_fn_with_state(app.clone(), optional_auth))
		.with_state(app)
}

// vim: ts=4
