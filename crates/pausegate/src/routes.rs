//! Top-level router: the gated site, the settings API and media

use axum::{Router, middleware};
use tower_http::{services::ServeDir, trace::TraceLayer};

use pausegate_core::gate::maintenance_gate;

use crate::prelude::*;

/// Everything behind the maintenance gate
fn init_protected(app: &App) -> Router {
	Router::new()
		.merge(pausegate_admin::router(app.clone()))
		.fallback_service(ServeDir::new(&app.opts.dist_dir))
		.layer(middleware::from_fn_with_state(app.gate.clone(), maintenance_gate))
}

pub fn init(app: App) -> Router {
	let mut router = Router::new();
	if let Some(media_dir) = &app.opts.media_dir {
		router = router.nest_service("/media", ServeDir::new(media_dir));
	}

	router.merge(init_protected(&app)).layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::{
		body::Body,
		http::{Request, StatusCode},
	};
	use http_body_util::BodyExt;
	use pausegate_core::{Adapters, AppBuilderOpts, AppState};
	use pausegate_types::settings_adapter::{MemorySettingsAdapter, SettingsAdapter};
	use serde_json::json;
	use std::sync::Arc;
	use tower::ServiceExt;

	struct Site {
		_dist: tempfile::TempDir,
		_media: tempfile::TempDir,
		router: Router,
	}

	fn site(stored: serde_json::Value) -> Site {
		let dist = tempfile::TempDir::new().unwrap();
		std::fs::write(dist.path().join("index.html"), "<h1>Live site</h1>").unwrap();
		let media = tempfile::TempDir::new().unwrap();
		std::fs::write(media.path().join("3.png"), b"png").unwrap();

		let opts = AppBuilderOpts {
			dist_dir: dist.path().into(),
			media_dir: Some(media.path().into()),
			..Default::default()
		};
		let adapters = Adapters {
			settings_adapter: Some(
				Arc::new(MemorySettingsAdapter::with_value(stored)) as Arc<dyn SettingsAdapter>
			),
			..Default::default()
		};
		let app = AppState::new(opts, adapters).unwrap();
		Site { _dist: dist, _media: media, router: init(app) }
	}

	async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
		let req = Request::get(uri)
			.header("x-forwarded-for", "198.51.100.20")
			.body(Body::empty())
			.unwrap();
		let response = router.clone().oneshot(req).await.unwrap();
		let status = response.status();
		let body = response.into_body().collect().await.unwrap().to_bytes();
		(status, String::from_utf8_lossy(&body).into_owned())
	}

	#[tokio::test]
	async fn test_site_served_when_disabled() {
		let site = site(json!({ "is_enabled": false }));
		let (status, body) = get(&site.router, "/").await;
		assert_eq!(status, StatusCode::OK);
		assert!(body.contains("Live site"));
	}

	#[tokio::test]
	async fn test_site_gated_when_enabled() {
		let site = site(json!({ "is_enabled": true }));
		let (status, body) = get(&site.router, "/").await;
		assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
		assert!(!body.contains("Live site"));

		// Settings API is an admin context: it answers with 401, not the page
		let (status, _) = get(&site.router, "/api/settings").await;
		assert_eq!(status, StatusCode::UNAUTHORIZED);

		// Media stays reachable for the maintenance page logo
		let (status, body) = get(&site.router, "/media/3.png").await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body, "png");
	}
}

// vim: ts=4
