//! Maintenance page rendering
//!
//! The page is a self-contained HTML document rendered with Handlebars. All
//! plain-text values are escaped by the template engine, the subheading is
//! passed through the constrained-HTML sanitizer again and every URL is
//! checked against the allowed schemes. When the template cannot be loaded
//! or fails to render, a short inline page is served instead.

use axum::{
	http::{HeaderMap, HeaderValue, StatusCode, header},
	response::{IntoResponse, Response},
};
use chrono::FixedOffset;
use handlebars::Handlebars;
use serde::Serialize;
use std::{path::Path, sync::Arc};

use pausegate_types::media_adapter::MediaAdapter;
use pausegate_types::settings::SettingsRecord;

use crate::countdown::{ReloadPlan, reload_plan};
use crate::prelude::*;
use crate::sanitize::Sanitizer;

const TEMPLATE_NAME: &str = "maintenance";
const DEFAULT_TEMPLATE: &str = include_str!("../templates/maintenance.html.hbs");

pub const FALLBACK_PAGE: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><meta name=\"robots\" content=\"noindex, nofollow\"><title>Maintenance</title></head>\n<body><h1>Maintenance Mode Active - Site is temporarily unavailable.</h1></body>\n</html>\n";

/// Seconds a client should wait before retrying
pub const RETRY_AFTER_SECS: u32 = 3600;

#[derive(Debug, Serialize)]
pub struct CtaView {
	pub label: String,
	pub url: String,
}

#[derive(Debug, Serialize)]
pub struct CountdownView {
	/// Target in milliseconds, as used by the page script
	pub target_ms: i64,
	pub expired: bool,
}

#[derive(Debug, Serialize)]
pub struct SilentReloadView {
	pub target_ms: i64,
}

/// Values handed to the template. Every key is always present.
#[derive(Debug, Serialize)]
pub struct PageView {
	pub lang: &'static str,
	pub seo_title: String,
	pub meta_description: String,
	pub heading: String,
	/// Sanitized constrained HTML, inserted unescaped
	pub subheading: String,
	pub logo_url: Option<String>,
	pub logo_alt: String,
	pub site_name: String,
	pub cta_buttons: Vec<CtaView>,
	pub countdown: Option<CountdownView>,
	pub silent_reload: Option<SilentReloadView>,
}

pub struct MaintenancePage {
	handlebars: Handlebars<'static>,
	sanitizer: Arc<Sanitizer>,
	site_name: Box<str>,
	timezone: FixedOffset,
}

impl std::fmt::Debug for MaintenancePage {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MaintenancePage")
			.field("site_name", &self.site_name)
			.field("timezone", &self.timezone)
			.field("template", &self.handlebars.has_template(TEMPLATE_NAME))
			.finish_non_exhaustive()
	}
}

impl MaintenancePage {
	/// Load the page template.
	///
	/// A custom template that cannot be read or compiled is logged and leaves
	/// the page without a template, so the fallback page is served.
	pub fn new(
		template_path: Option<&Path>,
		site_name: &str,
		timezone: FixedOffset,
		sanitizer: Arc<Sanitizer>,
	) -> Self {
		let mut handlebars = Handlebars::new();
		// Enable strict mode to catch undefined variables
		handlebars.set_strict_mode(true);

		let source = match template_path {
			Some(path) => match std::fs::read_to_string(path) {
				Ok(source) => {
					debug!("Loaded maintenance template: {}", path.display());
					Some(source)
				}
				Err(err) => {
					error!("Failed to read maintenance template {}: {}", path.display(), err);
					None
				}
			},
			None => Some(DEFAULT_TEMPLATE.to_string()),
		};

		if let Some(source) = source {
			if let Err(err) = handlebars.register_template_string(TEMPLATE_NAME, source) {
				error!("Failed to compile maintenance template: {}", err);
			}
		}

		Self { handlebars, sanitizer, site_name: site_name.into(), timezone }
	}

	/// Build the template values for the given settings
	pub fn view(&self, settings: &SettingsRecord, logo_url: Option<&str>, now: Timestamp) -> PageView {
		let logo_url =
			logo_url.map(|url| self.sanitizer.url(url)).filter(|url| !url.is_empty());
		let logo_alt = if settings.logo_alt.trim().is_empty() {
			self.site_name.to_string()
		} else {
			settings.logo_alt.clone()
		};

		let cta_buttons = settings
			.cta_buttons
			.iter()
			.map(|button| CtaView {
				label: button.label.trim().to_string(),
				url: self.sanitizer.url(&button.url),
			})
			.filter(|button| !button.label.is_empty() && !button.url.is_empty())
			.collect();

		let (countdown, silent_reload) = match reload_plan(settings, &self.timezone, now) {
			ReloadPlan::None => (None, None),
			ReloadPlan::Countdown { target, expired } => {
				(Some(CountdownView { target_ms: target.as_millis(), expired }), None)
			}
			ReloadPlan::Silent { target } => {
				(None, Some(SilentReloadView { target_ms: target.as_millis() }))
			}
		};

		PageView {
			lang: "en",
			seo_title: settings.seo_title.clone(),
			meta_description: settings.meta_description.trim().to_string(),
			heading: settings.heading.clone(),
			subheading: self.sanitizer.subheading(&settings.subheading),
			logo_url,
			logo_alt,
			site_name: self.site_name.to_string(),
			cta_buttons,
			countdown,
			silent_reload,
		}
	}

	pub fn render_html(&self, view: &PageView) -> ClResult<String> {
		if !self.handlebars.has_template(TEMPLATE_NAME) {
			return Err(Error::ConfigError("maintenance template not loaded".into()));
		}
		self.handlebars.render(TEMPLATE_NAME, view).map_err(|e| {
			Error::Internal(format!("Failed to render maintenance template: {}", e))
		})
	}

	/// Render the full 503 response. Never fails: errors produce the fallback page.
	pub async fn render(&self, settings: &SettingsRecord, media: &dyn MediaAdapter) -> Response {
		let logo_url = if settings.logo_id > 0 {
			match media.resolve_media_url(settings.logo_id).await {
				Ok(url) => url,
				Err(err) => {
					warn!("Failed to resolve logo {}: {}", settings.logo_id, err);
					None
				}
			}
		} else {
			None
		};

		let view = self.view(settings, logo_url.as_deref(), Timestamp::now());
		let body = match self.render_html(&view) {
			Ok(html) => html,
			Err(err) => {
				error!("{}", err);
				FALLBACK_PAGE.to_string()
			}
		};
		maintenance_response(body)
	}
}

/// Headers sent with every maintenance response
pub fn maintenance_headers() -> HeaderMap {
	let mut headers = HeaderMap::new();
	headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
	headers.insert(header::RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECS));
	headers.insert(
		header::CACHE_CONTROL,
		HeaderValue::from_static("no-cache, must-revalidate, max-age=0, no-store, private"),
	);
	headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
	headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
	headers.insert("x-robots-tag", HeaderValue::from_static("noindex, nofollow"));
	headers
}

pub fn maintenance_response(body: String) -> Response {
	(StatusCode::SERVICE_UNAVAILABLE, maintenance_headers(), body).into_response()
}

#[cfg(test)]
mod tests {
	use super::*;
	use pausegate_types::media_adapter::NoMedia;
	use pausegate_types::settings::CtaButton;
	use std::io::Write;

	fn page() -> MaintenancePage {
		let tz = crate::countdown::parse_utc_offset("UTC").unwrap();
		MaintenancePage::new(None, "Example Shop", tz, Arc::new(Sanitizer::new().unwrap()))
	}

	fn render(settings: &SettingsRecord, logo: Option<&str>, now: Timestamp) -> String {
		let page = page();
		page.render_html(&page.view(settings, logo, now)).unwrap()
	}

	#[test]
	fn test_default_page() {
		let html = render(&SettingsRecord::default(), None, Timestamp::now());
		assert!(html.contains("<title>Site Under Maintenance</title>"));
		assert!(html.contains("We&#x27;ll Be Right Back") || html.contains("We'll Be Right Back"));
		assert!(html.contains(r#"<meta name="robots" content="noindex, nofollow">"#));
		assert!(html.contains(r#"<meta name="description""#));
		assert!(html.contains(r#"class="pausegate-icon""#));
		assert!(html.contains(r#"<p class="pausegate-footer">Example Shop</p>"#));
		assert!(!html.contains(r#"class="pausegate-buttons""#));
		assert!(!html.contains("pausegate_reloaded"));
	}

	#[test]
	fn test_plain_text_is_escaped() {
		let settings = SettingsRecord {
			heading: "<script>alert(1)</script>".into(),
			seo_title: "A & B".into(),
			meta_description: String::new(),
			..Default::default()
		};
		let html = render(&settings, None, Timestamp::now());
		assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
		assert!(html.contains("<title>A &amp; B</title>"));
		assert!(!html.contains(r#"<meta name="description""#));
	}

	#[test]
	fn test_subheading_is_sanitized_again() {
		let settings = SettingsRecord {
			subheading: r#"Back <strong>soon</strong><img src=x onerror=alert(1)>"#.into(),
			..Default::default()
		};
		let html = render(&settings, None, Timestamp::now());
		assert!(html.contains("Back <strong>soon</strong>"));
		assert!(!html.contains("onerror"));
	}

	#[test]
	fn test_cta_buttons_skip_empty_and_unsafe() {
		let settings = SettingsRecord {
			cta_buttons: vec![
				CtaButton { label: "Status".into(), url: "https://status.example.com".into() },
				CtaButton { label: "".into(), url: "https://example.com".into() },
				CtaButton { label: "Evil".into(), url: "javascript:alert(1)".into() },
				CtaButton { label: "Mail".into(), url: "mailto:ops@example.com".into() },
			],
			..Default::default()
		};
		let html = render(&settings, None, Timestamp::now());
		assert!(html.contains(r#"href="https://status.example.com""#));
		assert!(html.contains(r#"href="mailto:ops@example.com""#));
		assert!(!html.contains("Evil"));
		assert!(!html.contains("javascript:"));
		assert_eq!(html.matches("class=\"pausegate-btn\"").count(), 2);
	}

	#[test]
	fn test_logo_and_alt_fallback() {
		let mut settings = SettingsRecord { logo_id: 5, ..Default::default() };
		let html = render(&settings, Some("/media/5.png"), Timestamp::now());
		assert!(html.contains(r#"<img src="/media/5.png" alt="Example Shop">"#));
		assert!(!html.contains(r#"class="pausegate-icon""#));

		settings.logo_alt = "Shop logo".into();
		let html = render(&settings, Some("/media/5.png"), Timestamp::now());
		assert!(html.contains(r#"alt="Shop logo""#));
	}

	#[test]
	fn test_countdown_markup() {
		let now = Timestamp(1_893_456_000);
		let mut settings = SettingsRecord {
			countdown_enabled: true,
			countdown_datetime: "2030-01-02T00:00".into(),
			..Default::default()
		};
		let html = render(&settings, None, now);
		assert!(html.contains(r#"data-target="1893542400000""#));
		assert!(html.contains("pausegate_reloaded"));
		assert!(!html.contains("pausegate-countdown pausegate-countdown--expired"));

		settings.countdown_datetime = "2029-12-31T00:00".into();
		let html = render(&settings, None, now);
		assert!(html.contains("pausegate-countdown pausegate-countdown--expired"));
	}

	#[test]
	fn test_silent_reload_without_visible_countdown() {
		let now = Timestamp(1_893_456_000);
		let mut settings = SettingsRecord {
			countdown_enabled: false,
			countdown_datetime: "2030-01-02T00:00".into(),
			..Default::default()
		};
		let html = render(&settings, None, now);
		assert!(!html.contains("id=\"pausegate-countdown\""));
		assert!(html.contains("var target = 1893542400000;"));
		assert!(html.contains("setInterval(check, 5000)"));

		settings.countdown_datetime = "2029-12-31T00:00".into();
		let html = render(&settings, None, now);
		assert!(!html.contains("pausegate_reloaded"));
	}

	#[tokio::test]
	async fn test_render_response_headers() {
		let response = page().render(&SettingsRecord::default(), &NoMedia).await;
		assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
		let headers = response.headers();
		assert_eq!(headers[header::RETRY_AFTER], "3600");
		assert_eq!(headers[header::CONTENT_TYPE], "text/html; charset=utf-8");
		assert_eq!(
			headers[header::CACHE_CONTROL],
			"no-cache, must-revalidate, max-age=0, no-store, private"
		);
		assert_eq!(headers[header::PRAGMA], "no-cache");
		assert_eq!(headers[header::EXPIRES], "0");
		assert_eq!(headers["x-robots-tag"], "noindex, nofollow");
	}

	#[test]
	fn test_missing_custom_template_uses_fallback() {
		let tz = crate::countdown::parse_utc_offset("UTC").unwrap();
		let sanitizer = Arc::new(Sanitizer::new().unwrap());
		let page = MaintenancePage::new(
			Some(Path::new("/nonexistent/maintenance.hbs")),
			"Site",
			tz,
			sanitizer,
		);
		let view = page.view(&SettingsRecord::default(), None, Timestamp::now());
		assert!(page.render_html(&view).is_err());
	}

	#[test]
	fn test_custom_template() {
		let dir = tempfile::TempDir::new().unwrap();
		let path = dir.path().join("custom.hbs");
		let mut file = std::fs::File::create(&path).unwrap();
		write!(file, "<h1>{{{{heading}}}}</h1><footer>{{{{site_name}}}}</footer>").unwrap();

		let tz = crate::countdown::parse_utc_offset("+01:00").unwrap();
		let sanitizer = Arc::new(Sanitizer::new().unwrap());
		let page = MaintenancePage::new(Some(path.as_path()), "Site", tz, sanitizer);
		let view = page.view(&SettingsRecord::default(), None, Timestamp::now());
		let html = page.render_html(&view).unwrap();
		assert_eq!(html, "<h1>We&#x27;ll Be Right Back</h1><footer>Site</footer>");
	}
}

// vim: ts=4
