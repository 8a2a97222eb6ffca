//! Maintenance gate
//!
//! Decides, per request, whether the visitor sees the site or the
//! maintenance page. The decision runs through four states in a fixed order:
//! bypass contexts first, then the global switch, then the visitor's access.

use axum::{
	body::Body,
	extract::State,
	http::{Request, request::Parts},
	middleware::Next,
	response::Response,
};
use std::sync::Arc;

use pausegate_types::identity::{AuthCtx, RequestIdentity};
use pausegate_types::identity_adapter::IdentityAdapter;
use pausegate_types::media_adapter::MediaAdapter;
use pausegate_types::settings::SettingsRecord;

use crate::access::can_access;
use crate::app::ServerMode;
use crate::extract::{Auth, extract_client_ip_parts, extract_token};
use crate::prelude::*;
use crate::render::MaintenancePage;
use crate::settings::SettingsService;

/// Which kind of request this is, as far as the gate cares
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
	pub is_admin_area: bool,
	pub is_ajax: bool,
	pub is_cron: bool,
	pub is_login_page: bool,
}

impl RequestContext {
	/// Requests in these contexts are never gated
	pub fn is_bypass(&self) -> bool {
		self.is_admin_area || self.is_ajax || self.is_cron || self.is_login_page
	}
}

/// Path rules mapping requests to a [`RequestContext`]
///
/// Contexts are derived from the request path only. Client-supplied headers
/// never exempt a request. Every admin prefix is served to anonymous
/// visitors during maintenance, so only add prefixes whose handlers do their
/// own authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextRules {
	pub admin_prefixes: Vec<Box<str>>,
	pub ajax_prefixes: Vec<Box<str>>,
	pub cron_prefixes: Vec<Box<str>>,
	/// Matched exactly, not as prefixes
	pub login_paths: Vec<Box<str>>,
}

impl Default for ContextRules {
	fn default() -> Self {
		Self {
			admin_prefixes: vec!["/api/settings".into()],
			ajax_prefixes: vec!["/ajax".into()],
			cron_prefixes: vec!["/cron".into()],
			login_paths: vec!["/login".into(), "/register".into()],
		}
	}
}

/// `/cron` matches `/cron` and `/cron/run`, but not `/crontab`
fn under_prefix(path: &str, prefix: &str) -> bool {
	match path.strip_prefix(prefix) {
		Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'),
		None => false,
	}
}

impl ContextRules {
	pub fn classify(&self, path: &str) -> RequestContext {
		let any_prefix = |prefixes: &[Box<str>]| prefixes.iter().any(|p| under_prefix(path, p));

		RequestContext {
			is_admin_area: any_prefix(&self.admin_prefixes),
			is_ajax: any_prefix(&self.ajax_prefixes),
			is_cron: any_prefix(&self.cron_prefixes),
			is_login_page: self.login_paths.iter().any(|p| p.as_ref() == path),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
	/// Admin, ajax, cron or login request
	BypassContext,
	/// Maintenance mode is off
	Disabled,
	/// Maintenance is on but this visitor may pass
	Allowed,
	/// Show the maintenance page
	Blocked,
}

impl GateState {
	pub fn intercepts(self) -> bool {
		matches!(self, GateState::Blocked)
	}
}

pub fn should_intercept(
	context: &RequestContext,
	settings: &SettingsRecord,
	identity: &RequestIdentity,
) -> GateState {
	if context.is_bypass() {
		GateState::BypassContext
	} else if !settings.is_enabled {
		GateState::Disabled
	} else if can_access(identity, settings) {
		GateState::Allowed
	} else {
		GateState::Blocked
	}
}

/// Outcome of [`Gate::check`]
#[derive(Debug)]
pub struct Decision {
	pub state: GateState,
	/// The settings snapshot used, `None` when it was not needed
	pub settings: Option<Arc<SettingsRecord>>,
	pub client_ip: Box<str>,
}

// Gate //
//******//
pub struct Gate {
	settings: Arc<SettingsService>,
	identity_adapter: Arc<dyn IdentityAdapter>,
	media_adapter: Arc<dyn MediaAdapter>,
	page: MaintenancePage,
	rules: ContextRules,
	mode: ServerMode,
	auth_cookie: Box<str>,
}

impl std::fmt::Debug for Gate {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Gate")
			.field("rules", &self.rules)
			.field("mode", &self.mode)
			.field("page", &self.page)
			.finish_non_exhaustive()
	}
}

pub struct GateOpts {
	pub settings: Arc<SettingsService>,
	pub identity_adapter: Arc<dyn IdentityAdapter>,
	pub media_adapter: Arc<dyn MediaAdapter>,
	pub page: MaintenancePage,
	pub rules: ContextRules,
	pub mode: ServerMode,
	pub auth_cookie: Box<str>,
}

impl Gate {
	pub fn new(opts: GateOpts) -> Self {
		Self {
			settings: opts.settings,
			identity_adapter: opts.identity_adapter,
			media_adapter: opts.media_adapter,
			page: opts.page,
			rules: opts.rules,
			mode: opts.mode,
			auth_cookie: opts.auth_cookie,
		}
	}

	pub fn classify(&self, parts: &Parts) -> RequestContext {
		self.rules.classify(parts.uri.path())
	}

	/// Resolve the authenticated principal, if any. Failures mean anonymous.
	async fn principal(&self, parts: &Parts) -> Option<AuthCtx> {
		if let Some(Auth(auth)) = parts.extensions.get::<Auth>() {
			return Some(auth.clone());
		}
		let token = extract_token(&parts.headers, &self.auth_cookie)?;
		match self.identity_adapter.authenticate(token).await {
			Ok(auth) => Some(auth),
			Err(err) => {
				debug!("Session token rejected: {}", err);
				None
			}
		}
	}

	pub async fn identify(&self, parts: &Parts) -> RequestIdentity {
		let client_ip = extract_client_ip_parts(parts, self.mode).unwrap_or_default();
		let auth = self.principal(parts).await;
		RequestIdentity::from_auth(auth.as_ref(), client_ip)
	}

	/// Run the decision for one request. Settings are read at most once.
	pub async fn check(&self, parts: &Parts) -> Decision {
		let context = self.classify(parts);
		if context.is_bypass() {
			return Decision { state: GateState::BypassContext, settings: None, client_ip: "".into() };
		}

		let settings = self.settings.snapshot().await;
		if !settings.is_enabled {
			return Decision { state: GateState::Disabled, settings: Some(settings), client_ip: "".into() };
		}

		let identity = self.identify(parts).await;
		let state = should_intercept(&context, &settings, &identity);
		Decision { state, settings: Some(settings), client_ip: identity.client_ip }
	}

	/// The maintenance response for the given settings
	pub async fn maintenance_page(&self, settings: &SettingsRecord) -> Response {
		self.page.render(settings, self.media_adapter.as_ref()).await
	}
}

/// Middleware that serves the maintenance page to blocked visitors
pub async fn maintenance_gate(
	State(gate): State<Arc<Gate>>,
	req: Request<Body>,
	next: Next,
) -> Response {
	let (parts, body) = req.into_parts();
	let decision = gate.check(&parts).await;

	match decision.settings {
		Some(settings) if decision.state.intercepts() => {
			info!("Maintenance page served to {} for {}", decision.client_ip, parts.uri.path());
			gate.maintenance_page(&settings).await
		}
		_ => {
			debug!("Gate pass-through ({:?}) for {}", decision.state, parts.uri.path());
			next.run(Request::from_parts(parts, body)).await
		}
	}
}


// vim: ts=4
