//! App state type

use chrono::{FixedOffset, Offset, Utc};
use std::{path::Path, sync::Arc};

use pausegate_types::identity_adapter::{IdentityAdapter, NoIdentity};
use pausegate_types::media_adapter::{MediaAdapter, NoMedia};
use pausegate_types::settings_adapter::SettingsAdapter;

use crate::gate::{ContextRules, Gate, GateOpts};
use crate::prelude::*;
use crate::render::MaintenancePage;
use crate::sanitize::Sanitizer;
use crate::scheduler;
use crate::settings::SettingsService;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How the client address is determined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ServerMode {
	/// Only the socket peer address is trusted
	Standalone,
	/// Forwarding headers set by a reverse proxy or CDN are honoured
	#[default]
	Proxy,
}

pub struct AppState {
	pub scheduler: Arc<scheduler::Scheduler<App>>,
	pub opts: AppBuilderOpts,

	pub identity_adapter: Arc<dyn IdentityAdapter>,

	pub settings: Arc<SettingsService>,
	pub gate: Arc<Gate>,
}

impl std::fmt::Debug for AppState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppState").field("opts", &self.opts).finish_non_exhaustive()
	}
}

impl AppState {
	/// Wire the subsystems together. The settings adapter is mandatory.
	pub fn new(opts: AppBuilderOpts, adapters: Adapters) -> ClResult<App> {
		let settings_adapter = adapters
			.settings_adapter
			.ok_or_else(|| Error::ConfigError("settings adapter not configured".into()))?;
		let identity_adapter = adapters.identity_adapter.unwrap_or_else(|| {
			warn!("No identity adapter configured, role bypass is unavailable");
			Arc::new(NoIdentity)
		});
		let media_adapter: Arc<dyn MediaAdapter> =
			adapters.media_adapter.unwrap_or_else(|| Arc::new(NoMedia));

		let sanitizer = Arc::new(Sanitizer::new()?);
		let settings = Arc::new(SettingsService::new(
			settings_adapter,
			sanitizer.clone(),
			!opts.disable_cache,
		));
		let page = MaintenancePage::new(
			opts.template_path.as_deref(),
			&opts.site_name,
			opts.timezone,
			sanitizer,
		);
		let gate = Arc::new(Gate::new(GateOpts {
			settings: settings.clone(),
			identity_adapter: identity_adapter.clone(),
			media_adapter,
			page,
			rules: opts.context_rules.clone(),
			mode: opts.mode,
			auth_cookie: opts.auth_cookie.clone(),
		}));

		Ok(Arc::new(Self {
			scheduler: scheduler::Scheduler::new(),
			opts,
			identity_adapter,
			settings,
			gate,
		}))
	}
}

pub type App = Arc<AppState>;

#[derive(Default)]
pub struct Adapters {
	pub settings_adapter: Option<Arc<dyn SettingsAdapter>>,
	pub identity_adapter: Option<Arc<dyn IdentityAdapter>>,
	pub media_adapter: Option<Arc<dyn MediaAdapter>>,
}

#[derive(Debug, Clone)]
pub struct AppBuilderOpts {
	pub mode: ServerMode,
	pub listen: Box<str>,
	/// Shown in the page title and as logo alt text fallback
	pub site_name: Box<str>,
	/// Site timezone used to interpret the countdown date-time
	pub timezone: FixedOffset,
	/// Custom maintenance page template, the built-in one is used if `None`
	pub template_path: Option<Box<Path>>,
	/// Static site served behind the gate
	pub dist_dir: Box<Path>,
	/// Media files served under `/media`, reachable while maintenance is on
	pub media_dir: Option<Box<Path>>,
	pub context_rules: ContextRules,
	/// Roles allowed to read and change the maintenance settings
	pub manager_roles: Box<[Box<str>]>,
	pub auth_cookie: Box<str>,
	/// Disable the settings snapshot cache (for development)
	pub disable_cache: bool,
	/// Cron expression of the auto-disable safety sweep
	pub auto_disable_sweep: Box<str>,
}

impl Default for AppBuilderOpts {
	fn default() -> Self {
		Self {
			mode: ServerMode::default(),
			listen: "127.0.0.1:8080".into(),
			site_name: "PauseGate".into(),
			timezone: Utc.fix(),
			template_path: None,
			dist_dir: Path::new("./dist").into(),
			media_dir: None,
			context_rules: ContextRules::default(),
			manager_roles: Box::new(["administrator".into()]),
			auth_cookie: "pausegate_session".into(),
			disable_cache: false,
			auto_disable_sweep: "0 * * * *".into(),
		}
	}
}

// vim: ts=4
