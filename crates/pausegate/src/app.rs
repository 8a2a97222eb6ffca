//! App builder - constructs and runs the PauseGate server

use chrono::FixedOffset;
use std::{net::SocketAddr, sync::Arc};

use crate::prelude::*;
use crate::routes;
use pausegate_core::gate::ContextRules;
use pausegate_core::lifecycle;
use pausegate_types::identity_adapter::IdentityAdapter;
use pausegate_types::media_adapter::MediaAdapter;
use pausegate_types::settings_adapter::SettingsAdapter;

pub use pausegate_core::app::{Adapters, App, AppBuilderOpts, AppState, ServerMode, VERSION};

pub struct AppBuilder {
	opts: AppBuilderOpts,
	adapters: Adapters,
}

impl AppBuilder {
	pub fn new() -> Self {
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder { opts: AppBuilderOpts::default(), adapters: Adapters::default() }
	}

	// Opts
	pub fn mode(&mut self, mode: ServerMode) -> &mut Self {
		self.opts.mode = mode;
		self
	}
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	pub fn site_name(&mut self, site_name: impl Into<Box<str>>) -> &mut Self {
		self.opts.site_name = site_name.into();
		self
	}
	pub fn timezone(&mut self, timezone: FixedOffset) -> &mut Self {
		self.opts.timezone = timezone;
		self
	}
	pub fn template_path(&mut self, template_path: impl Into<Box<std::path::Path>>) -> &mut Self {
		self.opts.template_path = Some(template_path.into());
		self
	}
	pub fn dist_dir(&mut self, dist_dir: impl Into<Box<std::path::Path>>) -> &mut Self {
		self.opts.dist_dir = dist_dir.into();
		self
	}
	pub fn media_dir(&mut self, media_dir: impl Into<Box<std::path::Path>>) -> &mut Self {
		self.opts.media_dir = Some(media_dir.into());
		self
	}
	pub fn context_rules(&mut self, context_rules: ContextRules) -> &mut Self {
		self.opts.context_rules = context_rules;
		self
	}
	pub fn manager_roles(
		&mut self,
		manager_roles: impl IntoIterator<Item = impl Into<Box<str>>>,
	) -> &mut Self {
		self.opts.manager_roles = manager_roles.into_iter().map(Into::into).collect();
		self
	}
	pub fn auth_cookie(&mut self, auth_cookie: impl Into<Box<str>>) -> &mut Self {
		self.opts.auth_cookie = auth_cookie.into();
		self
	}
	pub fn disable_cache(&mut self, disable: bool) -> &mut Self {
		self.opts.disable_cache = disable;
		self
	}
	pub fn auto_disable_sweep(&mut self, cron: impl Into<Box<str>>) -> &mut Self {
		self.opts.auto_disable_sweep = cron.into();
		self
	}

	// Adapters
	pub fn settings_adapter(&mut self, settings_adapter: Arc<dyn SettingsAdapter>) -> &mut Self {
		self.adapters.settings_adapter = Some(settings_adapter);
		self
	}
	pub fn identity_adapter(&mut self, identity_adapter: Arc<dyn IdentityAdapter>) -> &mut Self {
		self.adapters.identity_adapter = Some(identity_adapter);
		self
	}
	pub fn media_adapter(&mut self, media_adapter: Arc<dyn MediaAdapter>) -> &mut Self {
		self.adapters.media_adapter = Some(media_adapter);
		self
	}

	/// Create the app state and install the settings record
	pub async fn build(self) -> ClResult<App> {
		let app = AppState::new(self.opts, self.adapters).inspect_err(|e| {
			error!("FATAL: {}", e);
		})?;
		lifecycle::install(&app).await.inspect_err(|e| {
			error!("FATAL: Install failed: {}", e);
		})?;
		Ok(app)
	}

	pub async fn run(self) -> ClResult<()> {
		info!("  ____                       ____       _");
		info!(" |  _ \\ __ _ _   _ ___  ___ / ___| __ _| |_ ___");
		info!(" | |_) / _` | | | / __|/ _ \\ |  _ / _` | __/ _ \\");
		info!(" |  __/ (_| | |_| \\__ \\  __/ |_| | (_| | ||  __/");
		info!(" |_|   \\__,_|\\__,_|___/\\___|\\____|\\__,_|\\__\\___|");
		info!("V{}", VERSION);
		info!("");

		let app = self.build().await?;
		let router = routes::init(app.clone());

		// Start scheduler
		app.scheduler.start(app.clone());

		let listener = tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await?;
		info!("Listening on {} ({:?} mode)", app.opts.listen, app.opts.mode);

		let served = axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
			.with_graceful_shutdown(shutdown_signal())
			.await;

		lifecycle::shutdown(&app);
		served?;
		info!("Server stopped");
		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		warn!("Failed to listen for shutdown signal: {}", e);
		std::future::pending::<()>().await;
	}
	info!("Shutdown signal received");
}

// vim: ts=4
