use std::{
	env,
	path::{Path, PathBuf},
	sync::Arc,
};

use pausegate::{AppBuilder, ServerMode, countdown, prelude::*};
use pausegate_media_adapter_fs::MediaAdapterFs;
use pausegate_settings_adapter_sqlite::SettingsAdapterSqlite;

mod identity_adapter;

use identity_adapter::StaticTokens;

pub struct Config {
	pub listen: String,
	pub mode: ServerMode,
	pub db_dir: PathBuf,
	pub dist_dir: PathBuf,
	pub media_dir: PathBuf,
	pub site_name: String,
	pub site_tz: String,
	pub template: Option<PathBuf>,
	pub tokens_file: Option<PathBuf>,
}

fn var(name: &str, default: &str) -> String {
	env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
	fn from_env() -> ClResult<Self> {
		let mode = match var("MODE", "proxy").to_ascii_lowercase().as_str() {
			"proxy" => ServerMode::Proxy,
			"standalone" => ServerMode::Standalone,
			other => return Err(Error::ConfigError(format!("invalid MODE '{}'", other))),
		};

		Ok(Config {
			listen: var("LISTEN", "127.0.0.1:8080"),
			mode,
			db_dir: PathBuf::from(var("DB_DIR", "./data")),
			dist_dir: PathBuf::from(var("DIST_DIR", "./dist")),
			media_dir: PathBuf::from(var("MEDIA_DIR", "./data/media")),
			site_name: var("SITE_NAME", "PauseGate"),
			site_tz: var("SITE_TZ", "UTC"),
			template: env::var("TEMPLATE").ok().filter(|t| !t.is_empty()).map(PathBuf::from),
			tokens_file: env::var("TOKENS_FILE").ok().filter(|t| !t.is_empty()).map(PathBuf::from),
		})
	}
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ClResult<()> {
	let config = Config::from_env()?;
	let uninstall = env::args().nth(1).is_some_and(|arg| arg == "uninstall");

	let mut builder = AppBuilder::new();
	builder
		.mode(config.mode)
		.listen(config.listen.as_str())
		.site_name(config.site_name.as_str())
		.timezone(countdown::parse_utc_offset(&config.site_tz)?)
		.dist_dir(config.dist_dir.as_path())
		.media_dir(config.media_dir.as_path());
	if let Some(template) = &config.template {
		builder.template_path(template.as_path());
	}

	builder.settings_adapter(Arc::new(SettingsAdapterSqlite::new(&config.db_dir).await?));
	builder.media_adapter(Arc::new(
		MediaAdapterFs::new(config.media_dir.as_path().into(), "/media").await?,
	));
	if let Some(tokens_file) = &config.tokens_file {
		builder.identity_adapter(Arc::new(load_tokens(tokens_file).await?));
	}

	if uninstall {
		let app = builder.build().await?;
		pausegate::lifecycle::uninstall(&app).await?;
		info!("Maintenance settings removed");
		return Ok(());
	}

	builder.run().await
}

async fn load_tokens(path: &Path) -> ClResult<StaticTokens> {
	let text = tokio::fs::read_to_string(path).await?;
	StaticTokens::from_json(&text)
}

// vim: ts=4
