//! Automatic end of maintenance at the countdown target
//!
//! Two paths lead to the same idempotent [`sweep`] check: a one-shot task
//! scheduled for the target time, and a periodic sweep that catches targets
//! missed while the server was down. The check reads the stored settings, so
//! a task scheduled from a record that was replaced since does nothing.

use async_trait::async_trait;
use chrono::FixedOffset;
use std::sync::Arc;

use pausegate_types::settings::SettingsRecord;

use crate::countdown::countdown_target;
use crate::prelude::*;
use crate::scheduler::Task;
use crate::settings::SettingsService;

pub const AUTO_DISABLE_TASK_KEY: &str = "maintenance.auto_disable";
pub const AUTO_DISABLE_SWEEP_KEY: &str = "maintenance.auto_disable_sweep";

/// Turn maintenance mode off. Returns `false` when it already was off.
pub async fn auto_disable(settings: &SettingsService) -> ClResult<bool> {
	disable_when(settings, |_| true).await
}

/// Disable maintenance if auto-disable is on and the target has passed
pub async fn sweep(
	settings: &SettingsService,
	timezone: &FixedOffset,
	now: Timestamp,
) -> ClResult<bool> {
	disable_when(settings, |record| {
		record.auto_disable_enabled
			&& countdown_target(&record.countdown_datetime, timezone)
				.is_some_and(|target| target <= now)
	})
	.await
}

async fn disable_when<F>(settings: &SettingsService, condition: F) -> ClResult<bool>
where
	F: FnOnce(&SettingsRecord) -> bool + Send,
{
	let changed = settings.disable_if(condition).await?;
	if changed {
		info!("maintenance mode auto-disabled");
	}
	Ok(changed)
}

#[derive(Debug)]
pub struct AutoDisableTask;

#[async_trait]
impl Task<App> for AutoDisableTask {
	fn kind_of(&self) -> &'static str {
		"maintenance.auto_disable"
	}

	async fn run(&self, app: &App) -> ClResult<()> {
		if !sweep(&app.settings, &app.opts.timezone, Timestamp::now()).await? {
			debug!("Auto-disable skipped, settings changed since scheduling");
		}
		Ok(())
	}
}

#[derive(Debug)]
pub struct AutoDisableSweepTask;

#[async_trait]
impl Task<App> for AutoDisableSweepTask {
	fn kind_of(&self) -> &'static str {
		"maintenance.auto_disable_sweep"
	}

	async fn run(&self, app: &App) -> ClResult<()> {
		sweep(&app.settings, &app.opts.timezone, Timestamp::now()).await?;
		Ok(())
	}
}

/// Bring the one-shot task in line with the current settings
pub fn sync_schedule(app: &App, record: &SettingsRecord) {
	let target = countdown_target(&record.countdown_datetime, &app.opts.timezone)
		.filter(|target| *target > Timestamp::now());

	match target {
		Some(target) if record.auto_disable_enabled => {
			app.scheduler.schedule_at(AUTO_DISABLE_TASK_KEY, Arc::new(AutoDisableTask), target);
			info!("Auto-disable scheduled at {}", target);
		}
		_ => {
			if app.scheduler.cancel(AUTO_DISABLE_TASK_KEY) {
				info!("Auto-disable unscheduled");
			}
		}
	}
}

/// Register the periodic sweep and the one-shot task for the stored settings
pub async fn register(app: &App) -> ClResult<()> {
	app.scheduler.schedule_cron(
		AUTO_DISABLE_SWEEP_KEY,
		Arc::new(AutoDisableSweepTask),
		&app.opts.auto_disable_sweep,
	)?;
	let record = app.settings.snapshot().await;
	sync_schedule(app, &record);
	Ok(())
}


// vim: ts=4
