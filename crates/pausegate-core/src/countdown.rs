//! Countdown target computation and the page reload plan

use chrono::{FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};

use pausegate_types::settings::SettingsRecord;

use crate::prelude::*;

/// Accepted layouts for the countdown date-time
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parse a site timezone given as a UTC offset such as "+02:00", or "UTC"
pub fn parse_utc_offset(input: &str) -> ClResult<FixedOffset> {
	let input = input.trim();
	if input.is_empty() || input.eq_ignore_ascii_case("utc") || input.eq_ignore_ascii_case("z") {
		return Ok(Utc.fix());
	}
	input
		.parse::<FixedOffset>()
		.map_err(|e| Error::ConfigError(format!("invalid timezone offset '{}': {}", input, e)))
}

/// Convert the configured local date-time to a timestamp.
///
/// Returns `None` for empty or malformed values and for targets at or before
/// the epoch, which all mean "no countdown".
pub fn countdown_target(datetime: &str, timezone: &FixedOffset) -> Option<Timestamp> {
	let datetime = datetime.trim();
	if datetime.is_empty() {
		return None;
	}
	let naive = DATETIME_FORMATS
		.iter()
		.find_map(|fmt| NaiveDateTime::parse_from_str(datetime, fmt).ok())?;
	let local = timezone.from_local_datetime(&naive).single()?;
	let ts = local.timestamp();
	(ts > 0).then_some(Timestamp(ts))
}

/// What the page should do about the end of maintenance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadPlan {
	None,
	/// Visible countdown; `expired` when the target had already passed at render time
	Countdown { target: Timestamp, expired: bool },
	/// No visible timer, but reload once the target passes
	Silent { target: Timestamp },
}

pub fn reload_plan(settings: &SettingsRecord, timezone: &FixedOffset, now: Timestamp) -> ReloadPlan {
	let Some(target) = countdown_target(&settings.countdown_datetime, timezone) else {
		return ReloadPlan::None;
	};

	if settings.countdown_enabled {
		ReloadPlan::Countdown { target, expired: target <= now }
	} else if target > now {
		ReloadPlan::Silent { target }
	} else {
		ReloadPlan::None
	}
}


// vim: ts=4
