//! The maintenance settings record
//!
//! A single global record drives the gate. It is persisted as one JSON object
//! through a [`SettingsAdapter`](crate::settings_adapter::SettingsAdapter) and
//! always handed to consumers fully populated: missing or mistyped keys are
//! replaced by their defaults when the record is loaded.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_HEADING: &str = "We'll Be Right Back";
pub const DEFAULT_SUBHEADING: &str =
	"Our site is currently undergoing scheduled maintenance. Please check back soon.";
pub const DEFAULT_SEO_TITLE: &str = "Site Under Maintenance";
pub const DEFAULT_META_DESCRIPTION: &str =
	"We are currently performing scheduled maintenance. We will be back online shortly.";
pub const DEFAULT_BYPASS_ROLE: &str = "administrator";

/// Call-to-action link shown on the maintenance page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtaButton {
	#[serde(default)]
	pub label: String,
	#[serde(default)]
	pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsRecord {
	pub is_enabled: bool,
	pub heading: String,
	/// Constrained HTML: `a[href,target,rel]`, `br`, `strong`, `b`, `em`, `i`
	pub subheading: String,
	/// Media reference, 0 = no logo
	pub logo_id: u64,
	pub logo_alt: String,
	pub seo_title: String,
	pub meta_description: String,
	pub bypass_roles: Vec<String>,
	pub whitelisted_ips: Vec<String>,
	pub cta_buttons: Vec<CtaButton>,
	pub countdown_enabled: bool,
	/// Local date-time (`YYYY-MM-DDTHH:MM`) in the site timezone
	pub countdown_datetime: String,
	pub auto_disable_enabled: bool,
}

impl Default for SettingsRecord {
	fn default() -> Self {
		Self {
			is_enabled: false,
			heading: DEFAULT_HEADING.into(),
			subheading: DEFAULT_SUBHEADING.into(),
			logo_id: 0,
			logo_alt: String::new(),
			seo_title: DEFAULT_SEO_TITLE.into(),
			meta_description: DEFAULT_META_DESCRIPTION.into(),
			bypass_roles: vec![DEFAULT_BYPASS_ROLE.into()],
			whitelisted_ips: Vec::new(),
			cta_buttons: Vec::new(),
			countdown_enabled: false,
			countdown_datetime: String::new(),
			auto_disable_enabled: false,
		}
	}
}

/// Partial update. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
	pub is_enabled: Option<bool>,
	pub heading: Option<String>,
	pub subheading: Option<String>,
	pub logo_id: Option<u64>,
	pub logo_alt: Option<String>,
	pub seo_title: Option<String>,
	pub meta_description: Option<String>,
	pub bypass_roles: Option<Vec<String>>,
	pub whitelisted_ips: Option<Vec<String>>,
	pub cta_buttons: Option<Vec<CtaButton>>,
	pub countdown_enabled: Option<bool>,
	pub countdown_datetime: Option<String>,
	pub auto_disable_enabled: Option<bool>,
}

impl SettingsPatch {
	/// Coerce a raw JSON object into a patch without sanitizing text.
	///
	/// Keys with values that cannot be coerced are left out of the patch.
	pub fn from_json(value: &Value) -> Self {
		let Some(obj) = value.as_object() else {
			return Self::default();
		};
		let get = |key: &str| obj.get(key).filter(|v| !v.is_null());

		Self {
			is_enabled: get("is_enabled").and_then(coerce_bool),
			heading: get("heading").and_then(coerce_string),
			subheading: get("subheading").and_then(coerce_string),
			logo_id: get("logo_id").and_then(coerce_absint),
			logo_alt: get("logo_alt").and_then(coerce_string),
			seo_title: get("seo_title").and_then(coerce_string),
			meta_description: get("meta_description").and_then(coerce_string),
			bypass_roles: get("bypass_roles").and_then(coerce_string_list),
			whitelisted_ips: get("whitelisted_ips").and_then(coerce_string_list),
			cta_buttons: get("cta_buttons").and_then(coerce_cta_buttons),
			countdown_enabled: get("countdown_enabled").and_then(coerce_bool),
			countdown_datetime: get("countdown_datetime").and_then(coerce_string),
			auto_disable_enabled: get("auto_disable_enabled").and_then(coerce_bool),
		}
	}

	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}
}

impl SettingsRecord {
	/// Load a stored JSON value, merging it over the defaults key by key
	pub fn from_stored(value: &Value) -> Self {
		let mut record = Self::default();
		record.apply(SettingsPatch::from_json(value));
		record
	}

	/// Merge a patch over this record, per key
	pub fn apply(&mut self, patch: SettingsPatch) {
		fn set<T>(dst: &mut T, src: Option<T>) {
			if let Some(v) = src {
				*dst = v;
			}
		}

		set(&mut self.is_enabled, patch.is_enabled);
		set(&mut self.heading, patch.heading);
		set(&mut self.subheading, patch.subheading);
		set(&mut self.logo_id, patch.logo_id);
		set(&mut self.logo_alt, patch.logo_alt);
		set(&mut self.seo_title, patch.seo_title);
		set(&mut self.meta_description, patch.meta_description);
		set(&mut self.bypass_roles, patch.bypass_roles);
		set(&mut self.whitelisted_ips, patch.whitelisted_ips);
		set(&mut self.cta_buttons, patch.cta_buttons);
		set(&mut self.countdown_enabled, patch.countdown_enabled);
		set(&mut self.countdown_datetime, patch.countdown_datetime);
		set(&mut self.auto_disable_enabled, patch.auto_disable_enabled);
	}

	pub fn to_value(&self) -> Value {
		serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
	}
}

impl<'de> Deserialize<'de> for SettingsRecord {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let value = Value::deserialize(deserializer)?;
		Ok(Self::from_stored(&value))
	}
}

// Coercion helpers //
//******************//
pub fn coerce_bool(value: &Value) -> Option<bool> {
	match value {
		Value::Bool(b) => Some(*b),
		Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
		Value::String(s) => {
			let s = s.trim();
			Some(!(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")))
		}
		_ => None,
	}
}

/// Absolute integer value, like an attachment id
pub fn coerce_absint(value: &Value) -> Option<u64> {
	match value {
		Value::Number(n) => n
			.as_u64()
			.or_else(|| n.as_i64().map(i64::unsigned_abs))
			// `as` saturates out-of-range floats
			.or_else(|| n.as_f64().map(|f| f.abs().trunc() as u64)),
		Value::String(s) => s.trim().parse::<i64>().ok().map(i64::unsigned_abs),
		Value::Bool(b) => Some(u64::from(*b)),
		_ => None,
	}
}

pub fn coerce_string(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		_ => None,
	}
}

pub fn coerce_string_list(value: &Value) -> Option<Vec<String>> {
	match value {
		Value::Array(items) => Some(items.iter().filter_map(coerce_string).collect()),
		_ => None,
	}
}

pub fn coerce_cta_buttons(value: &Value) -> Option<Vec<CtaButton>> {
	let Value::Array(items) = value else {
		return None;
	};
	Some(
		items
			.iter()
			.filter_map(Value::as_object)
			.map(|obj| CtaButton {
				label: obj.get("label").and_then(coerce_string).unwrap_or_default(),
				url: obj.get("url").and_then(coerce_string).unwrap_or_default(),
			})
			.collect(),
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_defaults_fill_missing_keys() {
		let record = SettingsRecord::from_stored(&json!({ "is_enabled": true }));
		assert!(record.is_enabled);
		assert_eq!(record.heading, DEFAULT_HEADING);
		assert_eq!(record.bypass_roles, vec!["administrator".to_string()]);
		assert!(record.whitelisted_ips.is_empty());
	}

	#[test]
	fn test_non_object_yields_defaults() {
		assert_eq!(SettingsRecord::from_stored(&json!("garbage")), SettingsRecord::default());
		assert_eq!(SettingsRecord::from_stored(&Value::Null), SettingsRecord::default());
	}

	#[test]
	fn test_mistyped_values_degrade_to_defaults() {
		let record = SettingsRecord::from_stored(&json!({
			"logo_id": "not a number",
			"bypass_roles": "editor",
			"cta_buttons": { "label": "x" },
			"heading": null,
		}));
		assert_eq!(record.logo_id, 0);
		assert_eq!(record.bypass_roles, vec!["administrator".to_string()]);
		assert!(record.cta_buttons.is_empty());
		assert_eq!(record.heading, DEFAULT_HEADING);
	}

	#[test]
	fn test_coercions() {
		assert_eq!(coerce_bool(&json!(1)), Some(true));
		assert_eq!(coerce_bool(&json!("0")), Some(false));
		assert_eq!(coerce_bool(&json!("false")), Some(false));
		assert_eq!(coerce_bool(&json!("yes")), Some(true));
		assert_eq!(coerce_bool(&json!([])), None);
		assert_eq!(coerce_absint(&json!(-42)), Some(42));
		assert_eq!(coerce_absint(&json!(" 17 ")), Some(17));
		assert_eq!(coerce_absint(&json!(3.9)), Some(3));
		assert_eq!(coerce_string_list(&json!(["a", 2, null])), Some(vec!["a".into(), "2".into()]));
	}

	#[test]
	fn test_cta_buttons_missing_fields() {
		let buttons = coerce_cta_buttons(&json!([{ "label": "Shop" }, 5, { "url": "/x" }])).unwrap();
		assert_eq!(
			buttons,
			vec![
				CtaButton { label: "Shop".into(), url: String::new() },
				CtaButton { label: String::new(), url: "/x".into() },
			]
		);
	}

	#[test]
	fn test_patch_merge_is_per_key() {
		let mut record = SettingsRecord { heading: "Custom".into(), ..Default::default() };
		record.apply(SettingsPatch { is_enabled: Some(true), ..Default::default() });
		assert!(record.is_enabled);
		assert_eq!(record.heading, "Custom");
	}

	#[test]
	fn test_deserialize_is_lenient() {
		let record: SettingsRecord =
			serde_json::from_str(r#"{"is_enabled":"1","logo_id":7}"#).unwrap();
		assert!(record.is_enabled);
		assert_eq!(record.logo_id, 7);
		assert_eq!(record.seo_title, DEFAULT_SEO_TITLE);
	}

	#[test]
	fn test_serialized_record_has_every_key() {
		let value = SettingsRecord::default().to_value();
		let obj = value.as_object().unwrap();
		for key in [
			"is_enabled",
			"heading",
			"subheading",
			"logo_id",
			"logo_alt",
			"seo_title",
			"meta_description",
			"bypass_roles",
			"whitelisted_ips",
			"cta_buttons",
			"countdown_enabled",
			"countdown_datetime",
			"auto_disable_enabled",
		] {
			assert!(obj.contains_key(key), "missing {}", key);
		}
	}
}

// vim: ts=4
