//! Text, URL and constrained-HTML sanitization.
//!
//! Used twice: when settings are ingested (stored data integrity) and again
//! when the maintenance page is rendered (output safety). Both layers use the
//! same allow-list.

use std::net::IpAddr;

use regex::{Captures, Regex};
use serde_json::Value;

use pausegate_types::settings::{CtaButton, SettingsPatch};

use crate::prelude::*;

/// Tags allowed in the subheading. Only `a` keeps attributes.
const ALLOWED_TAGS: &[&str] = &["a", "br", "strong", "b", "em", "i"];

/// Attributes allowed on `a`
const ALLOWED_LINK_ATTRS: &[&str] = &["href", "target", "rel"];

/// Elements removed together with their content
const DROPPED_ELEMENTS: &[&str] = &["script", "style", "iframe", "object", "embed", "template"];

/// URL schemes that may appear in links
const ALLOWED_URL_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

pub struct Sanitizer {
	dropped_re: Vec<Regex>,
	comment_re: Regex,
	tag_re: Regex,
	attr_re: Regex,
	any_tag_re: Regex,
	space_re: Regex,
}

impl std::fmt::Debug for Sanitizer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Sanitizer").finish_non_exhaustive()
	}
}

fn compile(pattern: &str) -> ClResult<Regex> {
	Regex::new(pattern).map_err(|e| Error::Internal(format!("regex error: {}", e)))
}

impl Sanitizer {
	pub fn new() -> ClResult<Self> {
		let dropped_re = DROPPED_ELEMENTS
			.iter()
			.map(|el| compile(&format!(r"(?is)<{el}\b[^>]*>.*?</{el}\s*>|<{el}\b[^>]*/?>", el = el)))
			.collect::<ClResult<Vec<_>>>()?;

		Ok(Self {
			dropped_re,
			comment_re: compile(r"(?s)<!--.*?(-->|$)")?,
			tag_re: compile(r"(?s)<(/?)([a-zA-Z][a-zA-Z0-9]*)\b([^>]*)>")?,
			attr_re: compile(
				r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#,
			)?,
			any_tag_re: compile(r"(?s)<[^>]*>")?,
			space_re: compile(r"\s+")?,
		})
	}

	fn strip_dropped(&self, input: &str) -> String {
		let mut result = self.comment_re.replace_all(input, "").into_owned();
		for re in &self.dropped_re {
			result = re.replace_all(&result, "").into_owned();
		}
		result
	}

	/// Plain single-line text: no tags, no line breaks, collapsed whitespace
	pub fn text(&self, input: &str) -> String {
		let without_blocks = self.strip_dropped(input);
		let without_tags = self.any_tag_re.replace_all(&without_blocks, "");
		let filtered: String = without_tags.chars().filter(|c| !c.is_control() || c.is_whitespace()).collect();
		self.space_re.replace_all(&filtered, " ").trim().to_string()
	}

	/// Reduce to `a[href,target,rel]`, `br`, `strong`, `b`, `em`, `i`.
	///
	/// Disallowed tags are removed but their text is kept. Any `<` or `>` not
	/// part of an allowed tag ends up escaped.
	pub fn subheading(&self, input: &str) -> String {
		let cleaned = self.strip_dropped(input);
		let mut out = String::with_capacity(cleaned.len());
		let mut last = 0;

		for caps in self.tag_re.captures_iter(&cleaned) {
			let Some(whole) = caps.get(0) else { continue };
			out.push_str(&escape_text(&cleaned[last..whole.start()]));
			last = whole.end();
			if let Some(tag) = self.allowed_tag(&caps) {
				out.push_str(&tag);
			}
		}
		out.push_str(&escape_text(&cleaned[last..]));
		out
	}

	fn allowed_tag(&self, caps: &Captures<'_>) -> Option<String> {
		let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
		let name = caps.get(2)?.as_str().to_ascii_lowercase();
		if !ALLOWED_TAGS.contains(&name.as_str()) {
			return None;
		}
		if name == "br" {
			return (!closing).then(|| "<br>".to_string());
		}
		if closing {
			return Some(format!("</{}>", name));
		}
		if name != "a" {
			return Some(format!("<{}>", name));
		}

		let mut tag = String::from("<a");
		let attrs = caps.get(3).map_or("", |m| m.as_str());
		for attr in self.attr_re.captures_iter(attrs) {
			let Some(attr_name) = attr.get(1).map(|m| m.as_str().to_ascii_lowercase()) else {
				continue;
			};
			if !ALLOWED_LINK_ATTRS.contains(&attr_name.as_str()) || tag.contains(&format!(" {}=", attr_name)) {
				continue;
			}
			let raw = attr.get(2).or_else(|| attr.get(3)).or_else(|| attr.get(4)).map_or("", |m| m.as_str());
			let value = if attr_name == "href" { self.url(raw) } else { self.text(raw) };
			if value.is_empty() {
				continue;
			}
			tag.push_str(&format!(" {}=\"{}\"", attr_name, escape_attr(&value)));
		}
		tag.push('>');
		Some(tag)
	}

	/// Keep relative references and links with an allowed scheme, else empty
	pub fn url(&self, input: &str) -> String {
		let url: String = input.trim().chars().filter(|c| !c.is_whitespace() && !c.is_control()).collect();
		if url.is_empty() {
			return url;
		}

		// A colon before any '/', '?' or '#' introduces a scheme
		let scheme_end = url.find(':');
		let path_start = url.find(['/', '?', '#']);
		let has_scheme = match (scheme_end, path_start) {
			(Some(colon), Some(path)) => colon < path,
			(Some(_), None) => true,
			(None, _) => false,
		};
		if !has_scheme {
			return url;
		}

		match url::Url::parse(&url) {
			Ok(parsed) if ALLOWED_URL_SCHEMES.contains(&parsed.scheme()) => url,
			Ok(parsed) => {
				debug!("Dropping URL with disallowed scheme: {}", parsed.scheme());
				String::new()
			}
			Err(_) => String::new(),
		}
	}

	/// Canonicalize raw settings input into a sanitized patch.
	///
	/// Keys that are absent or cannot be coerced are left untouched.
	pub fn settings_patch(&self, raw: &Value) -> SettingsPatch {
		let patch = SettingsPatch::from_json(raw);
		let text = |v: Option<String>| v.map(|s| self.text(&s));

		SettingsPatch {
			is_enabled: patch.is_enabled,
			heading: text(patch.heading),
			subheading: patch.subheading.map(|s| self.subheading(&s)),
			logo_id: patch.logo_id,
			logo_alt: text(patch.logo_alt),
			seo_title: text(patch.seo_title),
			meta_description: text(patch.meta_description),
			bypass_roles: patch.bypass_roles.map(|roles| {
				dedup(roles.iter().map(|r| self.text(r)).filter(|r| !r.is_empty()))
			}),
			whitelisted_ips: patch.whitelisted_ips.map(|ips| {
				dedup(ips.iter().map(|ip| self.text(ip)).filter(|ip| ip.parse::<IpAddr>().is_ok()))
			}),
			cta_buttons: patch.cta_buttons.map(|buttons| {
				buttons
					.iter()
					.map(|b| CtaButton { label: self.text(&b.label), url: self.url(&b.url) })
					.collect()
			}),
			countdown_enabled: patch.countdown_enabled,
			countdown_datetime: text(patch.countdown_datetime),
			auto_disable_enabled: patch.auto_disable_enabled,
		}
	}
}

fn dedup(items: impl Iterator<Item = String>) -> Vec<String> {
	let mut out: Vec<String> = Vec::new();
	for item in items {
		if !out.contains(&item) {
			out.push(item);
		}
	}
	out
}

fn escape_text(text: &str) -> String {
	text.replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
	value.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn s() -> Sanitizer {
		Sanitizer::new().unwrap()
	}

	#[test]
	fn test_text_strips_tags_and_whitespace() {
		assert_eq!(s().text("  Hello <b>World</b>\n\tagain  "), "Hello World again");
		assert_eq!(s().text("<script>alert(1)</script>Safe"), "Safe");
		assert_eq!(s().text("a < b"), "a < b");
	}

	#[test]
	fn test_subheading_keeps_allowed_tags() {
		let out = s().subheading("Back <strong>soon</strong>.<br/>See <em>status</em>");
		assert_eq!(out, "Back <strong>soon</strong>.<br>See <em>status</em>");
	}

	#[test]
	fn test_subheading_unwraps_disallowed_tags() {
		assert_eq!(s().subheading("<div class=\"x\">Hi <span>there</span></div>"), "Hi there");
	}

	#[test]
	fn test_subheading_drops_script_content() {
		assert_eq!(s().subheading("ok<script>alert('x')</script><style>p{}</style>"), "ok");
	}

	#[test]
	fn test_subheading_link_attributes() {
		let out = s().subheading(
			r#"<a href="https://status.example.com" target="_blank" rel="noopener" onclick="evil()" style="x">status</a>"#,
		);
		assert_eq!(
			out,
			r#"<a href="https://status.example.com" target="_blank" rel="noopener">status</a>"#
		);
	}

	#[test]
	fn test_subheading_javascript_href_removed() {
		assert_eq!(s().subheading(r#"<a href="javascript:alert(1)">x</a>"#), "<a>x</a>");
		assert_eq!(s().subheading(r#"<a href=' JaVaScRiPt:alert(1)'>x</a>"#), "<a>x</a>");
	}

	#[test]
	fn test_subheading_escapes_stray_brackets() {
		assert_eq!(s().subheading("1 < 2 > 0"), "1 &lt; 2 &gt; 0");
		assert_eq!(s().subheading("<!-- hidden -->shown"), "shown");
	}

	#[test]
	fn test_url_schemes() {
		let s = s();
		assert_eq!(s.url("https://example.com/a?b=1"), "https://example.com/a?b=1");
		assert_eq!(s.url("mailto:ops@example.com"), "mailto:ops@example.com");
		assert_eq!(s.url("/contact"), "/contact");
		assert_eq!(s.url("javascript:alert(1)"), "");
		assert_eq!(s.url("data:text/html;base64,AAAA"), "");
		assert_eq!(s.url("java\nscript:alert(1)"), "");
	}

	#[test]
	fn test_settings_patch_canonicalization() {
		let patch = s().settings_patch(&json!({
			"is_enabled": 1,
			"heading": "<h1>Down</h1> for now",
			"logo_id": -12,
			"bypass_roles": ["administrator", " editor ", "", "administrator"],
			"whitelisted_ips": ["203.0.113.5", "nope", "::1"],
			"cta_buttons": [{ "label": "<b>Shop</b>", "url": "javascript:void(0)" }],
			"countdown_datetime": "2030-01-01T10:00",
			"unknown_key": true,
		}));

		assert_eq!(patch.is_enabled, Some(true));
		assert_eq!(patch.heading.as_deref(), Some("Down for now"));
		assert_eq!(patch.logo_id, Some(12));
		assert_eq!(patch.bypass_roles, Some(vec!["administrator".into(), "editor".into()]));
		assert_eq!(patch.whitelisted_ips, Some(vec!["203.0.113.5".into(), "::1".into()]));
		assert_eq!(
			patch.cta_buttons,
			Some(vec![CtaButton { label: "Shop".into(), url: String::new() }])
		);
		assert_eq!(patch.countdown_datetime.as_deref(), Some("2030-01-01T10:00"));
		assert_eq!(patch.subheading, None);
	}
}

// vim: ts=4
