//! Identity adapter backed by a static token table
//!
//! The table is a JSON object mapping tokens to principals:
//!
//! ```json
//! { "s3cr3t": { "user": "alice", "roles": ["administrator"] } }
//! ```

use async_trait::async_trait;
use std::collections::HashMap;

use pausegate::identity::AuthCtx;
use pausegate::identity_adapter::IdentityAdapter;
use pausegate::prelude::*;

pub struct StaticTokens {
	tokens: HashMap<Box<str>, AuthCtx>,
}

impl std::fmt::Debug for StaticTokens {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("StaticTokens").field("tokens", &self.tokens.len()).finish()
	}
}

impl StaticTokens {
	pub fn from_json(text: &str) -> ClResult<Self> {
		let tokens: HashMap<Box<str>, AuthCtx> = serde_json::from_str(text)
			.map_err(|e| Error::ConfigError(format!("invalid token table: {}", e)))?;
		info!("Loaded {} session token(s)", tokens.len());
		Ok(Self { tokens })
	}
}

#[async_trait]
impl IdentityAdapter for StaticTokens {
	async fn authenticate(&self, token: &str) -> ClResult<AuthCtx> {
		self.tokens.get(token).cloned().ok_or(Error::Unauthorized)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_static_tokens() {
		let tokens = StaticTokens::from_json(
			r#"{ "abc": { "user": "alice", "roles": ["administrator"] } }"#,
		)
		.unwrap();

		let auth = tokens.authenticate("abc").await.unwrap();
		assert_eq!(auth.user.as_ref(), "alice");
		assert!(matches!(tokens.authenticate("nope").await, Err(Error::Unauthorized)));
	}

	#[test]
	fn test_invalid_table() {
		assert!(matches!(StaticTokens::from_json("[1, 2]"), Err(Error::ConfigError(_))));
	}
}

// vim: ts=4
