//! Adapter that verifies visitor credentials and reports their roles.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::identity::AuthCtx;
use crate::prelude::*;

#[async_trait]
pub trait IdentityAdapter: Debug + Send + Sync {
	/// Verify an opaque session or bearer token.
	///
	/// Returns `Error::Unauthorized` for unknown or expired tokens.
	async fn authenticate(&self, token: &str) -> ClResult<AuthCtx>;
}

/// Identity adapter that knows nobody: every visitor is anonymous
#[derive(Debug, Default)]
pub struct NoIdentity;

#[async_trait]
impl IdentityAdapter for NoIdentity {
	async fn authenticate(&self, _token: &str) -> ClResult<AuthCtx> {
		Err(Error::Unauthorized)
	}
}

// vim: ts=4
