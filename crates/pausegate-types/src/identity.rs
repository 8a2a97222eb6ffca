//! Per-request identity

use serde::{Deserialize, Serialize};

/// Authenticated principal as reported by the identity adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCtx {
	pub user: Box<str>,
	pub roles: Box<[Box<str>]>,
}

impl AuthCtx {
	pub fn has_any_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
		self.roles.iter().any(|r| roles.iter().any(|wanted| wanted.as_ref() == r.as_ref()))
	}
}

/// Identity of the visitor, derived fresh for each request and then dropped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestIdentity {
	pub is_authenticated: bool,
	pub roles: Box<[Box<str>]>,
	/// Resolved client address, empty when nothing valid was found
	pub client_ip: Box<str>,
}

impl RequestIdentity {
	pub fn anonymous(client_ip: impl Into<Box<str>>) -> Self {
		Self { is_authenticated: false, roles: Box::new([]), client_ip: client_ip.into() }
	}

	pub fn from_auth(auth: Option<&AuthCtx>, client_ip: impl Into<Box<str>>) -> Self {
		match auth {
			Some(auth) => Self {
				is_authenticated: true,
				roles: auth.roles.clone(),
				client_ip: client_ip.into(),
			},
			None => Self::anonymous(client_ip),
		}
	}
}


// vim: ts=4
