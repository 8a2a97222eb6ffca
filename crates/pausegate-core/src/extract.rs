//! Request extractors: client address, session token and authentication
//!
//! Client address resolution walks the forwarding headers in a fixed priority
//! order before falling back to the socket peer. Only the first entry of a
//! comma-separated header counts. A value that is not a valid IPv4/IPv6
//! address is skipped and the next source is tried.

use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{HeaderMap, header, request::Parts};

use pausegate_types::identity::AuthCtx;

use crate::app::ServerMode;
use crate::prelude::*;

/// Forwarding headers in priority order: CDN, generic proxy, nginx
pub const FORWARDING_HEADERS: &[&str] = &["cf-connecting-ip", "x-forwarded-for", "x-real-ip"];

/// Resolve the client address from headers and the peer address.
///
/// Returns the address text as the client sent it (trimmed), so it can be
/// compared literally against the whitelist.
pub fn resolve_client_ip(
	headers: &HeaderMap,
	peer: Option<IpAddr>,
	mode: ServerMode,
) -> Option<String> {
	if matches!(mode, ServerMode::Proxy) {
		for name in FORWARDING_HEADERS {
			if let Some(ip) = header_candidate(headers, name) {
				return Some(ip);
			}
		}
	}
	peer.map(|ip| ip.to_string())
}

/// Extract the client IP, using `ConnectInfo` as the peer address
pub fn extract_client_ip_parts(parts: &Parts, mode: ServerMode) -> Option<String> {
	let peer = parts.extensions.get::<ConnectInfo<SocketAddr>>().map(|ci| ci.0.ip());
	resolve_client_ip(&parts.headers, peer, mode)
}

fn header_candidate(headers: &HeaderMap, name: &str) -> Option<String> {
	let value = headers.get(name)?.to_str().ok()?.trim();
	if value.is_empty() {
		return None;
	}
	// "client, proxy1, proxy2": the leftmost entry is the original client
	let first = value.split(',').next().unwrap_or_default().trim();
	first.parse::<IpAddr>().is_ok().then(|| first.to_string())
}

/// Session token from `Authorization: Bearer ...` or the session cookie
pub fn extract_token<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
	if let Some(token) = headers
		.get(header::AUTHORIZATION)
		.and_then(|h| h.to_str().ok())
		.and_then(|h| h.strip_prefix("Bearer "))
		.map(str::trim)
		.filter(|t| !t.is_empty())
	{
		return Some(token);
	}

	headers
		.get_all(header::COOKIE)
		.iter()
		.filter_map(|h| h.to_str().ok())
		.flat_map(|h| h.split(';'))
		.filter_map(|pair| pair.trim().split_once('='))
		.find(|(name, _)| *name == cookie_name)
		.map(|(_, value)| value.trim())
		.filter(|v| !v.is_empty())
}

// Auth //
//******//
#[derive(Debug, Clone)]
pub struct Auth(pub AuthCtx);

impl<S> FromRequestParts<S> for Auth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		if let Some(auth) = parts.extensions.get::<Auth>().cloned() {
			Ok(auth)
		} else {
			Err(Error::Unauthorized)
		}
	}
}

// OptionalAuth //
//***************//
/// Optional auth extractor that doesn't fail if auth is missing
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthCtx>);

impl<S> FromRequestParts<S> for OptionalAuth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let auth = parts.extensions.get::<Auth>().cloned().map(|a| a.0);
		Ok(OptionalAuth(auth))
	}
}


// vim: ts=4
