//! Custom middlewares

use axum::{
	body::Body,
	extract::State,
	http::{Request, response::Response},
	middleware::Next,
};

use crate::extract::{Auth, extract_token};
use crate::prelude::*;

/// Attach an [`Auth`] extension when the request carries a valid session token.
///
/// Invalid or expired tokens are ignored: the request continues anonymously.
pub async fn optional_auth(State(app): State<App>, mut req: Request<Body>, next: Next) -> Response<Body> {
	let token = extract_token(req.headers(), &app.opts.auth_cookie).map(str::to_string);

	if let Some(token) = token {
		match app.identity_adapter.authenticate(&token).await {
			Ok(auth) => {
				req.extensions_mut().insert(Auth(auth));
			}
			Err(err) => debug!("Ignoring session token: {}", err),
		}
	}

	next.run(req).await
}

// vim: ts=4
