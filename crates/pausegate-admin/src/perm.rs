//! Admin permission middleware

use axum::{
	extract::{Request, State},
	middleware::Next,
	response::Response,
};

use pausegate_core::extract::Auth;

use crate::prelude::*;

/// Middleware that checks if the current user holds one of the manager roles
///
/// Missing authentication is rejected by the [`Auth`] extractor with 401.
pub async fn require_manager(
	State(app): State<App>,
	Auth(auth_ctx): Auth,
	req: Request,
	next: Next,
) -> Result<Response, Error> {
	if !auth_ctx.has_any_role(&app.opts.manager_roles[..]) {
		tracing::warn!(
			subject = %auth_ctx.user,
			roles = ?auth_ctx.roles,
			"Settings access denied - manager role required"
		);
		return Err(Error::PermissionDenied);
	}

	Ok(next.run(req).await)
}

// vim: ts=4
