//! Error type shared by every PauseGate crate.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// No identity was presented where one is required
	Unauthorized,
	/// The identity lacks the required role
	PermissionDenied,
	/// Storage failure (details are logged where it happens)
	DbError,
	/// Settings could not be persisted
	SettingsWrite,
	Parse,
	ValidationError(String),
	ConfigError(String),
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl Error {
	/// Stable error code used in API responses
	pub fn code(&self) -> &'static str {
		match self {
			Error::Unauthorized => "E-AUTH-UNAUTH",
			Error::PermissionDenied => "E-AUTH-NOPERM",
			Error::DbError => "E-CORE-DBERR",
			Error::SettingsWrite => "E-SETTINGS-WRITE",
			Error::Parse => "E-CORE-PARSE",
			Error::ValidationError(_) => "E-VAL-INVALID",
			Error::ConfigError(_) => "E-CONF-CFGERR",
			Error::Internal(_) | Error::Io(_) => "E-SYS-INTERNAL",
		}
	}

	fn status(&self) -> StatusCode {
		match self {
			Error::Unauthorized => StatusCode::UNAUTHORIZED,
			Error::PermissionDenied => StatusCode::FORBIDDEN,
			Error::Parse | Error::ValidationError(_) => StatusCode::BAD_REQUEST,
			Error::DbError
			| Error::SettingsWrite
			| Error::ConfigError(_)
			| Error::Internal(_)
			| Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Message safe to show to API clients. Internal details stay in the logs.
	fn public_message(&self) -> String {
		match self {
			Error::Unauthorized => "Authentication required".into(),
			Error::PermissionDenied => "You do not have permission to perform this action".into(),
			Error::SettingsWrite => "Failed to update settings".into(),
			Error::Parse => "Malformed request".into(),
			Error::ValidationError(msg) => msg.clone(),
			Error::DbError | Error::ConfigError(_) | Error::Internal(_) | Error::Io(_) => {
				"Internal server error".into()
			}
		}
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::Unauthorized => write!(f, "unauthorized"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::DbError => write!(f, "database error"),
			Error::SettingsWrite => write!(f, "settings write failed"),
			Error::Parse => write!(f, "parse error"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		tracing::warn!("JSON error: {}", err);
		Self::Parse
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status();
		if status.is_server_error() {
			tracing::error!(code = self.code(), "Request failed: {}", self);
		}
		let body = serde_json::json!({
			"error": {
				"code": self.code(),
				"message": self.public_message(),
			}
		});
		(status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_mapping() {
		assert_eq!(Error::Unauthorized.into_response().status(), StatusCode::UNAUTHORIZED);
		assert_eq!(Error::PermissionDenied.into_response().status(), StatusCode::FORBIDDEN);
		assert_eq!(
			Error::SettingsWrite.into_response().status(),
			StatusCode::INTERNAL_SERVER_ERROR
		);
		assert_eq!(
			Error::ValidationError("bad".into()).into_response().status(),
			StatusCode::BAD_REQUEST
		);
	}

	#[test]
	fn test_internal_details_hidden() {
		let err = Error::Internal("pool exhausted at 0x1234".into());
		assert_eq!(err.public_message(), "Internal server error");
		assert!(err.to_string().contains("pool exhausted"));
	}

	#[test]
	fn test_settings_write_code() {
		assert_eq!(Error::SettingsWrite.code(), "E-SETTINGS-WRITE");
	}
}

// vim: ts=4
