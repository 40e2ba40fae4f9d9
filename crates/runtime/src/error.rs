//! Error types for the automation backend.

use rollcall_protocol::wire::{ErrorPayload, codes};
use thiserror::Error;

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by backend operations.
#[derive(Debug, Error)]
pub enum Error {
	/// The element handle no longer matches the live UI tree.
	#[error("stale element reference: {0}")]
	StaleReference(String),

	/// Nothing matched the locator.
	#[error("no such element: {0}")]
	NoSuchElement(String),

	/// Another element (overlay, animation) received the click.
	#[error("element click intercepted: {0}")]
	ClickIntercepted(String),

	/// The element exists but cannot take the requested action right now.
	#[error("invalid element state: {0}")]
	InvalidElementState(String),

	/// The server refused the locator expression.
	#[error("invalid selector: {0}")]
	InvalidSelector(String),

	/// The server refused the command arguments.
	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	/// The session is unusable (crashed, disconnected, expired).
	#[error("backend failure: {0}")]
	BackendFailure(String),

	/// HTTP transport error talking to the server.
	#[error("transport error: {0}")]
	Transport(#[from] reqwest::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// Malformed server endpoint.
	#[error("invalid endpoint: {0}")]
	Endpoint(#[from] url::ParseError),
}

/// How callers should react to an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
	/// Re-resolve the reference and retry.
	Stale,
	/// Pause and retry the same action.
	Transient,
	/// Target absent; retrying immediately will not help.
	Missing,
	/// The request itself was rejected. Not recoverable by retry or repair.
	Rejected,
	/// The session is broken; replace it.
	Backend,
}

impl Error {
	/// Maps a W3C error payload onto the taxonomy.
	///
	/// Codes not listed explicitly (`invalid session id`, `unknown error`,
	/// `session not created`, timeouts) indicate an unusable session.
	pub fn from_payload(payload: &ErrorPayload) -> Self {
		let message = payload.message.clone();
		match payload.error.as_str() {
			codes::STALE_ELEMENT_REFERENCE => Self::StaleReference(message),
			codes::NO_SUCH_ELEMENT => Self::NoSuchElement(message),
			codes::ELEMENT_CLICK_INTERCEPTED | codes::ELEMENT_NOT_INTERACTABLE => Self::ClickIntercepted(message),
			codes::INVALID_ELEMENT_STATE => Self::InvalidElementState(message),
			codes::INVALID_SELECTOR => Self::InvalidSelector(message),
			codes::INVALID_ARGUMENT => Self::InvalidArgument(message),
			other => Self::BackendFailure(format!("{other}: {message}")),
		}
	}

	pub fn kind(&self) -> FailureKind {
		match self {
			Self::StaleReference(_) => FailureKind::Stale,
			Self::ClickIntercepted(_) | Self::InvalidElementState(_) => FailureKind::Transient,
			Self::NoSuchElement(_) => FailureKind::Missing,
			Self::InvalidSelector(_) | Self::InvalidArgument(_) | Self::Json(_) | Self::Endpoint(_) => {
				FailureKind::Rejected
			}
			Self::BackendFailure(_) | Self::Transport(_) => FailureKind::Backend,
		}
	}

	pub fn is_stale(&self) -> bool {
		self.kind() == FailureKind::Stale
	}

	pub fn is_backend_failure(&self) -> bool {
		self.kind() == FailureKind::Backend
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn payload(code: &str) -> ErrorPayload {
		ErrorPayload {
			error: code.to_string(),
			message: "boom".to_string(),
			stacktrace: None,
		}
	}

	#[test]
	fn maps_w3c_codes_to_kinds() {
		assert_eq!(Error::from_payload(&payload("stale element reference")).kind(), FailureKind::Stale);
		assert_eq!(Error::from_payload(&payload("element click intercepted")).kind(), FailureKind::Transient);
		assert_eq!(Error::from_payload(&payload("invalid element state")).kind(), FailureKind::Transient);
		assert_eq!(Error::from_payload(&payload("no such element")).kind(), FailureKind::Missing);
		assert_eq!(Error::from_payload(&payload("invalid selector")).kind(), FailureKind::Rejected);
	}

	#[test]
	fn unknown_codes_mean_broken_session() {
		for code in ["invalid session id", "unknown error", "session not created", "timeout"] {
			let err = Error::from_payload(&payload(code));
			assert!(err.is_backend_failure(), "{code} should be a backend failure");
		}
	}
}
