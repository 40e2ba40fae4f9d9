//! W3C WebDriver response envelopes.
//!
//! Every WebDriver response wraps its payload in `{"value": ...}`. Errors
//! carry `{"value": {"error": "<code>", "message": "...", "stacktrace": "..."}}`.

use serde::Deserialize;
use serde_json::Value;

/// W3C error codes the backend distinguishes.
pub mod codes {
	pub const STALE_ELEMENT_REFERENCE: &str = "stale element reference";
	pub const NO_SUCH_ELEMENT: &str = "no such element";
	pub const ELEMENT_CLICK_INTERCEPTED: &str = "element click intercepted";
	pub const ELEMENT_NOT_INTERACTABLE: &str = "element not interactable";
	pub const INVALID_ELEMENT_STATE: &str = "invalid element state";
	pub const INVALID_SELECTOR: &str = "invalid selector";
	pub const INVALID_ARGUMENT: &str = "invalid argument";
	pub const INVALID_SESSION_ID: &str = "invalid session id";
	pub const SESSION_NOT_CREATED: &str = "session not created";
	pub const UNKNOWN_ERROR: &str = "unknown error";
}

/// Generic `{"value": ...}` envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope {
	#[serde(default)]
	pub value: Value,
}

/// Error payload found inside an error envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorPayload {
	pub error: String,
	#[serde(default)]
	pub message: String,
	#[serde(default)]
	pub stacktrace: Option<String>,
}

impl ErrorPayload {
	/// Extracts an error payload when `value` has the W3C error shape.
	pub fn from_value(value: &Value) -> Option<Self> {
		if value.get("error").and_then(Value::as_str).is_none() {
			return None;
		}
		serde_json::from_value(value.clone()).ok()
	}
}

/// `POST /session` result.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
	pub session_id: String,
	#[serde(default)]
	pub capabilities: Value,
}
