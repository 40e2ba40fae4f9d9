//! W3C WebDriver HTTP command layer.
//!
//! Sends one JSON command per request and unwraps the `{"value": ...}`
//! envelope. Error envelopes are mapped onto [`Error`] by their W3C code so
//! callers never inspect raw HTTP status codes.

use std::time::Duration;

use reqwest::Method;
use rollcall_protocol::wire::{Envelope, ErrorPayload};
use serde_json::Value;
use tracing::trace;
use url::Url;

use crate::error::{Error, Result};

/// Default Appium server endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:4723/";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Thin WebDriver command client bound to one server endpoint.
#[derive(Debug, Clone)]
pub struct WebDriverClient {
	http: reqwest::Client,
	base: Url,
}

impl WebDriverClient {
	/// Creates a client for `endpoint` with the default request timeout.
	pub fn new(endpoint: &str) -> Result<Self> {
		Self::with_timeout(endpoint, DEFAULT_REQUEST_TIMEOUT)
	}

	pub fn with_timeout(endpoint: &str, request_timeout: Duration) -> Result<Self> {
		let mut base = Url::parse(endpoint)?;
		if !base.path().ends_with('/') {
			let path = format!("{}/", base.path());
			base.set_path(&path);
		}
		let http = reqwest::Client::builder()
			.connect_timeout(CONNECT_TIMEOUT)
			.timeout(request_timeout)
			.build()?;
		Ok(Self { http, base })
	}

	pub fn endpoint(&self) -> &Url {
		&self.base
	}

	pub async fn get(&self, path: &str) -> Result<Value> {
		self.command(Method::GET, path, None).await
	}

	pub async fn post(&self, path: &str, body: Value) -> Result<Value> {
		self.command(Method::POST, path, Some(body)).await
	}

	pub async fn delete(&self, path: &str) -> Result<Value> {
		self.command(Method::DELETE, path, None).await
	}

	/// Sends a command and returns the unwrapped `value`.
	pub async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
		let url = self.base.join(path.trim_start_matches('/'))?;
		trace!(target = "rollcall", %method, %url, "webdriver command");

		let mut request = self.http.request(method, url);
		if let Some(body) = body {
			request = request.json(&body);
		}
		let response = request.send().await?;
		let status = response.status();
		let text = response.text().await?;

		let envelope: Envelope = match serde_json::from_str(&text) {
			Ok(envelope) => envelope,
			Err(_) if !status.is_success() => {
				return Err(Error::BackendFailure(format!("HTTP {status}: {}", truncate(&text))));
			}
			Err(err) => return Err(err.into()),
		};

		if let Some(payload) = ErrorPayload::from_value(&envelope.value) {
			return Err(Error::from_payload(&payload));
		}
		if !status.is_success() {
			return Err(Error::BackendFailure(format!("HTTP {status} without error payload")));
		}
		Ok(envelope.value)
	}
}

fn truncate(text: &str) -> &str {
	match text.char_indices().nth(200) {
		Some((idx, _)) => &text[..idx],
		None => text,
	}
}
