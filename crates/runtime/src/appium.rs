//! Appium (UiAutomator2) sessions over the WebDriver HTTP protocol.

use std::sync::Arc;

use rollcall_protocol::wire::NewSession;
use rollcall_protocol::{CapabilityProfile, ElementRef, Locator, Swipe, WindowSize};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::backend::{Backend, BoxFuture, SessionFactory};
use crate::error::{Error, Result};
use crate::http::WebDriverClient;

/// Android `KEYCODE_ENTER`.
const KEYCODE_ENTER: u32 = 66;

/// A live Appium session.
#[derive(Debug)]
pub struct AppiumSession {
	client: WebDriverClient,
	id: String,
}

impl AppiumSession {
	/// Creates a new session on the server with `profile`.
	pub async fn create(client: WebDriverClient, profile: &CapabilityProfile) -> Result<Self> {
		info!(target = "rollcall", endpoint = %client.endpoint(), platform = %profile.platform_name, "creating automation session");
		let value = client.post("session", profile.to_new_session_body()).await?;
		let session: NewSession = serde_json::from_value(value)?;
		debug!(target = "rollcall", session = %session.session_id, "session created");
		Ok(Self {
			client,
			id: session.session_id,
		})
	}

	fn path(&self, suffix: &str) -> String {
		format!("session/{}/{}", self.id, suffix)
	}

	fn element_path(&self, element: &ElementRef, suffix: &str) -> String {
		self.path(&format!("element/{}/{}", element.id(), suffix))
	}

	async fn find_one(&self, path: String, locator: &Locator) -> Result<ElementRef> {
		let value = self.client.post(&path, locator.to_query()).await?;
		ElementRef::from_wire(&value).ok_or_else(|| Error::NoSuchElement(locator.to_string()))
	}

	async fn find_many(&self, path: String, locator: &Locator) -> Result<Vec<ElementRef>> {
		let value = self.client.post(&path, locator.to_query()).await?;
		let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
		Ok(items.iter().filter_map(ElementRef::from_wire).collect())
	}

	async fn keyboard_shown(&self) -> Result<bool> {
		let value = self.client.get(&self.path("appium/device/is_keyboard_shown")).await?;
		Ok(value.as_bool().unwrap_or(false))
	}
}

impl Backend for AppiumSession {
	fn session_id(&self) -> &str {
		&self.id
	}

	fn find<'a>(&'a self, locator: &'a Locator) -> BoxFuture<'a, Result<ElementRef>> {
		Box::pin(self.find_one(self.path("element"), locator))
	}

	fn find_all<'a>(&'a self, locator: &'a Locator) -> BoxFuture<'a, Result<Vec<ElementRef>>> {
		Box::pin(self.find_many(self.path("elements"), locator))
	}

	fn find_in<'a>(&'a self, parent: &'a ElementRef, locator: &'a Locator) -> BoxFuture<'a, Result<ElementRef>> {
		Box::pin(self.find_one(self.element_path(parent, "element"), locator))
	}

	fn find_all_in<'a>(&'a self, parent: &'a ElementRef, locator: &'a Locator) -> BoxFuture<'a, Result<Vec<ElementRef>>> {
		Box::pin(self.find_many(self.element_path(parent, "elements"), locator))
	}

	fn click<'a>(&'a self, element: &'a ElementRef) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			self.client.post(&self.element_path(element, "click"), json!({})).await?;
			Ok(())
		})
	}

	fn set_text<'a>(&'a self, element: &'a ElementRef, text: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			self.client.post(&self.element_path(element, "clear"), json!({})).await?;
			self.client
				.post(&self.element_path(element, "value"), json!({ "text": text }))
				.await?;
			Ok(())
		})
	}

	fn text<'a>(&'a self, element: &'a ElementRef) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move {
			let value = self.client.get(&self.element_path(element, "text")).await?;
			Ok(value.as_str().unwrap_or_default().to_string())
		})
	}

	fn attribute<'a>(&'a self, element: &'a ElementRef, name: &'a str) -> BoxFuture<'a, Result<Option<String>>> {
		Box::pin(async move {
			let value = self
				.client
				.get(&self.element_path(element, &format!("attribute/{name}")))
				.await?;
			Ok(match value {
				Value::String(s) => Some(s),
				Value::Null => None,
				other => Some(other.to_string()),
			})
		})
	}

	fn is_displayed<'a>(&'a self, element: &'a ElementRef) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move {
			let value = self.client.get(&self.element_path(element, "displayed")).await?;
			Ok(value.as_bool().unwrap_or(false))
		})
	}

	fn press_confirm(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			self.client
				.post(&self.path("appium/device/press_keycode"), json!({ "keycode": KEYCODE_ENTER }))
				.await?;
			Ok(())
		})
	}

	fn dismiss_keyboard(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			if !self.keyboard_shown().await? {
				return Ok(());
			}
			self.client.post(&self.path("appium/device/hide_keyboard"), json!({})).await?;
			Ok(())
		})
	}

	fn navigate_back(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			self.client.post(&self.path("back"), json!({})).await?;
			Ok(())
		})
	}

	fn swipe(&self, swipe: Swipe) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			self.client.post(&self.path("actions"), swipe.to_actions()).await?;
			Ok(())
		})
	}

	fn window_size(&self) -> BoxFuture<'_, Result<WindowSize>> {
		Box::pin(async move {
			let value = self.client.get(&self.path("window/rect")).await?;
			Ok(serde_json::from_value(value)?)
		})
	}

	fn close(&self) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			info!(target = "rollcall", session = %self.id, "ending automation session");
			self.client.delete(&format!("session/{}", self.id)).await?;
			Ok(())
		})
	}
}

/// Builds [`AppiumSession`]s from a fixed endpoint and capability profile.
#[derive(Debug, Clone)]
pub struct AppiumSessionFactory {
	client: WebDriverClient,
	profile: CapabilityProfile,
}

impl AppiumSessionFactory {
	pub fn new(client: WebDriverClient, profile: CapabilityProfile) -> Self {
		Self { client, profile }
	}

	pub fn profile(&self) -> &CapabilityProfile {
		&self.profile
	}
}

impl SessionFactory for AppiumSessionFactory {
	fn create(&self) -> BoxFuture<'_, Result<Arc<dyn Backend>>> {
		Box::pin(async move {
			let session = AppiumSession::create(self.client.clone(), &self.profile).await?;
			Ok(Arc::new(session) as Arc<dyn Backend>)
		})
	}
}
