//! The narrow interface the engine consumes.
//!
//! [`Backend`] is one live automation session. [`SessionFactory`] creates
//! sessions on demand so a broken session can be replaced with a fresh one
//! built from the same capability profile.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use rollcall_protocol::{ElementRef, Locator, Swipe, WindowSize};

use crate::error::Result;

/// Boxed future returned by backend operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One automation session against the target app.
///
/// Every operation may fail with [`Error::StaleReference`](crate::Error::StaleReference)
/// or [`Error::BackendFailure`](crate::Error::BackendFailure); callers dispatch on
/// [`Error::kind`](crate::Error::kind).
pub trait Backend: Send + Sync {
	/// Server-assigned session identifier.
	fn session_id(&self) -> &str;

	/// First element matching `locator`, or [`Error::NoSuchElement`](crate::Error::NoSuchElement).
	fn find<'a>(&'a self, locator: &'a Locator) -> BoxFuture<'a, Result<ElementRef>>;

	/// All elements matching `locator`, possibly none.
	fn find_all<'a>(&'a self, locator: &'a Locator) -> BoxFuture<'a, Result<Vec<ElementRef>>>;

	/// First descendant of `parent` matching `locator`.
	fn find_in<'a>(&'a self, parent: &'a ElementRef, locator: &'a Locator) -> BoxFuture<'a, Result<ElementRef>>;

	/// All descendants of `parent` matching `locator`.
	fn find_all_in<'a>(&'a self, parent: &'a ElementRef, locator: &'a Locator) -> BoxFuture<'a, Result<Vec<ElementRef>>>;

	fn click<'a>(&'a self, element: &'a ElementRef) -> BoxFuture<'a, Result<()>>;

	/// Clears the element, then types `text` into it.
	fn set_text<'a>(&'a self, element: &'a ElementRef, text: &'a str) -> BoxFuture<'a, Result<()>>;

	fn text<'a>(&'a self, element: &'a ElementRef) -> BoxFuture<'a, Result<String>>;

	fn attribute<'a>(&'a self, element: &'a ElementRef, name: &'a str) -> BoxFuture<'a, Result<Option<String>>>;

	fn is_displayed<'a>(&'a self, element: &'a ElementRef) -> BoxFuture<'a, Result<bool>>;

	/// Presses the platform confirm/enter key.
	fn press_confirm(&self) -> BoxFuture<'_, Result<()>>;

	/// Hides the soft keyboard; a no-op when none is shown.
	fn dismiss_keyboard(&self) -> BoxFuture<'_, Result<()>>;

	fn navigate_back(&self) -> BoxFuture<'_, Result<()>>;

	fn swipe(&self, swipe: Swipe) -> BoxFuture<'_, Result<()>>;

	fn window_size(&self) -> BoxFuture<'_, Result<WindowSize>>;

	/// Ends the session on the server.
	fn close(&self) -> BoxFuture<'_, Result<()>>;
}

/// Creates fresh sessions.
pub trait SessionFactory: Send + Sync {
	fn create(&self) -> BoxFuture<'_, Result<Arc<dyn Backend>>>;
}
