//! Resilient element queries and actions.
//!
//! Every call goes through [`ResilientQuery::attempt`], which fetches the
//! current session from the guardian and dispatches on the failure kind:
//!
//! | Kind        | Reaction                                                 |
//! |-------------|----------------------------------------------------------|
//! | `Stale`     | pause one poll interval, re-resolve, retry (bounded)     |
//! | `Transient` | clicks and text entry only: pause, retry (bounded)       |
//! | `Backend`   | one guardian repair per call, then re-run on new session |
//! | otherwise   | [`Error::Unresolvable`]                                  |
//!
//! Guardian exhaustion and unrecoverable errors propagate unchanged.
//!
//! Visibility probes and waits get the same single repair. Their other
//! failures mean "no answer": a probe reads as not visible, a wait keeps
//! polling.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rollcall_protocol::{ElementRef, Locator, Swipe, WindowSize};
use rollcall_runtime::{Backend, BoxFuture, FailureKind, Result as BackendResult, SessionFactory};
use tokio::time::{Instant, sleep};
use tracing::{debug, trace, warn};

use crate::anchor::Anchor;
use crate::error::{Error, Result, ResultExt};
use crate::guardian::SessionGuardian;
use crate::timings::Timings;

/// Stale retries per call, after the first attempt.
pub const STALE_RETRIES: u32 = 2;
/// Total attempts for a transiently failing click or text entry.
pub const ACTION_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy)]
struct Budget {
	stale: u32,
	transient: u32,
}

impl Budget {
	const READ: Self = Self {
		stale: STALE_RETRIES,
		transient: 0,
	};
	const ACTION: Self = Self {
		stale: STALE_RETRIES,
		transient: ACTION_ATTEMPTS - 1,
	};
}

type Subject<'a> = &'a (dyn fmt::Display + Sync);

/// Session guardian plus retry policy.
pub struct ResilientQuery {
	guardian: SessionGuardian,
	timings: Timings,
}

impl ResilientQuery {
	pub fn new(guardian: SessionGuardian, timings: Timings) -> Self {
		Self { guardian, timings }
	}

	/// Opens the initial session and wraps it.
	pub async fn connect(factory: Arc<dyn SessionFactory>, timings: Timings) -> Result<Self> {
		let guardian = SessionGuardian::connect(factory, timings.repair_backoff()).await?;
		Ok(Self::new(guardian, timings))
	}

	pub fn timings(&self) -> &Timings {
		&self.timings
	}

	/// Session replacements performed so far.
	pub fn repairs(&self) -> u32 {
		self.guardian.repairs()
	}

	/// Runs `call` with read-only retry policy.
	///
	/// `call` receives the current session and the attempt number (0 first).
	pub async fn run<T, F>(&mut self, op: &'static str, subject: Subject<'_>, call: F) -> Result<T>
	where
		T: Send + 'static,
		F: FnMut(Arc<dyn Backend>, u32) -> BoxFuture<'static, BackendResult<T>>,
	{
		self.attempt(op, subject, Budget::READ, call).await
	}

	async fn attempt<T, F>(&mut self, op: &'static str, subject: Subject<'_>, budget: Budget, mut call: F) -> Result<T>
	where
		T: Send + 'static,
		F: FnMut(Arc<dyn Backend>, u32) -> BoxFuture<'static, BackendResult<T>>,
	{
		let mut stale = 0;
		let mut transient = 0;
		let mut repaired = false;
		let mut attempt = 0;
		loop {
			let err = match call(self.guardian.session(), attempt).await {
				Ok(value) => return Ok(value),
				Err(err) => err,
			};
			attempt += 1;
			match err.kind() {
				FailureKind::Stale if stale < budget.stale => {
					stale += 1;
					debug!(target = "rollcall", op, subject = %subject, retry = stale, "stale reference, re-resolving");
					sleep(self.timings.poll_interval()).await;
				}
				FailureKind::Transient if transient < budget.transient => {
					transient += 1;
					warn!(target = "rollcall", op, subject = %subject, retry = transient, error = %err, "action did not land, retrying");
					sleep(self.timings.action_retry_pause()).await;
				}
				FailureKind::Backend if !repaired => {
					repaired = true;
					self.guardian.ensure(err).await?;
				}
				_ => {
					return Err(Error::Unresolvable {
						op,
						target: subject.to_string(),
						source: err,
					});
				}
			}
		}
	}

	pub async fn find(&mut self, locator: &Locator) -> Result<ElementRef> {
		let owned = locator.clone();
		self.attempt("find", locator, Budget::READ, move |backend, _| {
			let locator = owned.clone();
			Box::pin(async move { backend.find(&locator).await })
		})
		.await
	}

	/// All matches of `locator`, after waiting up to the default wait for at
	/// least one to appear. An empty list is a valid answer.
	pub async fn find_all(&mut self, locator: &Locator) -> Result<Vec<ElementRef>> {
		self.wait_present(locator, self.timings.default_wait()).await?;
		let owned = locator.clone();
		self.attempt("find all", locator, Budget::READ, move |backend, _| {
			let locator = owned.clone();
			Box::pin(async move { backend.find_all(&locator).await })
		})
		.await
	}

	/// Matches of `locator` under `anchor`, without waiting.
	pub async fn find_all_in(&mut self, anchor: &Anchor, locator: &Locator) -> Result<Vec<ElementRef>> {
		let (anchor_owned, locator_owned) = (anchor.clone(), locator.clone());
		self.attempt("find all in", anchor, Budget::READ, move |backend, attempt| {
			let (anchor, locator) = (anchor_owned.clone(), locator_owned.clone());
			Box::pin(async move {
				let parent = anchor.current(backend.as_ref(), attempt).await?;
				backend.find_all_in(&parent, &locator).await
			})
		})
		.await
	}

	pub async fn text(&mut self, anchor: &Anchor) -> Result<String> {
		let owned = anchor.clone();
		self.attempt("read text", anchor, Budget::READ, move |backend, attempt| {
			let anchor = owned.clone();
			Box::pin(async move {
				let element = anchor.current(backend.as_ref(), attempt).await?;
				backend.text(&element).await
			})
		})
		.await
	}

	pub async fn attribute(&mut self, anchor: &Anchor, name: &str) -> Result<Option<String>> {
		let (owned, name) = (anchor.clone(), name.to_string());
		self.attempt("read attribute", anchor, Budget::READ, move |backend, attempt| {
			let (anchor, name) = (owned.clone(), name.clone());
			Box::pin(async move {
				let element = anchor.current(backend.as_ref(), attempt).await?;
				backend.attribute(&element, &name).await
			})
		})
		.await
	}

	/// Waits for `locator` to become visible, then clicks its first match.
	pub async fn click(&mut self, locator: &Locator) -> Result<()> {
		self.wait_visible(locator, self.timings.default_wait()).await?;
		let owned = locator.clone();
		self.attempt("click", locator, Budget::ACTION, move |backend, _| {
			let locator = owned.clone();
			Box::pin(async move {
				let element = backend.find(&locator).await?;
				backend.click(&element).await
			})
		})
		.await
	}

	pub async fn click_anchor(&mut self, anchor: &Anchor) -> Result<()> {
		let owned = anchor.clone();
		self.attempt("click", anchor, Budget::ACTION, move |backend, attempt| {
			let anchor = owned.clone();
			Box::pin(async move {
				let element = anchor.current(backend.as_ref(), attempt).await?;
				backend.click(&element).await
			})
		})
		.await
	}

	/// Waits for `locator` to become visible, then replaces its text.
	pub async fn set_text(&mut self, locator: &Locator, text: &str) -> Result<()> {
		self.wait_visible(locator, self.timings.default_wait()).await?;
		let (owned, text) = (locator.clone(), text.to_string());
		self.attempt("set text", locator, Budget::ACTION, move |backend, _| {
			let (locator, text) = (owned.clone(), text.clone());
			Box::pin(async move {
				let element = backend.find(&locator).await?;
				backend.set_text(&element, &text).await
			})
		})
		.await
	}

	pub async fn press_confirm(&mut self) -> Result<()> {
		self.attempt("press confirm", &"device", Budget::READ, |backend, _| {
			Box::pin(async move { backend.press_confirm().await })
		})
		.await
	}

	pub async fn dismiss_keyboard(&mut self) -> Result<()> {
		self.attempt("dismiss keyboard", &"device", Budget::READ, |backend, _| {
			Box::pin(async move { backend.dismiss_keyboard().await })
		})
		.await
	}

	pub async fn navigate_back(&mut self) -> Result<()> {
		self.attempt("navigate back", &"device", Budget::READ, |backend, _| {
			Box::pin(async move { backend.navigate_back().await })
		})
		.await
	}

	pub async fn window_size(&mut self) -> Result<WindowSize> {
		self.attempt("window size", &"device", Budget::READ, |backend, _| {
			Box::pin(async move { backend.window_size().await })
		})
		.await
	}

	pub async fn swipe(&mut self, swipe: Swipe) -> Result<()> {
		self.attempt("swipe", &"viewport", Budget::READ, move |backend, _| {
			Box::pin(async move { backend.swipe(swipe).await })
		})
		.await
	}

	/// Single probe: is any match of `locator` displayed right now?
	///
	/// A dead session is repaired once and the probe repeated. An answer that
	/// stays unknown reads as `false`; only fatal errors propagate.
	pub async fn is_visible(&mut self, locator: &Locator) -> Result<bool> {
		Ok(self.check_visible(locator).await.non_fatal("visibility probe")?.unwrap_or(false))
	}

	/// Like [`ResilientQuery::is_visible`], but an unknown answer is an
	/// [`Error::Unresolvable`] instead of `false`.
	pub async fn check_visible(&mut self, locator: &Locator) -> Result<bool> {
		let mut repaired = false;
		match self.probe(locator, Check::Visible, &mut repaired).await? {
			Probe::Yes => Ok(true),
			Probe::No => Ok(false),
			Probe::Failed(source) => Err(Error::Unresolvable {
				op: "check visibility",
				target: locator.to_string(),
				source,
			}),
		}
	}

	/// Polls until `locator` is displayed or `timeout` passes.
	pub async fn wait_visible(&mut self, locator: &Locator, timeout: Duration) -> Result<bool> {
		let visible = self.poll(locator, Check::Visible, true, timeout).await?;
		if !visible {
			trace!(target = "rollcall", %locator, "not visible within wait");
		}
		Ok(visible)
	}

	/// Polls until nothing matching `locator` is displayed.
	///
	/// Returns `false` and logs a warning when the element outlives `timeout`
	/// or its absence could not be confirmed.
	pub async fn wait_until_gone(&mut self, locator: &Locator, timeout: Duration) -> Result<bool> {
		let gone = self.poll(locator, Check::Visible, false, timeout).await?;
		if !gone {
			warn!(target = "rollcall", %locator, ?timeout, "element still visible after wait");
		}
		Ok(gone)
	}

	/// Pauses for the settle interval.
	pub async fn settle(&self) {
		sleep(self.timings.settle()).await;
	}

	pub async fn pause(&self, duration: Duration) {
		sleep(duration).await;
	}

	/// Ends the current session.
	pub async fn close(self) -> rollcall_runtime::Result<()> {
		self.guardian.close().await
	}

	async fn wait_present(&mut self, locator: &Locator, timeout: Duration) -> Result<bool> {
		self.poll(locator, Check::Present, true, timeout).await
	}

	/// One answer from the current session, repairing it first if it is dead
	/// and `repaired` is still unset.
	async fn probe(&mut self, locator: &Locator, check: Check, repaired: &mut bool) -> Result<Probe> {
		loop {
			let session = self.guardian.session();
			let err = match check.run(session.as_ref(), locator).await {
				Ok(true) => return Ok(Probe::Yes),
				Ok(false) => return Ok(Probe::No),
				Err(err) => err,
			};
			if err.kind() == FailureKind::Backend && !*repaired {
				*repaired = true;
				debug!(target = "rollcall", %locator, error = %err, "probe hit a dead session, repairing");
				self.guardian.ensure(err).await?;
				continue;
			}
			return Ok(Probe::Failed(err));
		}
	}

	/// Probes at least once and then every poll interval until the answer is
	/// `expected`, the server refuses the query, or `timeout` passes. One
	/// session repair per call.
	async fn poll(&mut self, locator: &Locator, check: Check, expected: bool, timeout: Duration) -> Result<bool> {
		let deadline = Instant::now() + timeout;
		let mut repaired = false;
		loop {
			match self.probe(locator, check, &mut repaired).await? {
				Probe::Yes if expected => return Ok(true),
				Probe::No if !expected => return Ok(true),
				Probe::Failed(err) if err.kind() == FailureKind::Rejected => {
					trace!(target = "rollcall", %locator, error = %err, "query refused, not waiting");
					return Ok(false);
				}
				_ => {}
			}
			if Instant::now() >= deadline {
				return Ok(false);
			}
			sleep(self.timings.poll_interval()).await;
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
	/// At least one match exists.
	Present,
	/// At least one match is displayed.
	Visible,
}

impl Check {
	async fn run(self, session: &dyn Backend, locator: &Locator) -> BackendResult<bool> {
		let found = session.find_all(locator).await?;
		if self == Self::Present {
			return Ok(!found.is_empty());
		}
		for element in &found {
			match session.is_displayed(element).await {
				Ok(true) => return Ok(true),
				Err(err) if err.kind() == FailureKind::Backend => return Err(err),
				_ => {}
			}
		}
		Ok(false)
	}
}

#[derive(Debug)]
enum Probe {
	Yes,
	No,
	/// No answer: the query was refused or the session is still broken.
	Failed(rollcall_runtime::Error),
}
