//! Session guardian: owns the live backend session and replaces it when it breaks.

use std::sync::Arc;
use std::time::Duration;

use rollcall_runtime::{Backend, SessionFactory};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};

/// Session creation attempts per repair (and for the initial session).
pub const MAX_REPAIR_ATTEMPTS: u32 = 2;

/// Holds the one live session. Nothing else in the engine keeps a session
/// beyond a single operation; callers fetch [`SessionGuardian::session`] per attempt.
pub struct SessionGuardian {
	factory: Arc<dyn SessionFactory>,
	session: Arc<dyn Backend>,
	backoff: Duration,
	repairs: u32,
}

impl SessionGuardian {
	/// Creates the initial session under the same bounded policy as a repair.
	pub async fn connect(factory: Arc<dyn SessionFactory>, backoff: Duration) -> Result<Self> {
		let session = create_bounded(factory.as_ref(), backoff).await?;
		info!(target = "rollcall", session = session.session_id(), "session established");
		Ok(Self {
			factory,
			session,
			backoff,
			repairs: 0,
		})
	}

	/// The current session.
	pub fn session(&self) -> Arc<dyn Backend> {
		Arc::clone(&self.session)
	}

	/// Successful replacements so far.
	pub fn repairs(&self) -> u32 {
		self.repairs
	}

	/// Replaces the session after `cause` and returns the new one.
	///
	/// Only backend failures lead to a repair; anything else comes back as
	/// [`Error::Unrecoverable`]. The broken session is closed best-effort first.
	pub async fn ensure(&mut self, cause: rollcall_runtime::Error) -> Result<Arc<dyn Backend>> {
		if !cause.is_backend_failure() {
			return Err(Error::Unrecoverable(cause));
		}
		warn!(target = "rollcall", session = self.session.session_id(), error = %cause, "session broken, replacing");

		if let Err(err) = self.session.close().await {
			debug!(target = "rollcall", error = %err, "closing broken session failed");
		}

		let session = create_bounded(self.factory.as_ref(), self.backoff).await?;
		self.repairs += 1;
		info!(target = "rollcall", session = session.session_id(), repairs = self.repairs, "session replaced");
		self.session = Arc::clone(&session);
		Ok(session)
	}

	/// Ends the current session.
	pub async fn close(self) -> rollcall_runtime::Result<()> {
		self.session.close().await
	}
}

async fn create_bounded(factory: &dyn SessionFactory, backoff: Duration) -> Result<Arc<dyn Backend>> {
	let mut last = rollcall_runtime::Error::BackendFailure("no session attempt made".into());
	for attempt in 1..=MAX_REPAIR_ATTEMPTS {
		match factory.create().await {
			Ok(session) => return Ok(session),
			Err(err) if err.is_backend_failure() => {
				error!(target = "rollcall", attempt, max = MAX_REPAIR_ATTEMPTS, error = %err, "session creation failed");
				last = err;
				if attempt < MAX_REPAIR_ATTEMPTS {
					tokio::time::sleep(backoff).await;
				}
			}
			Err(err) => return Err(Error::Unrecoverable(err)),
		}
	}
	Err(Error::GuardianExhausted {
		attempts: MAX_REPAIR_ATTEMPTS,
		source: last,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{FakeDevice, FakeFactory};

	#[tokio::test]
	async fn repair_replaces_session_and_counts() {
		let device = FakeDevice::new();
		let factory = FakeFactory::new(device.clone());
		let mut guardian = SessionGuardian::connect(Arc::new(factory), Duration::ZERO).await.unwrap();
		let first = guardian.session().session_id().to_string();

		let replacement = guardian
			.ensure(rollcall_runtime::Error::BackendFailure("socket hang up".into()))
			.await
			.unwrap();

		assert_ne!(replacement.session_id(), first);
		assert_eq!(guardian.repairs(), 1);
		assert_eq!(device.sessions_created(), 2);
	}

	#[tokio::test]
	async fn non_backend_cause_is_unrecoverable() {
		let device = FakeDevice::new();
		let mut guardian = SessionGuardian::connect(Arc::new(FakeFactory::new(device.clone())), Duration::ZERO)
			.await
			.unwrap();

		let err = guardian
			.ensure(rollcall_runtime::Error::InvalidArgument("bad keycode".into()))
			.await
			.err()
			.unwrap();

		assert!(matches!(err, Error::Unrecoverable(_)));
		assert_eq!(device.sessions_created(), 1);
	}

	#[tokio::test]
	async fn two_failed_creations_exhaust_the_guardian() {
		let device = FakeDevice::new();
		let mut guardian = SessionGuardian::connect(Arc::new(FakeFactory::new(device.clone())), Duration::ZERO)
			.await
			.unwrap();
		device.fail_session_creation(2);

		let err = guardian
			.ensure(rollcall_runtime::Error::BackendFailure("gone".into()))
			.await
			.err()
			.unwrap();

		assert!(matches!(err, Error::GuardianExhausted { attempts: 2, .. }));
		assert!(err.is_fatal());
	}

	#[tokio::test]
	async fn one_failed_creation_is_absorbed() {
		let device = FakeDevice::new();
		device.fail_session_creation(1);
		let guardian = SessionGuardian::connect(Arc::new(FakeFactory::new(device.clone())), Duration::ZERO)
			.await
			.unwrap();

		assert_eq!(guardian.repairs(), 0);
		assert_eq!(device.sessions_created(), 1);
	}
}
