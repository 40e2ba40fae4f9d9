//! One scoped run: connect, bootstrap, traverse, always close.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use rollcall::{RunReport, Traversal};
use rollcall_runtime::{AppiumSessionFactory, SessionFactory, WebDriverClient};
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::{CliError, Result};

pub fn session_factory(settings: &Settings) -> Result<Arc<dyn SessionFactory>> {
	let client = WebDriverClient::new(&settings.server)?;
	Ok(Arc::new(AppiumSessionFactory::new(client, settings.capabilities.clone())))
}

pub async fn execute(settings: Settings) -> Result<RunReport> {
	let factory = session_factory(&settings)?;
	execute_with(factory, settings).await
}

/// Runs against any session factory. The backend session is closed on every
/// exit path, panics included.
pub async fn execute_with(factory: Arc<dyn SessionFactory>, settings: Settings) -> Result<RunReport> {
	info!(target = "rollcall", server = %settings.server, "connecting");
	let mut traversal = Traversal::connect(factory, settings.engine).await?;

	let outcome = AssertUnwindSafe(async {
		if settings.bootstrap {
			traversal.bootstrap().await?;
		}
		traversal.run().await
	})
	.catch_unwind()
	.await;

	if let Err(err) = traversal.close().await {
		warn!(target = "rollcall", error = %err, "session close failed");
	}

	match outcome {
		Ok(result) => result.map_err(CliError::from),
		Err(panic) => std::panic::resume_unwind(panic),
	}
}

#[cfg(test)]
mod tests {
	use rollcall::testing::{FakeContact, FakeDevice, FakeFactory, FakeOp, Fault};
	use rollcall::{EngineConfig, Outcome, PolicyConfig};
	use rollcall_protocol::CapabilityProfile;

	use super::*;

	fn settings(bootstrap: bool) -> Settings {
		Settings {
			server: "http://127.0.0.1:4723/".into(),
			capabilities: CapabilityProfile::default(),
			engine: EngineConfig::immediate().with_policy(PolicyConfig {
				messages_to_send: vec!["hey".into()],
				..PolicyConfig::default()
			}),
			bootstrap,
		}
	}

	#[tokio::test]
	async fn bootstraps_runs_and_closes() {
		let device = FakeDevice::with_contacts([FakeContact::connected("Amy")]);
		let factory = Arc::new(FakeFactory::new(device.clone()));

		let report = execute_with(factory, settings(true)).await.unwrap();

		assert_eq!(report.names(Outcome::MessageSent), ["Amy"]);
		assert_eq!(device.sessions_created(), 1);
		assert_eq!(device.screen_name(), "contact list");
	}

	#[tokio::test]
	async fn fatal_failure_surfaces_as_engine_error() {
		let device = FakeDevice::with_contacts([FakeContact::connected("Amy")]).on_contact_list();
		device.inject(FakeOp::Click, Fault::Backend);
		device.fail_session_creation(2);
		let factory = Arc::new(FakeFactory::new(device.clone()));

		let err = execute_with(factory, settings(false)).await.unwrap_err();

		assert!(matches!(err, CliError::Engine(rollcall::Error::GuardianExhausted { .. })), "{err:?}");
		assert_eq!(err.exit_code(), 1);
	}

	#[tokio::test]
	async fn unreachable_server_fails_at_first_session() {
		let device = FakeDevice::new();
		device.fail_session_creation(2);
		let factory = Arc::new(FakeFactory::new(device.clone()));

		let err = execute_with(factory, settings(false)).await.unwrap_err();

		assert!(matches!(err, CliError::Engine(rollcall::Error::GuardianExhausted { attempts: 2, .. })));
	}

	#[test]
	fn malformed_server_is_rejected_before_connecting() {
		let mut bad = settings(false);
		bad.server = "::not a url".into();
		assert!(matches!(session_factory(&bad), Err(CliError::Backend(_))));
	}
}
