//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::locators::Locators;
use crate::policy::PolicyConfig;
use crate::scroll::SafeBand;
use crate::timings::Timings;

/// Everything the traversal needs besides a session factory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
	pub policy: PolicyConfig,
	pub locators: Locators,
	pub timings: Timings,
	pub safe_band: SafeBand,
}

impl EngineConfig {
	/// Defaults with [`Timings::immediate`], for tests.
	pub fn immediate() -> Self {
		Self {
			timings: Timings::immediate(),
			..Self::default()
		}
	}

	pub fn with_policy(mut self, policy: PolicyConfig) -> Self {
		self.policy = policy.normalized();
		self
	}
}
