//! Wait, poll and settle durations used by the engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// All engine delays, in milliseconds on the wire.
///
/// Tests use [`Timings::immediate`] so waits collapse to a single probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timings {
	/// Upper bound for visibility and presence waits.
	pub default_wait_ms: u64,
	/// Pause between wait probes and before stale retries.
	pub poll_interval_ms: u64,
	/// Pause after navigation and between list re-reads.
	pub settle_ms: u64,
	/// Pause between attempts of a transiently failing click or text entry.
	pub action_retry_pause_ms: u64,
	/// Pause after each scroll gesture.
	pub scroll_settle_ms: u64,
	/// Pause between failed session creation attempts.
	pub repair_backoff_ms: u64,
	/// How long removal waits for its confirmation dialog to close.
	pub dialog_timeout_ms: u64,
	/// Duration of the swipe gesture itself.
	pub swipe_duration_ms: u64,
}

impl Default for Timings {
	fn default() -> Self {
		Self {
			default_wait_ms: 7_000,
			poll_interval_ms: 500,
			settle_ms: 1_000,
			action_retry_pause_ms: 700,
			scroll_settle_ms: 700,
			repair_backoff_ms: 1_000,
			dialog_timeout_ms: 15_000,
			swipe_duration_ms: 200,
		}
	}
}

impl Timings {
	/// No waiting at all.
	pub fn immediate() -> Self {
		Self {
			default_wait_ms: 0,
			poll_interval_ms: 0,
			settle_ms: 0,
			action_retry_pause_ms: 0,
			scroll_settle_ms: 0,
			repair_backoff_ms: 0,
			dialog_timeout_ms: 0,
			..Self::default()
		}
	}

	pub fn default_wait(&self) -> Duration {
		Duration::from_millis(self.default_wait_ms)
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}

	pub fn settle(&self) -> Duration {
		Duration::from_millis(self.settle_ms)
	}

	pub fn action_retry_pause(&self) -> Duration {
		Duration::from_millis(self.action_retry_pause_ms)
	}

	pub fn scroll_settle(&self) -> Duration {
		Duration::from_millis(self.scroll_settle_ms)
	}

	pub fn repair_backoff(&self) -> Duration {
		Duration::from_millis(self.repair_backoff_ms)
	}

	pub fn dialog_timeout(&self) -> Duration {
		Duration::from_millis(self.dialog_timeout_ms)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_override_keeps_defaults() {
		let timings: Timings = serde_json::from_str(r#"{"defaultWaitMs": 3000}"#).unwrap();
		assert_eq!(timings.default_wait(), Duration::from_secs(3));
		assert_eq!(timings.poll_interval(), Duration::from_millis(500));
		assert_eq!(timings.dialog_timeout(), Duration::from_secs(15));
	}

	#[test]
	fn immediate_zeroes_waits_but_keeps_gesture_speed() {
		let timings = Timings::immediate();
		assert_eq!(timings.default_wait(), Duration::ZERO);
		assert_eq!(timings.repair_backoff(), Duration::ZERO);
		assert_eq!(timings.swipe_duration_ms, 200);
	}
}
