//! Screen geometry and touch gestures.

use serde::{Deserialize, Serialize};

/// Device window size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
	pub width: i32,
	pub height: i32,
}

impl WindowSize {
	pub fn center(&self) -> (i32, i32) {
		(self.width / 2, self.height / 2)
	}
}

/// Element rectangle as reported by the Android `bounds` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
	pub x1: i32,
	pub y1: i32,
	pub x2: i32,
	pub y2: i32,
}

impl Bounds {
	/// Parses `[x1,y1][x2,y2]`.
	///
	/// Returns `None` for blank or malformed input.
	pub fn parse(raw: &str) -> Option<Self> {
		let cleaned = raw.trim().replace('[', "").replace(']', ",");
		let mut parts = cleaned.split(',').map(str::trim).filter(|p| !p.is_empty());
		let mut next = || parts.next()?.parse::<i32>().ok();
		let bounds = Self {
			x1: next()?,
			y1: next()?,
			x2: next()?,
			y2: next()?,
		};
		if next().is_some() {
			return None;
		}
		Some(bounds)
	}

	pub fn center_y(&self) -> i32 {
		(self.y1 + self.y2) / 2
	}
}

/// A single-finger touch swipe in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swipe {
	pub start_x: i32,
	pub start_y: i32,
	pub end_x: i32,
	pub end_y: i32,
	pub duration_ms: u64,
}

impl Swipe {
	/// W3C `POST /actions` body: pointer move, down, timed move, up.
	pub fn to_actions(&self) -> serde_json::Value {
		serde_json::json!({
			"actions": [{
				"type": "pointer",
				"id": "finger",
				"parameters": { "pointerType": "touch" },
				"actions": [
					{ "type": "pointerMove", "duration": 0, "origin": "viewport", "x": self.start_x, "y": self.start_y },
					{ "type": "pointerDown", "button": 0 },
					{ "type": "pointerMove", "duration": self.duration_ms, "origin": "viewport", "x": self.end_x, "y": self.end_y },
					{ "type": "pointerUp", "button": 0 }
				]
			}]
		})
	}
}
