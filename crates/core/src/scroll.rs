//! Scrolls a list element into the band of the screen where taps are safe.
//!
//! Near the top of the screen the app overlays its header; near the bottom,
//! the navigation bar. An element is tappable when it lies entirely inside
//! `[top_margin, height - bottom_margin]`.

use rollcall_protocol::{Bounds, Swipe, WindowSize};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::anchor::Anchor;
use crate::error::{Result, ResultExt};
use crate::query::ResilientQuery;

/// Swipes per element before giving up.
pub const MAX_SCROLL_ATTEMPTS: u32 = 20;
pub const MIN_SWIPE_DISTANCE: i32 = 120;
pub const MAX_SWIPE_DISTANCE: i32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SafeBand {
	pub top_margin: i32,
	pub bottom_margin: i32,
}

impl Default for SafeBand {
	fn default() -> Self {
		Self {
			top_margin: 500,
			bottom_margin: 200,
		}
	}
}

impl SafeBand {
	pub fn contains(&self, bounds: &Bounds, window: WindowSize) -> bool {
		bounds.y1 >= self.top_margin
			&& bounds.y2 <= window.height - self.bottom_margin
			&& bounds.x1 >= 0
			&& bounds.x2 <= window.width
	}
}

/// The swipe that moves `bounds` toward the middle of the screen, or `None`
/// when it already sits inside the band.
///
/// Unknown bounds are treated as already centered, which yields the minimum
/// swipe distance.
pub fn plan_swipe(bounds: Option<Bounds>, window: WindowSize, band: SafeBand, duration_ms: u64) -> Option<Swipe> {
	if bounds.is_some_and(|b| band.contains(&b, window)) {
		return None;
	}
	let (center_x, center_y) = window.center();
	let element_y = bounds.map_or(center_y, |b| b.center_y());
	let offset = element_y - center_y;
	let distance = offset.abs().clamp(MIN_SWIPE_DISTANCE, MAX_SWIPE_DISTANCE);
	// Below center: drag content up. Otherwise drag it down.
	let end_y = if offset > 0 { center_y - distance } else { center_y + distance };
	Some(Swipe {
		start_x: center_x,
		start_y: center_y,
		end_x: center_x,
		end_y,
		duration_ms,
	})
}

/// Swipes until `target` lies inside `band`.
///
/// Returns whether it got there. Only fatal errors propagate; the caller tries
/// the click either way.
pub async fn scroll_into_view(query: &mut ResilientQuery, target: &Anchor, bounds_attribute: &str, band: SafeBand) -> Result<bool> {
	let Some(window) = query.window_size().await.non_fatal("window size")? else {
		warn!(target = "rollcall", "window size unavailable, not scrolling");
		return Ok(false);
	};
	let duration_ms = query.timings().swipe_duration_ms;

	for attempt in 0..MAX_SCROLL_ATTEMPTS {
		let raw = query.attribute(target, bounds_attribute).await.non_fatal("read bounds")?;
		let bounds = raw.flatten().as_deref().and_then(Bounds::parse);
		let Some(swipe) = plan_swipe(bounds, window, band, duration_ms) else {
			return Ok(true);
		};
		debug!(target = "rollcall", attempt, ?bounds, from = swipe.start_y, to = swipe.end_y, "scrolling toward safe band");
		if query.swipe(swipe).await.non_fatal("swipe")?.is_none() {
			warn!(target = "rollcall", "swipe failed, giving up on scrolling");
			return Ok(false);
		}
		query.pause(query.timings().scroll_settle()).await;
	}

	warn!(target = "rollcall", attempts = MAX_SCROLL_ATTEMPTS, element = %target, "element not brought into safe band");
	Ok(false)
}
