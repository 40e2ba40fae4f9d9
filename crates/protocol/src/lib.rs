//! Wire and value types shared by the rollcall backend and engine.
//!
//! Nothing in this crate talks to a server. It defines the vocabulary the
//! other crates exchange:
//!
//! - [`Locator`] - declarative queries against the remote UI tree
//! - [`ElementRef`] - a resolved, use-once handle to a located element
//! - [`Bounds`], [`WindowSize`], [`Swipe`] - screen geometry and gestures
//! - [`CapabilityProfile`] - the session capabilities sent on session creation
//! - [`wire`] - W3C WebDriver response and error envelopes

pub mod capabilities;
pub mod element;
pub mod geometry;
pub mod locator;
pub mod wire;

pub use capabilities::CapabilityProfile;
pub use element::ElementRef;
pub use geometry::{Bounds, Swipe, WindowSize};
pub use locator::Locator;
