//! Element handles.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// W3C web element identifier key.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a86c-4ea47d4e5e99";

/// Legacy JSONWP key still emitted by some Appium drivers.
pub const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// A resolved handle to an element in the remote UI tree.
///
/// Handles are only meaningful for the session and UI state they were
/// resolved against. The tree can mutate at any time, so callers re-resolve
/// instead of holding on to them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(Arc<str>);

impl ElementRef {
	pub fn new(id: impl AsRef<str>) -> Self {
		Self(Arc::from(id.as_ref()))
	}

	pub fn id(&self) -> &str {
		&self.0
	}

	/// Reads an element reference out of a find-element response value.
	pub fn from_wire(value: &serde_json::Value) -> Option<Self> {
		value
			.get(ELEMENT_KEY)
			.or_else(|| value.get(LEGACY_ELEMENT_KEY))
			.and_then(|v| v.as_str())
			.map(Self::new)
	}

	pub fn to_wire(&self) -> serde_json::Value {
		serde_json::json!({ ELEMENT_KEY: self.id(), LEGACY_ELEMENT_KEY: self.id() })
	}
}

impl fmt::Display for ElementRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl Serialize for ElementRef {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.to_wire().serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for ElementRef {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let value = serde_json::Value::deserialize(deserializer)?;
		Self::from_wire(&value).ok_or_else(|| serde::de::Error::custom("missing web element identifier"))
	}
}
