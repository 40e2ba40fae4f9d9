//! Declarative element queries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A query against the remote UI tree yielding zero or more elements.
///
/// Serializes as `{"xpath": "..."}`, `{"id": "..."}` and so on so locator
/// overrides read naturally in config files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Locator {
	/// Structural path with attribute predicates.
	Xpath(String),
	/// Platform resource id (`com.example:id/name`).
	Id(String),
	/// Accessibility label (`content-desc` on Android).
	AccessibilityId(String),
	/// Widget class name.
	ClassName(String),
}

impl Locator {
	pub fn xpath(expr: impl Into<String>) -> Self {
		Self::Xpath(expr.into())
	}

	pub fn id(id: impl Into<String>) -> Self {
		Self::Id(id.into())
	}

	/// W3C `using` strategy name.
	pub fn strategy(&self) -> &'static str {
		match self {
			Self::Xpath(_) => "xpath",
			Self::Id(_) => "id",
			Self::AccessibilityId(_) => "accessibility id",
			Self::ClassName(_) => "class name",
		}
	}

	pub fn value(&self) -> &str {
		match self {
			Self::Xpath(v) | Self::Id(v) | Self::AccessibilityId(v) | Self::ClassName(v) => v,
		}
	}

	/// Request body for the find-element family of commands.
	pub fn to_query(&self) -> serde_json::Value {
		serde_json::json!({ "using": self.strategy(), "value": self.value() })
	}
}

impl fmt::Display for Locator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}={}", self.strategy(), self.value())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn query_uses_w3c_strategy_names() {
		let loc = Locator::AccessibilityId("Chat".into());
		assert_eq!(loc.to_query(), serde_json::json!({ "using": "accessibility id", "value": "Chat" }));
	}

	#[test]
	fn deserializes_from_tagged_object() {
		let loc: Locator = serde_json::from_str(r#"{"xpath": "//android.view.View"}"#).unwrap();
		assert_eq!(loc, Locator::xpath("//android.view.View"));
		assert_eq!(loc.to_string(), "xpath=//android.view.View");
	}
}
