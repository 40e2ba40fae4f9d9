//! Per-contact policy: who gets processed, who may be messaged, who is
//! exempt from removal, and how connection state is read from the chat header.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyConfig {
	/// Sent in order to every connected, allowed contact.
	pub messages_to_send: Vec<String>,
	/// Contacts whose name contains any of these are never removed.
	pub exempt_from_removal_if_name_contains: Vec<String>,
	/// When non-empty, only contacts whose name contains one of these are messaged.
	pub allow_send_only_if_name_contains: Vec<String>,
	pub removal_enabled: bool,
	pub connection: ConnectionHeuristic,
}

impl PolicyConfig {
	/// Trims every entry and drops blank ones.
	pub fn normalized(mut self) -> Self {
		fn clean(list: &mut Vec<String>) {
			*list = list
				.iter()
				.map(|s| s.trim())
				.filter(|s| !s.is_empty())
				.map(str::to_string)
				.collect();
		}
		clean(&mut self.messages_to_send);
		clean(&mut self.exempt_from_removal_if_name_contains);
		clean(&mut self.allow_send_only_if_name_contains);
		self
	}

	pub fn is_exempt_from_removal(&self, name: &str) -> bool {
		contains_any(name, &self.exempt_from_removal_if_name_contains)
	}

	/// An empty allow-list allows everyone.
	pub fn send_allowed(&self, name: &str) -> bool {
		self.allow_send_only_if_name_contains.is_empty() || contains_any(name, &self.allow_send_only_if_name_contains)
	}

	/// Whether the contact is worth opening at all.
	///
	/// Blank names are never processed. With removal disabled, a non-empty
	/// allow-list limits processing to the contacts it allows.
	pub fn should_process(&self, name: &str) -> bool {
		if name.trim().is_empty() {
			return false;
		}
		self.removal_enabled || self.send_allowed(name)
	}
}

/// Case-insensitive substring match against any non-blank needle.
fn contains_any(name: &str, needles: &[String]) -> bool {
	let name = name.to_lowercase();
	needles
		.iter()
		.map(|n| n.trim())
		.filter(|n| !n.is_empty())
		.any(|n| name.contains(&n.to_lowercase()))
}

/// Header signals read from an open chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSignals {
	pub add_friend_visible: bool,
	pub video_call_visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Classification {
	Connected,
	NotConnected,
}

/// How [`HeaderSignals`] map to a [`Classification`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionHeuristic {
	/// Not connected when the add affordance shows or no video call is offered.
	#[default]
	Combined,
	/// Not connected whenever the add affordance shows.
	AddAffordance,
	/// Not connected whenever no video call is offered.
	VideoCall,
}

impl ConnectionHeuristic {
	pub fn classify(self, signals: HeaderSignals) -> Classification {
		let not_connected = match self {
			Self::Combined => signals.add_friend_visible || !signals.video_call_visible,
			Self::AddAffordance => signals.add_friend_visible,
			Self::VideoCall => !signals.video_call_visible,
		};
		if not_connected {
			Classification::NotConnected
		} else {
			Classification::Connected
		}
	}
}

/// What happened to one contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
	MessageSent,
	Removed,
	SkippedByPolicy,
	SkippedUnresolvable,
}

impl Outcome {
	/// A removal shifts later rows up by one, so the same index is processed again.
	pub fn rewinds(self) -> bool {
		self == Self::Removed
	}
}

impl fmt::Display for Outcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::MessageSent => "message sent",
			Self::Removed => "removed",
			Self::SkippedByPolicy => "skipped by policy",
			Self::SkippedUnresolvable => "skipped (unresolvable)",
		})
	}
}
