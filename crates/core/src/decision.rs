//! Deciding what to do with an opened contact.

use tracing::{info, warn};

use crate::error::Result;
use crate::locators::Locators;
use crate::navigation;
use crate::policy::{Classification, HeaderSignals, Outcome, PolicyConfig};
use crate::query::ResilientQuery;
use crate::removal;

/// Classifies the contact whose preview is open, then messages it, removes
/// it, or leaves it alone.
pub struct DecisionPolicy<'a> {
	locators: &'a Locators,
	policy: &'a PolicyConfig,
}

impl<'a> DecisionPolicy<'a> {
	pub fn new(locators: &'a Locators, policy: &'a PolicyConfig) -> Self {
		Self { locators, policy }
	}

	/// Decides and acts for `name`.
	///
	/// A non-fatal failure before the contact was found to be not connected
	/// gets one more try at the send path. A not-connected contact is never
	/// messaged, and a contact whose header could not be read is never removed.
	pub async fn decide(&self, query: &mut ResilientQuery, name: &str) -> Result<Outcome> {
		let mut classified = None;
		let err = match self.classify_and_act(query, name, &mut classified).await {
			Ok(outcome) => return Ok(outcome),
			Err(err) if err.is_fatal() => return Err(err),
			Err(err) => err,
		};

		if classified == Some(Classification::NotConnected) {
			// only removal fails after this classification, and it has already returned to the list
			warn!(target = "rollcall", name, error = %err, "removal failed");
			return Ok(Outcome::SkippedUnresolvable);
		}
		if !self.policy.send_allowed(name) {
			warn!(target = "rollcall", name, error = %err, "decision failed");
			navigation::return_to_root(query, self.locators).await?;
			return Ok(Outcome::SkippedUnresolvable);
		}

		warn!(target = "rollcall", name, error = %err, "decision failed, trying the send path once more");
		match self.send_messages(query, name).await {
			Ok(Outcome::MessageSent) => Ok(Outcome::MessageSent),
			Ok(_) => Ok(Outcome::SkippedUnresolvable),
			Err(err) if err.is_fatal() => Err(err),
			Err(err) => {
				warn!(target = "rollcall", name, error = %err, "send fallback failed");
				navigation::return_to_root(query, self.locators).await?;
				Ok(Outcome::SkippedUnresolvable)
			}
		}
	}

	async fn classify_and_act(
		&self,
		query: &mut ResilientQuery,
		name: &str,
		classified: &mut Option<Classification>,
	) -> Result<Outcome> {
		query.dismiss_keyboard().await?;
		query.click(&self.locators.chat_header).await?;
		query.dismiss_keyboard().await?;
		query.settle().await;

		let signals = HeaderSignals {
			add_friend_visible: query.check_visible(&self.locators.add_friend).await?,
			video_call_visible: query.check_visible(&self.locators.video_call).await?,
		};
		let classification = self.policy.connection.classify(signals);
		*classified = Some(classification);
		info!(target = "rollcall", name, ?classification, ?signals, "contact classified");

		match classification {
			Classification::NotConnected => {
				if !self.policy.removal_enabled {
					info!(target = "rollcall", name, "not connected, removal disabled");
					return self.leave(query).await;
				}
				if self.policy.is_exempt_from_removal(name) {
					info!(target = "rollcall", name, "not connected, exempt from removal");
					return self.leave(query).await;
				}
				match removal::remove_contact(query, self.locators).await? {
					Some(path) => {
						info!(target = "rollcall", name, ?path, "contact removed");
						Ok(Outcome::Removed)
					}
					None => Ok(Outcome::SkippedUnresolvable),
				}
			}
			Classification::Connected => {
				if !self.policy.send_allowed(name) {
					info!(target = "rollcall", name, "connected, not on the send allow-list");
					return self.leave(query).await;
				}
				self.send_messages(query, name).await
			}
		}
	}

	/// Types and confirms each configured message, then returns to the list.
	async fn send_messages(&self, query: &mut ResilientQuery, name: &str) -> Result<Outcome> {
		if self.policy.messages_to_send.is_empty() {
			warn!(target = "rollcall", name, "no messages configured");
			return self.leave(query).await;
		}
		for message in &self.policy.messages_to_send {
			query.set_text(&self.locators.message_field, message).await?;
			query.press_confirm().await?;
			query.settle().await;
		}
		info!(target = "rollcall", name, count = self.policy.messages_to_send.len(), "messages sent");
		navigation::return_to_root(query, self.locators).await?;
		Ok(Outcome::MessageSent)
	}

	async fn leave(&self, query: &mut ResilientQuery) -> Result<Outcome> {
		navigation::return_to_root(query, self.locators).await?;
		Ok(Outcome::SkippedByPolicy)
	}
}
