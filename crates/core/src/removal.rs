//! Removing a contact through its profile.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Result, ResultExt};
use crate::locators::Locators;
use crate::navigation;
use crate::query::ResilientQuery;

/// Which removal flow the options menu offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RemovalPath {
	/// Manage friendship, remove, confirm.
	ManageFriendship,
	/// Connection toggle, then a yes dialog.
	Toggle,
}

/// Runs removal from an open chat and always returns to the list root after.
///
/// `Ok(None)` means the profile offered no way to remove the contact.
pub async fn remove_contact(query: &mut ResilientQuery, locators: &Locators) -> Result<Option<RemovalPath>> {
	let result = walk_removal(query, locators).await;
	if matches!(&result, Err(err) if err.is_fatal()) {
		return result;
	}
	navigation::return_to_root(query, locators).await?;
	result
}

async fn walk_removal(query: &mut ResilientQuery, locators: &Locators) -> Result<Option<RemovalPath>> {
	query.click(&locators.profile).await?;
	query.settle().await;
	query.click(&locators.options).await?;
	query.settle().await;

	let mut path = offered_path(query, locators).await?;
	if path.is_none() {
		debug!(target = "rollcall", "no removal option shown, opening options again");
		query.click(&locators.options).await.non_fatal("reopen options")?;
		query.settle().await;
		path = offered_path(query, locators).await?;
	}

	let dialog_timeout = query.timings().dialog_timeout();
	match path {
		Some(RemovalPath::ManageFriendship) => {
			query.click(&locators.manage_friendship).await?;
			query.click(&locators.remove_friend).await?;
			query.click(&locators.remove_confirm).await?;
			query.wait_until_gone(&locators.remove_confirm, dialog_timeout).await?;
		}
		Some(RemovalPath::Toggle) => {
			query.click(&locators.remove_toggle).await?;
			query.click(&locators.confirm_yes).await?;
			query.wait_until_gone(&locators.confirm_yes, dialog_timeout).await?;
		}
		None => {
			warn!(target = "rollcall", "profile offers no removal option");
			return Ok(None);
		}
	}
	info!(target = "rollcall", ?path, "removal confirmed");
	Ok(path)
}

async fn offered_path(query: &mut ResilientQuery, locators: &Locators) -> Result<Option<RemovalPath>> {
	Ok(if query.is_visible(&locators.manage_friendship).await? {
		Some(RemovalPath::ManageFriendship)
	} else if query.is_visible(&locators.remove_toggle).await? {
		Some(RemovalPath::Toggle)
	} else {
		None
	})
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::testing::{FakeContact, FakeDevice, FakeFactory, RemovalUi};
	use crate::timings::Timings;

	async fn open_chat(contact: FakeContact) -> (FakeDevice, ResilientQuery) {
		let device = FakeDevice::with_contacts([contact]).on_contact_list();
		let mut query = ResilientQuery::connect(Arc::new(FakeFactory::new(device.clone())), Timings::immediate())
			.await
			.unwrap();
		let locators = Locators::default();
		query.click(&locators.contact_name).await.unwrap();
		query.click(&locators.chat_header).await.unwrap();
		(device, query)
	}

	#[tokio::test]
	async fn manage_path_removes_and_returns() {
		let (device, mut query) = open_chat(FakeContact::stranger("Amy")).await;

		let path = remove_contact(&mut query, &Locators::default()).await.unwrap();

		assert_eq!(path, Some(RemovalPath::ManageFriendship));
		assert_eq!(device.removed(), ["Amy"]);
		assert_eq!(device.screen_name(), "contact list");
	}

	#[tokio::test]
	async fn toggle_path_with_stubborn_options() {
		let contact = FakeContact::stranger("Amy")
			.with_removal(RemovalUi::Toggle)
			.with_stubborn_options();
		let (device, mut query) = open_chat(contact).await;

		let path = remove_contact(&mut query, &Locators::default()).await.unwrap();

		assert_eq!(path, Some(RemovalPath::Toggle));
		assert_eq!(device.removed(), ["Amy"]);
		assert_eq!(device.screen_name(), "contact list");
	}

	#[tokio::test]
	async fn no_option_still_returns_to_list() {
		let contact = FakeContact::stranger("Amy").with_removal(RemovalUi::Unavailable);
		let (device, mut query) = open_chat(contact).await;

		let path = remove_contact(&mut query, &Locators::default()).await.unwrap();

		assert_eq!(path, None);
		assert!(device.removed().is_empty());
		assert_eq!(device.screen_name(), "contact list");
	}
}
