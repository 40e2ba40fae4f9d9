//! Getting back to the contact list.

use tracing::{debug, warn};

use crate::error::{Result, ResultExt};
use crate::locators::Locators;
use crate::query::ResilientQuery;

/// Extra back presses after the first while looking for the list root.
pub const ROOT_BACK_RETRIES: u32 = 3;
/// Back presses allowed when recovering from a failed contact click.
pub const RECOVERY_BACK_ATTEMPTS: u32 = 4;

/// Backs out of a chat or profile and reopens the contact list.
///
/// Returns whether the list root was found and activated. Only fatal errors
/// propagate.
pub async fn return_to_root(query: &mut ResilientQuery, locators: &Locators) -> Result<bool> {
	query.dismiss_keyboard().await.non_fatal("dismiss keyboard")?;
	query.settle().await;
	query.navigate_back().await.non_fatal("navigate back")?;
	query.settle().await;

	for retry in 1..=ROOT_BACK_RETRIES {
		if query.is_visible(&locators.list_root).await? {
			break;
		}
		debug!(target = "rollcall", retry, "list root not visible, backing out further");
		query.navigate_back().await.non_fatal("navigate back")?;
		query.settle().await;
	}

	open_list_root(query, locators).await
}

/// Presses back until the list root shows, then reopens the contact list.
pub async fn recover_to_root(query: &mut ResilientQuery, locators: &Locators) -> Result<bool> {
	let mut presses = 0;
	while presses < RECOVERY_BACK_ATTEMPTS && !query.is_visible(&locators.list_root).await? {
		query.navigate_back().await.non_fatal("navigate back")?;
		query.settle().await;
		presses += 1;
	}
	open_list_root(query, locators).await
}

/// Opens the conversations tab and then the contact list.
pub async fn bootstrap(query: &mut ResilientQuery, locators: &Locators) -> Result<()> {
	if query.click(&locators.chat_tab).await.non_fatal("open chat tab")?.is_none() {
		warn!(target = "rollcall", "chat tab not found, assuming it is already open");
	}
	query.settle().await;
	if query.click(&locators.list_root).await.non_fatal("open contact list")?.is_none() {
		warn!(target = "rollcall", "could not open the contact list");
	}
	query.settle().await;
	Ok(())
}

async fn open_list_root(query: &mut ResilientQuery, locators: &Locators) -> Result<bool> {
	if !query.is_visible(&locators.list_root).await? {
		warn!(target = "rollcall", "list root not reachable, continuing from the current screen");
		return Ok(false);
	}
	let opened = query.click(&locators.list_root).await.non_fatal("open list root")?.is_some();
	query.settle().await;
	Ok(opened)
}
