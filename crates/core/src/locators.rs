//! Element locators for every screen the engine touches.
//!
//! Defaults target the Snapchat Android client. Any subset can be overridden
//! from the config file; unspecified fields keep their defaults.

use rollcall_protocol::Locator;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Locators {
	/// Bottom-bar tab leading to conversations.
	pub chat_tab: Locator,
	/// Marker visible on the conversation screen; clicking it opens the contact list.
	pub list_root: Locator,
	/// Direct query for section headers.
	pub sections: Locator,
	/// Broad query scanned when the direct section query is unsupported or empty.
	pub section_candidates: Locator,
	/// Contact rows, relative to a section.
	pub contact_rows: Locator,
	/// Name label, relative to a contact row.
	pub contact_name: Locator,
	/// Button on the opened contact preview that enters the chat.
	pub chat_header: Locator,
	pub message_field: Locator,
	/// Shown in the chat header when the contact is not connected.
	pub add_friend: Locator,
	/// Shown in the chat header when the contact is connected.
	pub video_call: Locator,
	/// Header label opening the contact's profile.
	pub profile: Locator,
	/// Profile overflow menu.
	pub options: Locator,
	pub manage_friendship: Locator,
	pub remove_friend: Locator,
	/// Confirm button of the remove dialog.
	pub remove_confirm: Locator,
	/// Connection toggle offered instead of the manage path.
	pub remove_toggle: Locator,
	/// Confirm button shown after using the toggle.
	pub confirm_yes: Locator,
	/// Attribute carrying a node's identifier, read by the section scan.
	pub section_id_attribute: String,
	/// Attribute carrying `[x1,y1][x2,y2]` on-screen bounds.
	pub bounds_attribute: String,
}

impl Default for Locators {
	fn default() -> Self {
		Self {
			chat_tab: Locator::xpath(r#"//android.view.ViewGroup[@content-desc="Chat"]"#),
			list_root: Locator::xpath("//android.widget.RelativeLayout"),
			sections: Locator::xpath("//android.view.View[matches(@resource-id, '^([A-Z]|#)$')]"),
			section_candidates: Locator::xpath("//android.view.View"),
			contact_rows: Locator::xpath("//android.view.View[starts-with(@resource-id,'select_recipients_friends')]"),
			contact_name: Locator::xpath(".//android.widget.TextView[1]"),
			chat_header: Locator::xpath(r#"//android.widget.Button[@content-desc="Chat"]"#),
			message_field: Locator::xpath(
				r#"//android.widget.EditText[@resource-id="com.snapchat.android:id/chat_input_text_field"]"#,
			),
			add_friend: Locator::xpath(r#"//android.widget.Button[@resource-id="chat-header-add-friend-button"]"#),
			video_call: Locator::xpath(r#"//android.view.View[@content-desc="Start a video call"]"#),
			profile: Locator::xpath(
				r#"//android.widget.TextView[@resource-id="com.snapchat.android:id/0_resource_name_obfuscated"]"#,
			),
			options: Locator::xpath(
				r#"(//android.view.View[@resource-id="upp-menu-button"]) | ((//android.view.View[@resource-id="unified_profile_icon_button_action_menu"])[1])"#,
			),
			manage_friendship: Locator::xpath(r#"//javaClass[@text="Manage Friendship"]"#),
			remove_friend: Locator::xpath(r#"//javaClass[@text="Remove Friend"]"#),
			remove_confirm: Locator::xpath(
				r#"//android.widget.LinearLayout[@resource-id="com.snapchat.android:id/dialog_content"]/android.view.View"#,
			),
			remove_toggle: Locator::xpath(r#"//android.widget.TextView[@content-desc="Add"]"#),
			confirm_yes: Locator::xpath(
				r#"//android.view.View[@resource-id="com.snapchat.android:id/composer_alert_confirm"]"#,
			),
			section_id_attribute: "resource-id".into(),
			bounds_attribute: "bounds".into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn override_replaces_only_named_locators() {
		let locators: Locators =
			serde_json::from_str(r#"{"chatTab": {"accessibilityId": "Chat"}, "boundsAttribute": "rect"}"#).unwrap();
		assert_eq!(locators.chat_tab, Locator::AccessibilityId("Chat".into()));
		assert_eq!(locators.bounds_attribute, "rect");
		assert_eq!(locators.list_root, Locators::default().list_root);
	}
}
