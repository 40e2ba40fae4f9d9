//! Session capability profile.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Capabilities requested when a session is created.
///
/// The same profile is reused for every replacement session, so anything
/// that would wipe device state (`fullReset`) stays off by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapabilityProfile {
	pub platform_name: String,
	pub automation_name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub app_package: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub app_activity: Option<String>,
	pub auto_grant_permissions: bool,
	pub ignore_hidden_api_policy_error: bool,
	/// Seconds the server waits for a new command before ending the session.
	pub new_command_timeout_secs: u64,
	pub adb_exec_timeout_ms: u64,
	pub server_launch_timeout_ms: u64,
	pub server_install_timeout_ms: u64,
	pub no_reset: bool,
	pub full_reset: bool,
}

impl Default for CapabilityProfile {
	fn default() -> Self {
		Self {
			platform_name: "Android".into(),
			automation_name: "UiAutomator2".into(),
			app_package: Some("com.snapchat.android".into()),
			app_activity: Some("com.snap.mushroom.MainActivity".into()),
			auto_grant_permissions: true,
			ignore_hidden_api_policy_error: true,
			new_command_timeout_secs: 86_400,
			adb_exec_timeout_ms: 8_640_000,
			server_launch_timeout_ms: 8_640_000,
			server_install_timeout_ms: 8_640_000,
			no_reset: true,
			full_reset: false,
		}
	}
}

impl CapabilityProfile {
	/// `alwaysMatch` capability map with `appium:` vendor prefixes.
	pub fn to_always_match(&self) -> Map<String, Value> {
		let mut caps = Map::new();
		caps.insert("platformName".into(), json!(self.platform_name));
		caps.insert("appium:automationName".into(), json!(self.automation_name));
		if let Some(package) = &self.app_package {
			caps.insert("appium:appPackage".into(), json!(package));
		}
		if let Some(activity) = &self.app_activity {
			caps.insert("appium:appActivity".into(), json!(activity));
		}
		caps.insert("appium:autoGrantPermissions".into(), json!(self.auto_grant_permissions));
		caps.insert("appium:ignoreHiddenApiPolicyError".into(), json!(self.ignore_hidden_api_policy_error));
		caps.insert("appium:newCommandTimeout".into(), json!(self.new_command_timeout_secs));
		caps.insert("appium:adbExecTimeout".into(), json!(self.adb_exec_timeout_ms));
		caps.insert("appium:uiautomator2ServerLaunchTimeout".into(), json!(self.server_launch_timeout_ms));
		caps.insert("appium:uiautomator2ServerInstallTimeout".into(), json!(self.server_install_timeout_ms));
		caps.insert("appium:noReset".into(), json!(self.no_reset));
		caps.insert("appium:fullReset".into(), json!(self.full_reset));
		caps
	}

	/// Body for `POST /session`.
	pub fn to_new_session_body(&self) -> Value {
		json!({ "capabilities": { "alwaysMatch": self.to_always_match(), "firstMatch": [{}] } })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn new_session_body_prefixes_vendor_capabilities() {
		let body = CapabilityProfile::default().to_new_session_body();
		let always = &body["capabilities"]["alwaysMatch"];
		assert_eq!(always["platformName"], "Android");
		assert_eq!(always["appium:appPackage"], "com.snapchat.android");
		assert_eq!(always["appium:noReset"], true);
		assert_eq!(always["appium:newCommandTimeout"], 86_400);
	}

	#[test]
	fn partial_profile_fills_defaults() {
		let profile: CapabilityProfile = serde_json::from_str(r#"{"appPackage": "com.example.app"}"#).unwrap();
		assert_eq!(profile.app_package.as_deref(), Some("com.example.app"));
		assert_eq!(profile.automation_name, "UiAutomator2");
		assert!(profile.no_reset);
	}

	#[test]
	fn omitted_app_fields_are_not_sent() {
		let profile = CapabilityProfile {
			app_package: None,
			app_activity: None,
			..Default::default()
		};
		let caps = profile.to_always_match();
		assert!(!caps.contains_key("appium:appPackage"));
		assert!(!caps.contains_key("appium:appActivity"));
	}
}
