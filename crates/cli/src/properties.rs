//! Legacy `key=value` run configuration.

use std::collections::HashMap;

use rollcall::PolicyConfig;

pub const MESSAGES: &str = "message.to.send";
pub const SEND_ONLY_TO: &str = "send.only.to";
pub const REMOVAL_ENABLED: &str = "unfriend.enable";
pub const REMOVAL_EXEMPT: &str = "unfriend.skip.if.contains";

const MESSAGE_SEPARATOR: &str = "||";

/// Parsed properties file. Missing keys read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
	entries: HashMap<String, String>,
}

impl Properties {
	/// Parses `key=value` or `key: value` lines. `#` and `!` start comments.
	pub fn parse(text: &str) -> Self {
		let entries = text
			.lines()
			.map(str::trim)
			.filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
			.filter_map(|line| {
				let split = line.find(['=', ':'])?;
				let (key, value) = line.split_at(split);
				Some((key.trim().to_string(), value[1..].trim().to_string()))
			})
			.collect();
		Self { entries }
	}

	pub fn get(&self, key: &str) -> &str {
		self.entries.get(key).map(String::as_str).unwrap_or("")
	}

	fn list(&self, key: &str, separator: &str) -> Vec<String> {
		self.get(key)
			.split(separator)
			.map(str::trim)
			.filter(|s| !s.is_empty())
			.map(str::to_string)
			.collect()
	}

	fn flag(&self, key: &str) -> bool {
		let value = self.get(key);
		value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes") || value == "1"
	}

	pub fn to_policy(&self) -> PolicyConfig {
		PolicyConfig {
			messages_to_send: self.list(MESSAGES, MESSAGE_SEPARATOR),
			allow_send_only_if_name_contains: self.list(SEND_ONLY_TO, ","),
			exempt_from_removal_if_name_contains: self.list(REMOVAL_EXEMPT, ","),
			removal_enabled: self.flag(REMOVAL_ENABLED),
			..PolicyConfig::default()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = "
# run settings
message.to.send = hey there || see you soon ||  ||
send.only.to=ok, ,Ann
! legacy key, ignored
skip.if.contains=bot
unfriend.enable: Yes
unfriend.skip.if.contains = Team Snapchat,  Mom
";

	#[test]
	fn maps_legacy_keys_onto_policy() {
		let policy = Properties::parse(SAMPLE).to_policy();
		assert_eq!(policy.messages_to_send, ["hey there", "see you soon"]);
		assert_eq!(policy.allow_send_only_if_name_contains, ["ok", "Ann"]);
		assert_eq!(policy.exempt_from_removal_if_name_contains, ["Team Snapchat", "Mom"]);
		assert!(policy.removal_enabled);
	}

	#[test]
	fn missing_keys_are_empty() {
		let props = Properties::parse("# nothing\n");
		assert_eq!(props.get(MESSAGES), "");
		let policy = props.to_policy();
		assert!(policy.messages_to_send.is_empty());
		assert!(!policy.removal_enabled);
	}

	#[test]
	fn removal_flag_values() {
		for (value, expected) in [("true", true), ("TRUE", true), ("1", true), ("yes", true), ("no", false), ("0", false), ("", false)] {
			let props = Properties::parse(&format!("unfriend.enable={value}"));
			assert_eq!(props.to_policy().removal_enabled, expected, "{value:?}");
		}
	}

	#[test]
	fn value_keeps_later_separators() {
		let props = Properties::parse("message.to.send=see: http://x.test/a=b");
		assert_eq!(props.get(MESSAGES), "see: http://x.test/a=b");
	}
}
