//! Config file loading and command line overrides.

use std::path::{Path, PathBuf};

use rollcall::EngineConfig;
use rollcall_protocol::CapabilityProfile;
use rollcall_runtime::DEFAULT_ENDPOINT;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::Cli;
use crate::error::{CliError, Result};
use crate::properties::Properties;

/// On-disk configuration. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileConfig {
	pub server: Option<String>,
	pub capabilities: CapabilityProfile,
	#[serde(flatten)]
	pub engine: EngineConfig,
}

impl FileConfig {
	/// Loads JSON, or the legacy properties format for `.properties` files.
	pub fn load(path: &Path) -> Result<Self> {
		let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		if path.extension().is_some_and(|ext| ext == "properties") {
			let policy = Properties::parse(&text).to_policy();
			return Ok(Self {
				engine: EngineConfig::default().with_policy(policy),
				..Self::default()
			});
		}
		Ok(serde_json::from_str(&text)?)
	}
}

/// `<config dir>/rollcall/config.json`, when it exists.
pub fn default_config_path() -> Option<PathBuf> {
	let path = dirs::config_dir()?.join("rollcall").join("config.json");
	path.is_file().then_some(path)
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
	pub server: String,
	pub capabilities: CapabilityProfile,
	pub engine: EngineConfig,
	pub bootstrap: bool,
}

impl Settings {
	pub fn resolve(cli: &Cli) -> Result<Self> {
		let file = match cli.config.clone().or_else(default_config_path) {
			Some(path) => {
				debug!(target = "rollcall", path = %path.display(), "loading config");
				FileConfig::load(&path)?
			}
			None => FileConfig::default(),
		};
		Self::from_file(file, cli)
	}

	pub fn from_file(file: FileConfig, cli: &Cli) -> Result<Self> {
		let server = cli
			.server
			.clone()
			.or(file.server)
			.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
		if server.trim().is_empty() {
			return Err(CliError::Config("server endpoint is empty".into()));
		}

		let mut policy = file.engine.policy.clone();
		if cli.no_removal {
			policy.removal_enabled = false;
		}
		let engine = file.engine.with_policy(policy);
		if engine.policy.messages_to_send.is_empty() && !engine.policy.removal_enabled {
			return Err(CliError::Config(
				"nothing to do: no messages configured and removal disabled".into(),
			));
		}

		Ok(Self {
			server,
			capabilities: file.capabilities,
			engine,
			bootstrap: !cli.skip_bootstrap,
		})
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use clap::Parser;
	use rollcall::ConnectionHeuristic;

	use super::*;

	fn cli(args: &[&str]) -> Cli {
		Cli::try_parse_from(std::iter::once("rollcall").chain(args.iter().copied())).unwrap()
	}

	fn file_with(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
		let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
		file.write_all(contents.as_bytes()).unwrap();
		file
	}

	#[test]
	fn json_sections_are_all_optional() {
		let file = file_with(
			".json",
			r#"{
				"server": "http://10.0.0.5:4723/",
				"capabilities": { "appPackage": "com.example.chat" },
				"policy": { "messagesToSend": [" hi ", ""], "connection": "videoCall" },
				"timings": { "defaultWaitMs": 3000 }
			}"#,
		);
		let config = FileConfig::load(file.path()).unwrap();

		assert_eq!(config.server.as_deref(), Some("http://10.0.0.5:4723/"));
		assert_eq!(config.capabilities.app_package.as_deref(), Some("com.example.chat"));
		assert_eq!(config.capabilities.platform_name, "Android");
		assert_eq!(config.engine.policy.connection, ConnectionHeuristic::VideoCall);
		assert_eq!(config.engine.timings.default_wait_ms, 3000);
		assert_eq!(config.engine.locators, rollcall::Locators::default());

		let settings = Settings::from_file(config, &cli(&[])).unwrap();
		assert_eq!(settings.engine.policy.messages_to_send, ["hi"]);
		assert!(settings.bootstrap);
	}

	#[test]
	fn properties_extension_selects_legacy_format() {
		let file = file_with(".properties", "message.to.send=a||b\nunfriend.enable=true\n");
		let config = FileConfig::load(file.path()).unwrap();

		assert_eq!(config.engine.policy.messages_to_send, ["a", "b"]);
		assert!(config.engine.policy.removal_enabled);
		assert_eq!(config.server, None);
	}

	#[test]
	fn flags_override_the_file() {
		let file = file_with(".properties", "message.to.send=a\nunfriend.enable=true\n");
		let config = FileConfig::load(file.path()).unwrap();

		let settings = Settings::from_file(
			config,
			&cli(&["--server", "http://device:4723/", "--no-removal", "--skip-bootstrap"]),
		)
		.unwrap();

		assert_eq!(settings.server, "http://device:4723/");
		assert!(!settings.engine.policy.removal_enabled);
		assert!(!settings.bootstrap);
	}

	#[test]
	fn default_server_when_unset() {
		let config = FileConfig {
			engine: EngineConfig::default().with_policy(rollcall::PolicyConfig {
				removal_enabled: true,
				..Default::default()
			}),
			..FileConfig::default()
		};
		let settings = Settings::from_file(config, &cli(&[])).unwrap();
		assert_eq!(settings.server, DEFAULT_ENDPOINT);
	}

	#[test]
	fn nothing_to_do_is_a_config_error() {
		let err = Settings::from_file(FileConfig::default(), &cli(&[])).unwrap_err();
		assert!(matches!(err, CliError::Config(_)));
		assert_eq!(err.exit_code(), 2);
	}

	#[test]
	fn broken_json_is_a_config_error() {
		let file = file_with(".json", "{ not json");
		let err = FileConfig::load(file.path()).unwrap_err();
		assert!(matches!(err, CliError::Json(_)));
		assert_eq!(err.exit_code(), 2);
	}

	#[test]
	fn missing_file_is_an_io_error() {
		let err = FileConfig::load(Path::new("/nonexistent/rollcall.json")).unwrap_err();
		assert!(matches!(err, CliError::Io { .. }));
	}
}
