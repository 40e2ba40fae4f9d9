use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error("invalid configuration: {0}")]
	Config(String),

	#[error("cannot read {path}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Engine(#[from] rollcall::Error),

	#[error(transparent)]
	Backend(#[from] rollcall_runtime::Error),
}

impl CliError {
	/// Process exit code: 2 for configuration problems, 1 for everything else.
	pub fn exit_code(&self) -> i32 {
		match self {
			Self::Config(_) | Self::Io { .. } | Self::Json(_) => 2,
			Self::Backend(rollcall_runtime::Error::Endpoint(_)) => 2,
			Self::Engine(_) | Self::Backend(_) => 1,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn config_problems_exit_with_two() {
		assert_eq!(CliError::Config("bad".into()).exit_code(), 2);
		let endpoint = url_error();
		assert_eq!(CliError::Backend(endpoint).exit_code(), 2);
	}

	#[test]
	fn engine_failures_exit_with_one() {
		let err = rollcall::Error::GuardianExhausted {
			attempts: 2,
			source: rollcall_runtime::Error::BackendFailure("down".into()),
		};
		assert_eq!(CliError::Engine(err).exit_code(), 1);
	}

	fn url_error() -> rollcall_runtime::Error {
		match rollcall_runtime::WebDriverClient::new("not a url") {
			Err(err) => err,
			Ok(_) => panic!("expected endpoint error"),
		}
	}
}
