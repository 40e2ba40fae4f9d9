//! Engine errors.
//!
//! Backend errors are classified into three outcomes once the query layer is
//! done with them: the operation could not be completed ([`Error::Unresolvable`]),
//! the session could not be replaced ([`Error::GuardianExhausted`]), or the
//! failure is not something a retry or a new session can fix
//! ([`Error::Unrecoverable`]). The last two end the run.

use rollcall_runtime::FailureKind;
use thiserror::Error;
use tracing::debug;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// The operation failed after its retry and repair budget was spent.
	#[error("{op} {target}: {source}")]
	Unresolvable {
		op: &'static str,
		target: String,
		#[source]
		source: rollcall_runtime::Error,
	},

	/// Every attempt to create a replacement session failed.
	#[error("session repair failed after {attempts} attempts: {source}")]
	GuardianExhausted {
		attempts: u32,
		#[source]
		source: rollcall_runtime::Error,
	},

	/// A failure that no retry or repair can fix.
	#[error("unrecoverable backend error: {0}")]
	Unrecoverable(#[source] rollcall_runtime::Error),
}

impl Error {
	/// Whether the run must stop.
	pub fn is_fatal(&self) -> bool {
		matches!(self, Self::GuardianExhausted { .. } | Self::Unrecoverable(_))
	}

	/// The backend error underneath.
	pub fn backend_error(&self) -> &rollcall_runtime::Error {
		match self {
			Self::Unresolvable { source, .. } | Self::GuardianExhausted { source, .. } | Self::Unrecoverable(source) => source,
		}
	}

	/// Failure kind of the underlying backend error.
	pub fn kind(&self) -> FailureKind {
		self.backend_error().kind()
	}
}

/// Swallows non-fatal errors for best-effort steps.
pub(crate) trait ResultExt<T> {
	/// `Ok(Some(v))` on success, `Ok(None)` for a non-fatal error, `Err` for a fatal one.
	fn non_fatal(self, step: &'static str) -> Result<Option<T>>;
}

impl<T> ResultExt<T> for Result<T> {
	fn non_fatal(self, step: &'static str) -> Result<Option<T>> {
		match self {
			Ok(value) => Ok(Some(value)),
			Err(err) if err.is_fatal() => Err(err),
			Err(err) => {
				debug!(target = "rollcall", step, error = %err, "best-effort step failed");
				Ok(None)
			}
		}
	}
}
