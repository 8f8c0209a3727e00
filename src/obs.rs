//! Optional observability helpers for login flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth_link.flow` with the `flow` (step),
//!   `provider`, and `stage` (call site) fields.
//! - Enable `metrics` to increment the `oauth_link_flow_total` counter for every
//!   attempt, success, and failure, labeled by `flow`, `provider`, and `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flow steps observed by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authorization URL construction.
	Authorize,
	/// Callback resolution, including the code exchange.
	Callback,
	/// Refresh token exchange.
	Refresh,
	/// OAuth 1.0a temporary-credential request.
	RequestToken,
	/// Profile retrieval.
	Profile,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Authorize => "authorize",
			FlowKind::Callback => "callback",
			FlowKind::Refresh => "refresh",
			FlowKind::RequestToken => "oauth1_request_token",
			FlowKind::Profile => "profile",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow step.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}

	/// Maps a flow result onto its outcome label.
	pub fn of<T, E>(result: &std::result::Result<T, E>) -> Self {
		if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure }
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
