//! `oauth_link_flow_total` counter.

// self
use crate::obs::{FlowKind, FlowOutcome};

/// Counter incremented once per attempt and once per terminal outcome of a login step.
pub const FLOW_COUNTER: &str = "oauth_link_flow_total";

/// Counts a login step for `provider` on the global `metrics` recorder.
///
/// Each step records `attempt` on entry and exactly one of `success`/`failure` on exit, so
/// `attempt - success - failure` is the number of steps still in flight. Callback failures
/// count here even though the host also sees them through `on_error`. Compiles to nothing
/// without the `metrics` feature.
pub fn record_flow_outcome(kind: FlowKind, provider: &str, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			FLOW_COUNTER,
			"flow" => kind.as_str(),
			"provider" => provider.to_owned(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, provider, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn every_step_can_be_counted_per_provider() {
		for kind in [
			FlowKind::Authorize,
			FlowKind::Callback,
			FlowKind::Refresh,
			FlowKind::RequestToken,
			FlowKind::Profile,
		] {
			record_flow_outcome(kind, "twitch", FlowOutcome::Attempt);
			record_flow_outcome(kind, "twitch", FlowOutcome::of(&Err::<(), _>("denied")));
		}

		assert_eq!(FLOW_COUNTER, "oauth_link_flow_total");
	}
}
