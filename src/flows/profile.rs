//! Profile retrieval after a successful link.

// self
use crate::{
	_prelude::*,
	auth::AccessTokenResult,
	flows::Connector,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::ProviderProfile,
};

impl Connector {
	/// Fetches the linked user's profile with the issued tokens.
	pub async fn fetch_profile(&self, tokens: &AccessTokenResult) -> Result<ProviderProfile> {
		const KIND: FlowKind = FlowKind::Profile;

		let span = FlowSpan::new(KIND, self.name(), "fetch_profile");

		obs::record_flow_outcome(KIND, self.name(), FlowOutcome::Attempt);

		let result =
			span.instrument(self.strategy.fetch_profile(self.strategy_context(), tokens)).await;

		obs::record_flow_outcome(KIND, self.name(), FlowOutcome::of(&result));

		result
	}
}
