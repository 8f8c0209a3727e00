//! Refresh token exchange.
//!
//! The engine keeps no token storage, so refreshing is a single pass through the provider
//! strategy: OAuth 2.0 strategies reuse the token exchange client with
//! `grant_type=refresh_token`, while OAuth 1.0a strategies reject the call.

// self
use crate::{
	_prelude::*,
	auth::AccessTokenResult,
	flows::Connector,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl Connector {
	/// Exchanges `refresh_token` for a fresh token set.
	pub async fn refresh(&self, refresh_token: &str) -> Result<AccessTokenResult> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, self.name(), "refresh");

		obs::record_flow_outcome(KIND, self.name(), FlowOutcome::Attempt);

		let result = span
			.instrument(self.strategy.refresh_token(self.strategy_context(), refresh_token))
			.await;

		obs::record_flow_outcome(KIND, self.name(), FlowOutcome::of(&result));

		result
	}
}
