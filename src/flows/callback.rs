//! Callback resolution as an explicit state machine.
//!
//! ```text
//! Start -> CheckUserError -> CheckCodePresent -> ExchangeToken -> Success | Failure
//! ```
//!
//! A user error short-circuits to `Failure` before any outbound call, a missing code fails with
//! [`CodeError::Missing`], and a pre-authorized token on the callback skips the exchange. Every
//! terminal state is delivered to the host through exactly one hook call.

// self
use crate::{
	_prelude::*,
	auth::AccessTokenResult,
	error::CodeError,
	flows::{Connector, LinkFailure, LinkHandler, LinkSuccess, RequestContext},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// States visited while resolving one callback.
#[derive(Debug)]
pub enum CallbackState {
	/// Nothing inspected yet.
	Start,
	/// Looking for a provider-reported user error.
	CheckUserError,
	/// Looking for the authorization code or a pre-authorized token.
	CheckCodePresent,
	/// Exchanging the code at the provider.
	ExchangeToken {
		/// Code extracted from the callback.
		code: String,
	},
	/// Terminal: tokens issued.
	Success(AccessTokenResult),
	/// Terminal: the callback failed.
	Failure(Error),
}
impl CallbackState {
	/// Returns true for [`Success`](Self::Success) and [`Failure`](Self::Failure).
	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::Success(_) | Self::Failure(_))
	}

	/// Stable label for log fields.
	pub fn label(&self) -> &'static str {
		match self {
			Self::Start => "start",
			Self::CheckUserError => "check_user_error",
			Self::CheckCodePresent => "check_code_present",
			Self::ExchangeToken { .. } => "exchange_token",
			Self::Success(_) => "success",
			Self::Failure(_) => "failure",
		}
	}
}

impl Connector {
	/// Advances the callback state machine by one transition.
	pub async fn advance_callback(
		&self,
		state: CallbackState,
		request: &RequestContext,
	) -> CallbackState {
		match state {
			CallbackState::Start => CallbackState::CheckUserError,
			CallbackState::CheckUserError => match self.strategy.detect_user_error(request) {
				Some(e) => CallbackState::Failure(e.into()),
				None => CallbackState::CheckCodePresent,
			},
			CallbackState::CheckCodePresent => {
				if let Some(tokens) = self.strategy.pre_authorized_tokens(request) {
					return CallbackState::Success(tokens);
				}

				match self.strategy.extract_code(request) {
					Some(code) => CallbackState::ExchangeToken { code },
					None => CallbackState::Failure(CodeError::Missing.into()),
				}
			},
			CallbackState::ExchangeToken { code } => match self
				.strategy
				.exchange_code(self.strategy_context(), &code, request)
				.await
			{
				Ok(tokens) => CallbackState::Success(tokens),
				Err(e) => CallbackState::Failure(e),
			},
			terminal => terminal,
		}
	}

	/// Drives the callback state machine to a terminal state.
	pub async fn resolve_callback(&self, request: &RequestContext) -> Result<AccessTokenResult> {
		const KIND: FlowKind = FlowKind::Callback;

		let span = FlowSpan::new(KIND, self.name(), "resolve_callback");

		obs::record_flow_outcome(KIND, self.name(), FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut state = CallbackState::Start;

				loop {
					state = self.advance_callback(state, request).await;

					#[cfg(feature = "tracing")]
					tracing::debug!(state = state.label(), "callback transition");

					match state {
						CallbackState::Success(tokens) => return Ok(tokens),
						CallbackState::Failure(e) => return Err(e),
						_ => continue,
					}
				}
			})
			.await;

		obs::record_flow_outcome(KIND, self.name(), FlowOutcome::of(&result));

		result
	}

	/// Resolves the callback and hands the outcome to exactly one of the handler's hooks.
	pub async fn handle_callback<H>(&self, request: &RequestContext, handler: &H) -> H::Response
	where
		H: ?Sized + LinkHandler,
	{
		match self.resolve_callback(request).await {
			Ok(data) => handler.on_link(LinkSuccess { provider: self, data, request }).await,
			Err(error) => handler.on_error(LinkFailure { provider: self, error, request }).await,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::*,
		auth::ProviderId,
		provider::{DefaultProviderStrategy, ProviderDescriptor},
	};

	fn connector(strategy: DefaultProviderStrategy) -> Connector {
		let id = ProviderId::new("mock").expect("Provider id should be valid.");
		let descriptor = ProviderDescriptor::builder(id)
			.client_id("client-123")
			.client_secret("secret")
			.authorization_endpoint(
				Url::parse("https://example.com/auth").expect("Authorization URL should parse."),
			)
			.token_endpoint(
				Url::parse("https://example.com/token").expect("Token URL should parse."),
			)
			.build()
			.expect("Descriptor should build.");

		build_reqwest_test_connector_with(
			descriptor,
			Arc::new(strategy),
			"https://app.example.com/oauth/mock",
		)
	}

	#[tokio::test]
	async fn transitions_follow_the_documented_order() {
		let connector = connector(DefaultProviderStrategy::default());
		let request = query_context([("code", "abc")]);
		let mut labels = Vec::new();
		let mut state = CallbackState::Start;

		while !matches!(state, CallbackState::ExchangeToken { .. }) {
			labels.push(state.label());
			state = connector.advance_callback(state, &request).await;
		}

		assert_eq!(labels, ["start", "check_user_error", "check_code_present"]);
		assert!(matches!(state, CallbackState::ExchangeToken { ref code } if code == "abc"));
	}

	#[tokio::test]
	async fn user_errors_win_over_codes() {
		let err = connector(DefaultProviderStrategy::default())
			.resolve_callback(&query_context([("error", "access_denied"), ("code", "abc")]))
			.await
			.expect_err("Denied callbacks must fail.");

		assert!(matches!(err, Error::Code(CodeError::Denied { .. })));
	}

	#[tokio::test]
	async fn missing_code_fails() {
		let err = connector(DefaultProviderStrategy::default())
			.resolve_callback(&query_context([("state", "xyz")]))
			.await
			.expect_err("Callbacks without a code must fail.");

		assert!(matches!(err, Error::Code(CodeError::Missing)));
	}

	#[tokio::test]
	async fn pre_authorized_tokens_skip_the_exchange() {
		let strategy =
			DefaultProviderStrategy::default().with_pre_authorized_token_field("authToken");
		let tokens = connector(strategy)
			.resolve_callback(&query_context([("authToken", "issued")]))
			.await
			.expect("Pre-authorized callbacks should succeed.");

		assert_eq!(tokens.access_token.expose(), "issued");
	}
}
