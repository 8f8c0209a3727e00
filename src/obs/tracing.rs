//! `oauth_link.flow` spans.
//!
//! Every public login step opens one span per call: `authorization_url`, `resolve_callback`,
//! `refresh`, `fetch_profile`, and the OAuth 1.0a `request_temporary_credential` round trip.
//! Nested steps (an OAuth 1.0a request-token call made while building an authorization URL)
//! appear as child spans. Secrets never reach span fields.

// self
use crate::{_prelude::*, obs::FlowKind};

/// Future returned by [`FlowSpan::instrument`]; the bare future when `tracing` is off.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`FlowSpan::instrument`]; the bare future when `tracing` is off.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// Span covering one login step for one provider.
///
/// Fields: `flow` ([`FlowKind::as_str`]), `provider` (the registered provider name), and
/// `stage` (the connector method that opened it). Zero-sized without the `tracing` feature.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Opens the span for `provider` at `stage`.
	pub fn new(kind: FlowKind, provider: &str, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("oauth_link.flow", flow = kind.as_str(), provider, stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, provider, stage);

			Self {}
		}
	}

	/// Runs a login step inside the span.
	///
	/// Hook calls, store access, and provider HTTP requests awaited by `fut` are attributed to
	/// the step.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrumented_steps_return_their_output() {
		let span = FlowSpan::new(FlowKind::Callback, "discord", "resolve_callback");
		let resolved = span.instrument(async { Ok::<_, Error>("code") }).await;

		assert_eq!(resolved.expect("Instrumented step should succeed."), "code");
	}

	#[cfg(feature = "tracing")]
	#[tokio::test]
	async fn oauth1_request_token_spans_nest_under_authorization() {
		let outer = FlowSpan::new(FlowKind::Authorize, "twitter", "authorization_url");
		let value = outer
			.instrument(async {
				FlowSpan::new(FlowKind::RequestToken, "twitter", "request_temporary_credential")
					.instrument(async { 7 })
					.await
			})
			.await;

		assert_eq!(value, 7);
	}
}
