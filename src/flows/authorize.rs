//! Authorization URL construction.
//!
//! The strategy builds the query, the host's pre-authorization hook may extend it (for example
//! with a CSRF `state`), and the result is percent-encoded onto the provider's consent screen
//! URL. A hook rejection aborts the whole operation and the strategy is told to discard any
//! state it prepared for the query. Commit and abort always see the query as the strategy issued
//! it, so a hook that rewrites strategy-owned fields cannot redirect cleanup to another entry.

// self
use crate::{
	_prelude::*,
	flows::{AuthorizationQuery, Connector, LinkHandler, RequestContext},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl Connector {
	/// Builds the authorization query without consulting the host's hook.
	pub async fn authorization_query(
		&self,
		request: &RequestContext,
	) -> Result<AuthorizationQuery> {
		self.strategy.authorization_query(self.strategy_context(), request).await
	}

	/// Builds the absolute URL the user should be redirected to.
	pub async fn authorization_url<H>(&self, request: &RequestContext, handler: &H) -> Result<Url>
	where
		H: ?Sized + LinkHandler,
	{
		const KIND: FlowKind = FlowKind::Authorize;

		let span = FlowSpan::new(KIND, self.name(), "authorization_url");

		obs::record_flow_outcome(KIND, self.name(), FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let issued = self.authorization_query(request).await?;
				let mut query = issued.clone();

				if let Err(e) = handler.pre_auth_url(&mut query, self, request).await {
					#[cfg(feature = "tracing")]
					tracing::warn!(error = %e, "pre-authorization hook rejected the request");

					if let Err(_cleanup) = self.strategy.authorization_aborted(&issued).await {
						#[cfg(feature = "tracing")]
						tracing::warn!(error = %_cleanup, "failed to discard authorization state");
					}

					return Err(e.into());
				}

				self.strategy.authorization_committed(&issued, &query).await?;

				Ok(query.append_to(&self.descriptor.endpoints.authorization))
			})
			.await;

		obs::record_flow_outcome(KIND, self.name(), FlowOutcome::of(&result));

		result
	}
}
