//! High-level flow orchestrators that drive one provider through a login.
//!
//! A [`Connector`] binds a provider descriptor to its strategy, its redirect URI, and the
//! outbound token exchange client. The individual flows (authorization URL construction,
//! callback resolution, refresh, profile retrieval) live in their own modules and are exposed
//! as methods on the connector.

pub mod authorize;
pub mod callback;
pub mod common;
pub mod hooks;
pub mod profile;
pub mod refresh;

pub use callback::*;
pub use common::*;
pub use hooks::*;

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	http::TokenHttpClient,
	oauth::TokenExchangeClient,
	provider::{ProviderDescriptor, ProviderStrategy, StrategyContext},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Coordinates login flows against a single provider descriptor.
///
/// The connector owns the descriptor, the strategy, and the token exchange client so every flow
/// reaches the provider through the same capability set. Connectors are cheap to clone and safe
/// to share across concurrent requests.
#[derive(Clone)]
pub struct Connector {
	/// Provider descriptor that defines endpoints, credentials, and scopes.
	pub descriptor: Arc<ProviderDescriptor>,
	/// Strategy implementing the provider's protocol steps.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// Redirect URI the provider sends the user back to.
	pub redirect_uri: Url,
	client: TokenExchangeClient,
}
impl Connector {
	/// Creates a connector that reuses the caller-provided transport.
	pub fn with_http_client(
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		redirect_uri: Url,
		http_client: impl TokenHttpClient,
	) -> Self {
		Self::with_client(descriptor, strategy, redirect_uri, TokenExchangeClient::new(http_client))
	}

	/// Creates a connector around an existing token exchange client.
	pub fn with_client(
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		redirect_uri: Url,
		client: TokenExchangeClient,
	) -> Self {
		Self { descriptor: Arc::new(descriptor), strategy, redirect_uri, client }
	}

	/// Provider identifier.
	pub fn id(&self) -> &ProviderId {
		&self.descriptor.id
	}

	/// Provider name used for routes and log fields.
	pub fn name(&self) -> &str {
		self.descriptor.name()
	}

	/// Token exchange client used for outbound calls.
	pub fn client(&self) -> &TokenExchangeClient {
		&self.client
	}

	/// Borrowed view handed to strategy steps.
	pub fn strategy_context(&self) -> StrategyContext<'_> {
		StrategyContext {
			descriptor: &self.descriptor,
			client: &self.client,
			redirect_uri: &self.redirect_uri,
		}
	}
}
#[cfg(feature = "reqwest")]
impl Connector {
	/// Creates a connector that provisions its own reqwest-backed transport.
	pub fn new(
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		redirect_uri: Url,
	) -> Result<Self> {
		Ok(Self::with_http_client(descriptor, strategy, redirect_uri, ReqwestHttpClient::new()?))
	}
}
impl Debug for Connector {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Connector")
			.field("descriptor", &self.descriptor)
			.field("redirect_uri", &self.redirect_uri)
			.finish()
	}
}
