//! Multi-provider registry that owns the host handler and dispatches by provider name.
//!
//! Route registration stays with the host web framework; the registry only derives the
//! redirect URI and route paths for each provider and forwards inbound requests to the right
//! [`Connector`].

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	flows::{Connector, LinkHandler, RequestContext},
	http::TokenHttpClient,
	oauth::TokenExchangeClient,
	provider::{ProviderDescriptor, ProviderStrategy},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Serializable registry settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
	/// Public origin of the host application, e.g. `https://app.example.com`.
	pub base_url: Url,
}
impl RegistryConfig {
	/// Creates settings for `base_url`.
	pub fn new(base_url: Url) -> Self {
		Self { base_url }
	}

	/// Redirect URI registered with the provider: `{base_url}/oauth/{name}`.
	pub fn redirect_uri(&self, name: &str) -> Result<Url> {
		let base = self.base_url.as_str().trim_end_matches('/');

		Url::parse(&format!("{base}{}", Self::callback_path(name)))
			.map_err(|source| ConfigError::InvalidUrl { field: "redirect", source }.into())
	}

	/// Route path that begins authorization.
	pub fn request_path(name: &str) -> String {
		format!("/oauth/{name}/request")
	}

	/// Route path that receives the provider's callback.
	pub fn callback_path(name: &str) -> String {
		format!("/oauth/{name}")
	}
}

/// Providers keyed by name plus the host handler that receives every outcome.
pub struct LinkRegistry<H> {
	config: RegistryConfig,
	handler: H,
	client: TokenExchangeClient,
	connectors: BTreeMap<String, Connector>,
}
impl<H> LinkRegistry<H>
where
	H: LinkHandler,
{
	/// Creates an empty registry whose connectors share `http_client`.
	pub fn with_http_client(
		config: RegistryConfig,
		handler: H,
		http_client: impl TokenHttpClient,
	) -> Self {
		let client = TokenExchangeClient::new(http_client);

		Self { config, handler, client, connectors: BTreeMap::new() }
	}

	/// Registers a provider; its redirect URI is derived from the registry's base URL.
	pub fn register(
		&mut self,
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
	) -> Result<&Connector> {
		let name = descriptor.name().to_owned();

		if self.connectors.contains_key(&name) {
			return Err(ConfigError::DuplicateProvider { provider: name }.into());
		}

		let redirect_uri = self.config.redirect_uri(&name)?;
		let connector =
			Connector::with_client(descriptor, strategy, redirect_uri, self.client.clone());

		Ok(self.connectors.entry(name).or_insert(connector))
	}

	/// Returns the connector registered under `name`.
	pub fn connector(&self, name: &str) -> Result<&Connector> {
		self.connectors
			.get(name)
			.ok_or_else(|| ConfigError::UnknownProvider { provider: name.to_owned() }.into())
	}

	/// Iterates over registered provider names.
	pub fn providers(&self) -> impl Iterator<Item = &str> {
		self.connectors.keys().map(String::as_str)
	}

	/// Registry settings.
	pub fn config(&self) -> &RegistryConfig {
		&self.config
	}

	/// Host handler.
	pub fn handler(&self) -> &H {
		&self.handler
	}

	/// Handles the begin-authorization route for `name`.
	pub async fn authorization_url(&self, name: &str, request: &RequestContext) -> Result<Url> {
		self.connector(name)?.authorization_url(request, &self.handler).await
	}

	/// Handles the callback route for `name`.
	///
	/// Unknown providers fail before any hook runs; every other outcome goes through exactly one
	/// of the handler's terminal hooks.
	pub async fn handle_callback(
		&self,
		name: &str,
		request: &RequestContext,
	) -> Result<H::Response> {
		Ok(self.connector(name)?.handle_callback(request, &self.handler).await)
	}
}
#[cfg(feature = "reqwest")]
impl<H> LinkRegistry<H>
where
	H: LinkHandler,
{
	/// Creates an empty registry backed by a reqwest transport.
	pub fn new(config: RegistryConfig, handler: H) -> Result<Self> {
		Ok(Self::with_http_client(config, handler, ReqwestHttpClient::new()?))
	}
}
impl<H> Debug for LinkRegistry<H> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LinkRegistry")
			.field("config", &self.config)
			.field("providers", &self.connectors.keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}
