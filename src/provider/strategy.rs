//! Provider strategy hooks that implement each protocol step.
//!
//! Flows never talk to a provider directly; they call the [`ProviderStrategy`] selected when
//! the connector was built. The default methods describe the common OAuth 2.0 behavior, so
//! alternate strategies override only the steps their provider changes.

// self
use crate::{
	_prelude::*,
	auth::AccessTokenResult,
	error::{CodeError, ConfigError},
	flows::{AuthorizationQuery, RequestContext},
	oauth::TokenExchangeClient,
	provider::{ProviderDescriptor, ProviderProfile},
};

/// Boxed future returned by strategy steps.
pub type StrategyFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Everything a strategy step may need besides its own state.
#[derive(Clone, Copy)]
pub struct StrategyContext<'a> {
	/// Provider configuration.
	pub descriptor: &'a ProviderDescriptor,
	/// Outbound token exchange client.
	pub client: &'a TokenExchangeClient,
	/// Redirect URI registered for the provider.
	pub redirect_uri: &'a Url,
}
impl Debug for StrategyContext<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StrategyContext")
			.field("provider", &self.descriptor.id)
			.field("redirect_uri", &self.redirect_uri)
			.finish()
	}
}

/// Capability set every provider exposes to the flows.
///
/// Implementors are required to be `Send + Sync` because one strategy instance serves every
/// in-flight request for its provider.
pub trait ProviderStrategy: Send + Sync {
	/// Builds the authorization query before the host's pre-authorization hook sees it.
	fn authorization_query<'a>(
		&'a self,
		cx: StrategyContext<'a>,
		request: &'a RequestContext,
	) -> StrategyFuture<'a, AuthorizationQuery> {
		Box::pin(async move {
			default_authorization_query(cx.descriptor, cx.redirect_uri, request)
		})
	}

	/// Called once the pre-authorization hook accepted the query.
	///
	/// `issued` is the query exactly as [`authorization_query`](Self::authorization_query)
	/// returned it; `accepted` is the copy the hook may have modified. State keyed by values the
	/// strategy generated must be looked up through `issued`.
	fn authorization_committed<'a>(
		&'a self,
		_issued: &'a AuthorizationQuery,
		_accepted: &'a AuthorizationQuery,
	) -> StrategyFuture<'a, ()> {
		Box::pin(async { Ok(()) })
	}

	/// Called when the pre-authorization hook rejected the query; discards prepared state.
	///
	/// Receives the query as issued, before any hook modification.
	fn authorization_aborted<'a>(
		&'a self,
		_issued: &'a AuthorizationQuery,
	) -> StrategyFuture<'a, ()> {
		Box::pin(async { Ok(()) })
	}

	/// Detects a callback where the user declined or the provider reported an error.
	fn detect_user_error(&self, request: &RequestContext) -> Option<CodeError> {
		default_user_error(request)
	}

	/// Extracts the authorization code (OAuth1: the request token) from the callback.
	fn extract_code(&self, request: &RequestContext) -> Option<String> {
		non_empty(request.query("code"))
	}

	/// Recognizes callbacks that already carry an access token, skipping the exchange.
	fn pre_authorized_tokens(&self, _request: &RequestContext) -> Option<AccessTokenResult> {
		None
	}

	/// Exchanges the callback's code for tokens.
	fn exchange_code<'a>(
		&'a self,
		cx: StrategyContext<'a>,
		code: &'a str,
		_request: &'a RequestContext,
	) -> StrategyFuture<'a, AccessTokenResult> {
		Box::pin(cx.client.exchange_code(cx.descriptor, code, cx.redirect_uri))
	}

	/// Mints a new access token from a refresh token.
	fn refresh_token<'a>(
		&'a self,
		cx: StrategyContext<'a>,
		refresh_token: &'a str,
	) -> StrategyFuture<'a, AccessTokenResult> {
		Box::pin(cx.client.refresh_token(cx.descriptor, refresh_token))
	}

	/// Retrieves the linked user's profile.
	///
	/// The default implementation reports that the provider does not implement it.
	fn fetch_profile<'a>(
		&'a self,
		cx: StrategyContext<'a>,
		_tokens: &'a AccessTokenResult,
	) -> StrategyFuture<'a, ProviderProfile> {
		let provider = cx.descriptor.name().to_owned();

		Box::pin(async move { Err(Error::ProfileNotImplemented { provider }) })
	}
}

/// Strategy for standard OAuth 2.0 authorization-code providers.
///
/// Profiles are fetched with a bearer token when the descriptor names a profile endpoint.
/// Providers that hand the access token straight back on the callback can name that query
/// field through [`with_pre_authorized_token_field`](Self::with_pre_authorized_token_field).
#[derive(Clone, Debug, Default)]
pub struct DefaultProviderStrategy {
	pre_authorized_token_field: Option<String>,
}
impl DefaultProviderStrategy {
	/// Accepts callbacks whose `field` query parameter carries an issued access token.
	pub fn with_pre_authorized_token_field(mut self, field: impl Into<String>) -> Self {
		self.pre_authorized_token_field = Some(field.into());

		self
	}
}
impl Display for DefaultProviderStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-provider-strategy")
	}
}
impl ProviderStrategy for DefaultProviderStrategy {
	fn pre_authorized_tokens(&self, request: &RequestContext) -> Option<AccessTokenResult> {
		let field = self.pre_authorized_token_field.as_deref()?;

		non_empty(request.query(field)).map(AccessTokenResult::new)
	}

	fn fetch_profile<'a>(
		&'a self,
		cx: StrategyContext<'a>,
		tokens: &'a AccessTokenResult,
	) -> StrategyFuture<'a, ProviderProfile> {
		Box::pin(async move {
			let descriptor = cx.descriptor;
			let Some(url) = descriptor.endpoints.profile.as_ref() else {
				return Err(Error::ProfileNotImplemented { provider: descriptor.name().to_owned() });
			};
			let authorization = format!("Bearer {}", tokens.access_token.expose());
			let raw = cx.client.fetch_json(url, &authorization).await?;

			Ok(ProviderProfile::from_json(
				descriptor.id.clone(),
				raw,
				descriptor.profile_id_pointer.as_deref(),
			))
		})
	}
}

/// Builds the standard authorization query for `descriptor`.
///
/// The query always carries `response_type=code`, `client_id`, and `redirect_uri`, followed by
/// the descriptor's static extras and, only when the evaluated scope set is non-empty, `scope`.
pub fn default_authorization_query(
	descriptor: &ProviderDescriptor,
	redirect_uri: &Url,
	request: &RequestContext,
) -> Result<AuthorizationQuery> {
	let scopes =
		descriptor.scopes.evaluate(descriptor.name(), request).map_err(ConfigError::from)?;
	let mut query = AuthorizationQuery::default();

	for (key, value) in &descriptor.query {
		query.insert(key.as_str(), value.as_str());
	}

	query.insert("response_type", "code");
	query.insert("redirect_uri", redirect_uri.as_str());
	query.insert("client_id", descriptor.client_id.as_str());

	if let Some(scope) = scopes.join(descriptor.scope_delimiter) {
		query.insert("scope", scope);
	}

	Ok(query)
}

/// Maps the callback's `error` parameter to a [`CodeError`].
pub fn default_user_error(request: &RequestContext) -> Option<CodeError> {
	let error = non_empty(request.query("error"))?;
	let description = non_empty(request.query("error_description"));

	if error.eq_ignore_ascii_case("access_denied") {
		Some(CodeError::Denied { description })
	} else {
		Some(CodeError::Unknown { error, description })
	}
}

fn non_empty(value: Option<&str>) -> Option<String> {
	value.filter(|value| !value.is_empty()).map(str::to_owned)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::{ProviderId, ScopeSet, ScopeSpec};

	fn descriptor(scopes: ScopeSpec) -> ProviderDescriptor {
		ProviderDescriptor::builder(
			ProviderId::new("mock").expect("Provider fixture should be valid."),
		)
		.client_id("client-123")
		.client_secret("secret")
		.authorization_endpoint(
			Url::parse("https://example.com/auth").expect("Authorization URL should parse."),
		)
		.token_endpoint(Url::parse("https://example.com/token").expect("Token URL should parse."))
		.query_param("access_type", "offline")
		.scopes(scopes)
		.build()
		.expect("Descriptor fixture should build.")
	}

	fn redirect() -> Url {
		Url::parse("https://app.example.com/oauth/mock").expect("Redirect URI should parse.")
	}

	#[test]
	fn empty_scope_sets_omit_the_scope_key() {
		let fixed = descriptor(ScopeSpec::Fixed(ScopeSet::default()));
		let computed = descriptor(ScopeSpec::computed(|_, _| Vec::new()));

		for descriptor in [fixed, computed] {
			let query =
				default_authorization_query(&descriptor, &redirect(), &RequestContext::default())
					.expect("Query should build.");

			assert!(!query.contains_key("scope"));
			assert_eq!(query.get("client_id"), Some("client-123"));
			assert_eq!(query.get("redirect_uri"), Some("https://app.example.com/oauth/mock"));
			assert_eq!(query.get("response_type"), Some("code"));
			assert_eq!(query.get("access_type"), Some("offline"));
		}
	}

	#[test]
	fn scopes_are_space_joined() {
		let scopes = ScopeSet::new(["a", "b"]).expect("Scope fixture should be valid.");
		let query = default_authorization_query(
			&descriptor(scopes.into()),
			&redirect(),
			&RequestContext::default(),
		)
		.expect("Query should build.");

		assert_eq!(query.get("scope"), Some("a b"));
	}

	#[test]
	fn user_errors_distinguish_denials() {
		let denied = RequestContext::from_pairs([
			("error", "access_denied"),
			("error_description", "The user said no"),
		]);
		let unknown = RequestContext::from_pairs([("error", "server_error")]);

		assert_eq!(
			default_user_error(&denied),
			Some(CodeError::Denied { description: Some("The user said no".into()) })
		);
		assert!(matches!(default_user_error(&unknown), Some(CodeError::Unknown { .. })));
		assert_eq!(default_user_error(&RequestContext::from_pairs([("code", "abc")])), None);
	}

	#[test]
	fn pre_authorized_tokens_require_configured_field() {
		let request = RequestContext::from_pairs([("authToken", "issued")]);

		assert!(DefaultProviderStrategy::default().pre_authorized_tokens(&request).is_none());

		let tokens = DefaultProviderStrategy::default()
			.with_pre_authorized_token_field("authToken")
			.pre_authorized_tokens(&request)
			.expect("Configured field should yield tokens.");

		assert_eq!(tokens.access_token.expose(), "issued");
	}
}
