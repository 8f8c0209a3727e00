//! OAuth 1.0a three-legged handshake expressed as a [`ProviderStrategy`].
//!
//! ```text
//! RequestTemporaryCredential -> StoreSecret -> BuildAuthorizationUrl -> AwaitCallback
//!     -> ExchangeForAccessToken -> ReleaseEntry -> Success | Failure
//! ```
//!
//! The authorization query is built by fetching a request token and storing its secret in a
//! shared [`TemporaryCredentialStore`]. The host's pre-authorization hook may add a `state`,
//! which is recorded on the entry and echoed back on success through
//! [`AccessTokenResult::state`]. The callback's `oauth_token` selects the entry, which is taken
//! out of the store before the access-token exchange so it can never be used twice.

pub mod signature;

pub use signature::Signer;

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{AccessTokenResult, TokenSecret},
	error::{CodeError, ConfigError},
	flows::{AuthorizationQuery, RequestContext},
	http::{HttpResponse, Method, Request, encode_component, header},
	oauth,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{
		ProviderProfile, ProviderStrategy, StrategyContext, StrategyFuture, default_user_error,
	},
	store::{TemporaryCredential, TemporaryCredentialStore},
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Strategy for OAuth 1.0a providers.
///
/// The descriptor's authorization endpoint is the consent screen, its token endpoint the
/// access-token endpoint; the request-token endpoint lives on the strategy.
#[derive(Clone)]
pub struct OAuth1Strategy {
	request_token_url: Url,
	request_token_params: BTreeMap<String, String>,
	store: Arc<dyn TemporaryCredentialStore>,
}
impl OAuth1Strategy {
	/// Creates a strategy that issues request tokens from `request_token_url` and keeps
	/// temporary credentials in `store`.
	pub fn new(request_token_url: Url, store: Arc<dyn TemporaryCredentialStore>) -> Self {
		Self { request_token_url, request_token_params: BTreeMap::new(), store }
	}

	/// Adds a form parameter sent with every request-token call.
	pub fn request_token_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.request_token_params.insert(key.into(), value.into());

		self
	}

	/// Request-token endpoint.
	pub fn request_token_url(&self) -> &Url {
		&self.request_token_url
	}

	/// Temporary credential store shared by this strategy's handshakes.
	pub fn store(&self) -> &Arc<dyn TemporaryCredentialStore> {
		&self.store
	}

	/// Obtains a request token and its secret from the provider.
	///
	/// Any failure is reported as [`Error::RequestToken`].
	pub async fn request_temporary_credential(
		&self,
		cx: StrategyContext<'_>,
	) -> Result<(String, TokenSecret)> {
		const KIND: FlowKind = FlowKind::RequestToken;

		let span = FlowSpan::new(KIND, cx.descriptor.name(), "request_temporary_credential");

		obs::record_flow_outcome(KIND, cx.descriptor.name(), FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let descriptor = cx.descriptor;
				let body = self
					.request_token_params
					.iter()
					.map(|(k, v)| (k.as_str(), v.as_str()))
					.collect::<Vec<_>>();
				let authorization = Signer::consumer(
					&descriptor.client_id,
					descriptor.client_secret.expose(),
				)
				.authorization_header(
					"POST",
					&self.request_token_url,
					&[("oauth_callback", cx.redirect_uri.as_str())],
					&body,
				)?;
				let response = post_form(cx, &self.request_token_url, &authorization, &body).await?;
				let mut fields = parse_credential_form(&response)?;
				let token = take_field(&mut fields, "oauth_token")?;
				let secret = take_field(&mut fields, "oauth_token_secret")?;

				Ok::<_, Error>((token, TokenSecret::new(secret)))
			})
			.await
			.map_err(Error::request_token);

		obs::record_flow_outcome(KIND, cx.descriptor.name(), FlowOutcome::of(&result));

		result
	}
}
impl Debug for OAuth1Strategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth1Strategy")
			.field("request_token_url", &self.request_token_url)
			.field("request_token_params", &self.request_token_params)
			.finish_non_exhaustive()
	}
}
impl ProviderStrategy for OAuth1Strategy {
	fn authorization_query<'a>(
		&'a self,
		cx: StrategyContext<'a>,
		_request: &'a RequestContext,
	) -> StrategyFuture<'a, AuthorizationQuery> {
		Box::pin(async move {
			let (token, secret) = self.request_temporary_credential(cx).await?;

			self.store
				.insert(token.clone(), TemporaryCredential::new(secret.expose()))
				.await?;

			let mut query = AuthorizationQuery::default();

			query.insert("oauth_token", token);

			Ok(query)
		})
	}

	fn authorization_committed<'a>(
		&'a self,
		issued: &'a AuthorizationQuery,
		accepted: &'a AuthorizationQuery,
	) -> StrategyFuture<'a, ()> {
		Box::pin(async move {
			if let Some(token) = issued.get("oauth_token") {
				let state = accepted.get("state").map(str::to_owned);

				self.store.record_state(token, state).await?;
			}

			Ok(())
		})
	}

	fn authorization_aborted<'a>(
		&'a self,
		issued: &'a AuthorizationQuery,
	) -> StrategyFuture<'a, ()> {
		Box::pin(async move {
			if let Some(token) = issued.get("oauth_token") {
				self.store.take(token).await?;
			}

			Ok(())
		})
	}

	fn detect_user_error(&self, request: &RequestContext) -> Option<CodeError> {
		if request.query("denied").is_some_and(|token| !token.is_empty()) {
			return Some(CodeError::Denied { description: None });
		}

		default_user_error(request)
	}

	fn extract_code(&self, request: &RequestContext) -> Option<String> {
		request.query("oauth_token").filter(|token| !token.is_empty()).map(str::to_owned)
	}

	fn exchange_code<'a>(
		&'a self,
		cx: StrategyContext<'a>,
		code: &'a str,
		request: &'a RequestContext,
	) -> StrategyFuture<'a, AccessTokenResult> {
		Box::pin(async move {
			let credential = self.store.take(code).await?.ok_or(Error::RequestDataMissing)?;
			let descriptor = cx.descriptor;
			let url = &descriptor.endpoints.token;
			let verifier = request.query("oauth_verifier").unwrap_or_default();
			let authorization =
				Signer::consumer(&descriptor.client_id, descriptor.client_secret.expose())
					.with_token(code, credential.secret.expose())
					.authorization_header("POST", url, &[("oauth_verifier", verifier)], &[])?;
			let response = post_form(cx, url, &authorization, &[]).await?;
			let mut fields = parse_credential_form(&response)?;
			let access_token = take_field(&mut fields, "oauth_token")?;
			let secret_token = take_field(&mut fields, "oauth_token_secret")?;
			let mut tokens = AccessTokenResult::new(access_token).with_secret_token(secret_token);

			tokens.state = credential.state;
			tokens.extra.extend(fields.into_iter().map(|(k, v)| (k, Value::String(v))));

			Ok(tokens)
		})
	}

	fn refresh_token<'a>(
		&'a self,
		cx: StrategyContext<'a>,
		_refresh_token: &'a str,
	) -> StrategyFuture<'a, AccessTokenResult> {
		let provider = cx.descriptor.name().to_owned();

		Box::pin(async move {
			Err(ConfigError::UnsupportedGrant { provider, grant: "refresh_token" }.into())
		})
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
			let token_secret =
				tokens.secret_token.as_ref().map(TokenSecret::expose).unwrap_or_default();
			let authorization =
				Signer::consumer(&descriptor.client_id, descriptor.client_secret.expose())
					.with_token(tokens.access_token.expose(), token_secret)
					.authorization_header("GET", url, &[], &[])?;
			let raw = cx.client.fetch_json(url, &authorization).await?;

			if let Some(errors) = raw.get("errors").filter(|errors| !errors.is_null()) {
				return Err(Error::ProviderToken { error: errors.to_string(), description: None });
			}

			Ok(ProviderProfile::from_json(
				descriptor.id.clone(),
				raw,
				descriptor.profile_id_pointer.as_deref(),
			))
		})
	}
}

async fn post_form(
	cx: StrategyContext<'_>,
	url: &Url,
	authorization: &str,
	body: &[(&str, &str)],
) -> Result<HttpResponse> {
	let body = body
		.iter()
		.map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
		.collect::<Vec<_>>()
		.join("&");
	let request = Request::builder()
		.method(Method::POST)
		.uri(url.as_str())
		.header(header::AUTHORIZATION, authorization)
		.header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
		.body(body.into_bytes())
		.map_err(ConfigError::from)?;

	cx.client.send(request).await
}

fn parse_credential_form(response: &HttpResponse) -> Result<BTreeMap<String, String>> {
	oauth::ensure_success(response)?;

	Ok(url::form_urlencoded::parse(response.body()).into_owned().collect())
}

fn take_field(fields: &mut BTreeMap<String, String>, field: &'static str) -> Result<String> {
	fields
		.remove(field)
		.filter(|value| !value.is_empty())
		.ok_or(Error::CredentialResponse { field })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::MemoryCredentialStore;

	fn strategy() -> OAuth1Strategy {
		OAuth1Strategy::new(
			Url::parse("https://api.example.com/oauth/request_token")
				.expect("Request token URL should parse."),
			Arc::new(MemoryCredentialStore::new()),
		)
	}

	#[test]
	fn denied_callbacks_are_user_errors() {
		let request = RequestContext::from_pairs([("denied", "request-token")]);

		assert_eq!(
			strategy().detect_user_error(&request),
			Some(CodeError::Denied { description: None })
		);
		assert_eq!(
			strategy().detect_user_error(&RequestContext::from_pairs([("oauth_token", "t")])),
			None
		);
	}

	#[test]
	fn request_tokens_are_the_callback_code() {
		let request =
			RequestContext::from_pairs([("oauth_token", "request-token"), ("oauth_verifier", "v")]);

		assert_eq!(strategy().extract_code(&request).as_deref(), Some("request-token"));
		assert_eq!(strategy().extract_code(&RequestContext::default()), None);
	}

	#[tokio::test]
	async fn committed_queries_record_state_and_aborted_ones_release_entries() {
		let strategy = strategy();
		let mut issued = AuthorizationQuery::default();

		strategy
			.store()
			.insert("request-token".into(), TemporaryCredential::new("secret"))
			.await
			.expect("Insert should succeed.");
		issued.insert("oauth_token", "request-token");

		let mut accepted = issued.clone();

		accepted.insert("oauth_token", "rewritten");
		accepted.insert("state", "csrf");
		strategy.authorization_committed(&issued, &accepted).await.expect("Commit should succeed.");

		let credential = strategy
			.store()
			.take("request-token")
			.await
			.expect("Take should succeed.")
			.expect("Entry should be present.");

		assert_eq!(credential.state.as_deref(), Some("csrf"));

		strategy
			.store()
			.insert("request-token".into(), TemporaryCredential::new("secret"))
			.await
			.expect("Insert should succeed.");
		strategy.authorization_aborted(&issued).await.expect("Abort should succeed.");

		let released = strategy.store().take("request-token").await.expect("Take should succeed.");

		assert!(released.is_none());
	}

	#[test]
	fn credential_forms_require_both_halves() {
		let mut fields = url::form_urlencoded::parse(b"oauth_token=t&oauth_token_secret=")
			.into_owned()
			.collect::<BTreeMap<_, _>>();

		assert_eq!(take_field(&mut fields, "oauth_token").expect("Token should be present."), "t");
		assert!(matches!(
			take_field(&mut fields, "oauth_token_secret"),
			Err(Error::CredentialResponse { field: "oauth_token_secret" })
		));
	}
}
