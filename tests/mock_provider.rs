#![cfg(all(feature = "reqwest", feature = "test"))]

// self
use oauth_link::{
	_preludet::*,
	auth::{AccessTokenResult, ProviderId, ScopeSet, ScopeSpec},
	error::{CodeError, ConfigError},
	flows::{AuthorizationQuery, RequestContext},
	provider::{
		BodyEncoding, DefaultProviderStrategy, ProviderDescriptor, ProviderDescriptorBuilder,
		ProviderDescriptorError, ProviderSettings, ProviderStrategy, StrategyContext,
		StrategyFuture,
	},
};

fn url(value: &str) -> Url {
	Url::parse(value).expect("Failed to parse mock provider URL.")
}

fn builder(id: &str) -> ProviderDescriptorBuilder {
	let provider_id =
		ProviderId::new(id).expect("Failed to build provider identifier for mock descriptor.");

	ProviderDescriptor::builder(provider_id).client_id("client-123").client_secret("secret")
}

#[test]
fn descriptor_rejects_insecure_endpoints_and_missing_fields() {
	let err = builder("mock")
		.authorization_endpoint(url("http://example.com/auth"))
		.token_endpoint(url("https://example.com/token"))
		.build()
		.expect_err("Descriptor builder should reject insecure authorization endpoints.");

	assert!(matches!(
		err,
		ProviderDescriptorError::InsecureEndpoint { endpoint: "authorization", .. }
	));

	let err = builder("mock")
		.authorization_endpoint(url("https://example.com/auth"))
		.build()
		.expect_err("Descriptor builder should require a token endpoint.");

	assert_eq!(err, ProviderDescriptorError::MissingTokenEndpoint);

	let err = ProviderDescriptor::builder(ProviderId::new("mock").expect("Id should be valid."))
		.authorization_endpoint(url("https://example.com/auth"))
		.token_endpoint(url("https://example.com/token"))
		.build()
		.expect_err("Descriptor builder should require a client id.");

	assert_eq!(err, ProviderDescriptorError::MissingClientId);
}

#[test]
fn descriptor_rejects_reserved_query_extras() {
	let err = builder("mock")
		.authorization_endpoint(url("https://example.com/auth"))
		.token_endpoint(url("https://example.com/token"))
		.query_param("client_id", "shadow")
		.build()
		.expect_err("Extras must not shadow engine parameters.");

	assert_eq!(err, ProviderDescriptorError::ReservedQueryParameter { name: "client_id".into() });
}

#[test]
fn loopback_endpoints_may_use_plain_http() {
	let descriptor = builder("local")
		.authorization_endpoint(url("http://127.0.0.1:8080/auth"))
		.token_endpoint(url("http://localhost:8080/token"))
		.build()
		.expect("Loopback endpoints should be accepted.");

	assert_eq!(descriptor.endpoints.token.as_str(), "http://localhost:8080/token");
}

#[test]
fn settings_load_from_json() {
	let settings: ProviderSettings = serde_json::from_value(serde_json::json!({
		"name": "discord",
		"client_id": "cid",
		"client_secret": "secret",
		"auth_url": "https://discord.com/api/oauth2/authorize",
		"token_url": "https://discord.com/api/oauth2/token",
		"scopes": ["identify", "email"],
		"encoding": "form_urlencoded"
	}))
	.expect("Provider settings should deserialize.");
	let descriptor =
		ProviderDescriptor::try_from(settings).expect("Provider settings should validate.");

	assert_eq!(descriptor.name(), "discord");
	assert_eq!(descriptor.encoding, BodyEncoding::FormUrlencoded);
	assert!(matches!(descriptor.scopes, ScopeSpec::Fixed(ref set) if set.len() == 2));
}

#[test]
fn invalid_settings_surface_config_errors() {
	let settings: ProviderSettings = serde_json::from_value(serde_json::json!({
		"name": "plain",
		"client_id": "cid",
		"auth_url": "http://example.com/auth",
		"token_url": "https://example.com/token"
	}))
	.expect("Provider settings should deserialize.");
	let err = ProviderDescriptor::try_from(settings).expect_err("Insecure settings must fail.");

	assert!(matches!(err, ConfigError::InvalidDescriptor(_)));
}

#[tokio::test]
async fn computed_scopes_see_the_request_context() {
	let descriptor = builder("computed")
		.authorization_endpoint(url("https://example.com/auth"))
		.token_endpoint(url("https://example.com/token"))
		.scopes(ScopeSpec::computed(|provider, request| {
			let mut scopes = vec![format!("{provider}:read")];

			if request.query("write").is_some() {
				scopes.push(format!("{provider}:write"));
			}

			scopes
		}))
		.build()
		.expect("Descriptor should build.");
	let connector =
		build_reqwest_test_connector(descriptor, "https://app.example.com/oauth/computed");
	let query = connector
		.authorization_query(&query_context([("write", "1")]))
		.await
		.expect("Query should build.");

	assert_eq!(query.get("scope"), Some("computed:read computed:write"));
}

#[tokio::test]
async fn custom_strategies_override_single_steps() {
	struct SmashcastStrategy;
	impl ProviderStrategy for SmashcastStrategy {
		fn authorization_query<'a>(
			&'a self,
			cx: StrategyContext<'a>,
			_request: &'a RequestContext,
		) -> StrategyFuture<'a, AuthorizationQuery> {
			Box::pin(async move {
				let mut query = AuthorizationQuery::default();

				query.insert("app_token", cx.descriptor.client_id.as_str());

				Ok(query)
			})
		}

		fn extract_code(&self, request: &RequestContext) -> Option<String> {
			request.query("request_token").map(str::to_owned)
		}

		fn pre_authorized_tokens(&self, request: &RequestContext) -> Option<AccessTokenResult> {
			request.query("authToken").map(AccessTokenResult::new)
		}
	}

	let descriptor = builder("smashcast")
		.authorization_endpoint(url("https://api.example.com/oauth/login"))
		.token_endpoint(url("https://api.example.com/oauth/exchange"))
		.build()
		.expect("Descriptor should build.");
	let connector = build_reqwest_test_connector_with(
		descriptor,
		Arc::new(SmashcastStrategy),
		"https://app.example.com/oauth/smashcast",
	);
	let query = connector
		.authorization_query(&RequestContext::default())
		.await
		.expect("Query should build.");

	assert_eq!(query.get("app_token"), Some("client-123"));
	assert!(!query.contains_key("response_type"));

	let tokens = connector
		.resolve_callback(&query_context([("authToken", "issued")]))
		.await
		.expect("Pre-authorized callbacks should succeed.");

	assert_eq!(tokens.access_token.expose(), "issued");

	let err = connector
		.resolve_callback(&query_context([("code", "ignored")]))
		.await
		.expect_err("Custom code extraction should ignore `code`.");

	assert!(matches!(err, Error::Code(CodeError::Missing)));
}

#[tokio::test]
async fn default_strategy_reports_missing_profiles() {
	let descriptor = builder("noprofile")
		.authorization_endpoint(url("https://example.com/auth"))
		.token_endpoint(url("https://example.com/token"))
		.scopes(ScopeSet::default())
		.build()
		.expect("Descriptor should build.");
	let connector = build_reqwest_test_connector_with(
		descriptor,
		Arc::new(DefaultProviderStrategy::default()),
		"https://app.example.com/oauth/noprofile",
	);
	let err = connector
		.fetch_profile(&AccessTokenResult::new("at"))
		.await
		.expect_err("Providers without a profile endpoint should fail.");

	assert!(matches!(
		err,
		Error::ProfileNotImplemented { ref provider } if provider == "noprofile"
	));
}
