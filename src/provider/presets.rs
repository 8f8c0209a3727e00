//! Descriptors for well-known providers.
//!
//! Each preset fills in endpoints, body encoding, and the profile id pointer; hosts supply
//! credentials and scopes. The returned descriptors are ordinary values and can be paired with
//! any strategy, although [`twitter`] only makes sense with [`twitter_strategy`].

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, ScopeSpec},
	error::ConfigError,
	oauth1::OAuth1Strategy,
	provider::{BodyEncoding, ProviderDescriptor, ProviderDescriptorBuilder},
	store::TemporaryCredentialStore,
};

const TWITTER_REQUEST_TOKEN_URL: &str = "https://api.twitter.com/oauth/request_token";

/// Google: form-encoded exchanges and `access_type=offline` so refresh tokens are issued.
pub fn google(
	client_id: impl Into<String>,
	client_secret: impl Into<String>,
	scopes: impl Into<ScopeSpec>,
) -> Result<ProviderDescriptor> {
	finish(ProviderDescriptor::builder(provider_id("google")?)
		.client_id(client_id)
		.client_secret(client_secret)
		.authorization_endpoint(endpoint(
			"authorization",
			"https://accounts.google.com/o/oauth2/v2/auth",
		)?)
		.token_endpoint(endpoint("token", "https://www.googleapis.com/oauth2/v4/token")?)
		.profile_endpoint(endpoint("profile", "https://www.googleapis.com/oauth2/v1/userinfo")?)
		.profile_id_pointer("/id")
		.scopes(scopes)
		.query_param("access_type", "offline")
		.encoding(BodyEncoding::FormUrlencoded)
	)
}

/// Discord: form-encoded exchanges.
pub fn discord(
	client_id: impl Into<String>,
	client_secret: impl Into<String>,
	scopes: impl Into<ScopeSpec>,
) -> Result<ProviderDescriptor> {
	finish(ProviderDescriptor::builder(provider_id("discord")?)
		.client_id(client_id)
		.client_secret(client_secret)
		.authorization_endpoint(endpoint(
			"authorization",
			"https://discord.com/api/oauth2/authorize",
		)?)
		.token_endpoint(endpoint("token", "https://discord.com/api/oauth2/token")?)
		.profile_endpoint(endpoint("profile", "https://discord.com/api/users/@me")?)
		.profile_id_pointer("/id")
		.scopes(scopes)
		.encoding(BodyEncoding::FormUrlencoded)
	)
}

/// Twitch: JSON exchanges, no profile endpoint.
pub fn twitch(
	client_id: impl Into<String>,
	client_secret: impl Into<String>,
	scopes: impl Into<ScopeSpec>,
) -> Result<ProviderDescriptor> {
	finish(ProviderDescriptor::builder(provider_id("twitch")?)
		.client_id(client_id)
		.client_secret(client_secret)
		.authorization_endpoint(endpoint("authorization", "https://id.twitch.tv/oauth2/authorize")?)
		.token_endpoint(endpoint("token", "https://id.twitch.tv/oauth2/token")?)
		.scopes(scopes)
	)
}

/// Picarto: JSON exchanges; the user id sits under `channel_details`.
pub fn picarto(
	client_id: impl Into<String>,
	client_secret: impl Into<String>,
	scopes: impl Into<ScopeSpec>,
) -> Result<ProviderDescriptor> {
	finish(ProviderDescriptor::builder(provider_id("picarto")?)
		.client_id(client_id)
		.client_secret(client_secret)
		.authorization_endpoint(endpoint("authorization", "https://oauth.picarto.tv/authorize")?)
		.token_endpoint(endpoint("token", "https://oauth.picarto.tv/token")?)
		.profile_endpoint(endpoint("profile", "https://api.picarto.tv/v1/user")?)
		.profile_id_pointer("/channel_details/user_id")
		.scopes(scopes)
	)
}

/// Mixer: JSON exchanges.
pub fn mixer(
	client_id: impl Into<String>,
	client_secret: impl Into<String>,
	scopes: impl Into<ScopeSpec>,
) -> Result<ProviderDescriptor> {
	finish(ProviderDescriptor::builder(provider_id("mixer")?)
		.client_id(client_id)
		.client_secret(client_secret)
		.authorization_endpoint(endpoint("authorization", "https://mixer.com/oauth/authorize")?)
		.token_endpoint(endpoint("token", "https://mixer.com/api/v1/oauth/token")?)
		.profile_endpoint(endpoint("profile", "https://mixer.com/api/v1/users/current")?)
		.profile_id_pointer("/id")
		.scopes(scopes)
	)
}

/// Microsoft identity platform for `tenant` (`common`, `organizations`, or a tenant id).
pub fn microsoft(
	tenant: &str,
	client_id: impl Into<String>,
	client_secret: impl Into<String>,
	scopes: impl Into<ScopeSpec>,
) -> Result<ProviderDescriptor> {
	let base = format!("https://login.microsoftonline.com/{tenant}/oauth2/v2.0");

	finish(ProviderDescriptor::builder(provider_id("microsoft")?)
		.client_id(client_id)
		.client_secret(client_secret)
		.authorization_endpoint(endpoint("authorization", &format!("{base}/authorize"))?)
		.token_endpoint(endpoint("token", &format!("{base}/token"))?)
		.profile_endpoint(endpoint("profile", "https://graph.microsoft.com/v1.0/me/")?)
		.profile_id_pointer("/id")
		.scopes(scopes)
		.encoding(BodyEncoding::FormUrlencoded)
	)
}

/// Twitter OAuth 1.0a: the token endpoint is the access-token endpoint.
pub fn twitter(
	consumer_key: impl Into<String>,
	consumer_secret: impl Into<String>,
) -> Result<ProviderDescriptor> {
	finish(ProviderDescriptor::builder(provider_id("twitter")?)
		.client_id(consumer_key)
		.client_secret(consumer_secret)
		.authorization_endpoint(endpoint(
			"authorization",
			"https://api.twitter.com/oauth/authenticate",
		)?)
		.token_endpoint(endpoint("token", "https://api.twitter.com/oauth/access_token")?)
		.profile_endpoint(endpoint(
			"profile",
			"https://api.twitter.com/1.1/account/verify_credentials.json",
		)?)
		.profile_id_pointer("/id_str")
		.encoding(BodyEncoding::FormUrlencoded)
	)
}

/// OAuth 1.0a strategy for [`twitter`], requesting write access.
pub fn twitter_strategy(store: Arc<dyn TemporaryCredentialStore>) -> Result<OAuth1Strategy> {
	Ok(OAuth1Strategy::new(endpoint("request_token", TWITTER_REQUEST_TOKEN_URL)?, store)
		.request_token_param("x_auth_access_type", "write"))
}

fn finish(builder: ProviderDescriptorBuilder) -> Result<ProviderDescriptor> {
	builder.build().map_err(|e| ConfigError::from(e).into())
}

fn provider_id(name: &str) -> Result<ProviderId> {
	ProviderId::new(name).map_err(|e| ConfigError::from(e).into())
}

fn endpoint(field: &'static str, raw: &str) -> Result<Url> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { field, source }.into())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{auth::ScopeSet, store::MemoryCredentialStore};

	#[test]
	fn presets_build() {
		let scopes = ScopeSet::new(["email"]).expect("Scopes should be valid.");
		let google = google("cid", "secret", scopes.clone()).expect("Google preset should build.");

		assert_eq!(google.name(), "google");
		assert_eq!(google.encoding, BodyEncoding::FormUrlencoded);
		assert_eq!(google.query.get("access_type").map(String::as_str), Some("offline"));

		discord("cid", "secret", scopes.clone()).expect("Discord preset should build.");
		twitch("cid", "secret", scopes.clone()).expect("Twitch preset should build.");
		twitter("key", "secret").expect("Twitter preset should build.");
		twitter_strategy(Arc::new(MemoryCredentialStore::new()))
			.expect("Twitter strategy should build.");
	}

	#[test]
	fn streaming_presets_use_json_exchanges_and_locate_profile_ids() {
		let scopes = ScopeSet::new(["user:read"]).expect("Scopes should be valid.");
		let picarto =
			picarto("cid", "secret", scopes.clone()).expect("Picarto preset should build.");
		let mixer = mixer("cid", "secret", scopes).expect("Mixer preset should build.");

		assert_eq!(picarto.name(), "picarto");
		assert_eq!(picarto.encoding, BodyEncoding::Json);
		assert_eq!(picarto.endpoints.token.as_str(), "https://oauth.picarto.tv/token");
		assert_eq!(
			picarto.endpoints.profile.as_ref().map(Url::as_str),
			Some("https://api.picarto.tv/v1/user")
		);
		assert_eq!(picarto.profile_id_pointer.as_deref(), Some("/channel_details/user_id"));
		assert_eq!(mixer.name(), "mixer");
		assert_eq!(mixer.encoding, BodyEncoding::Json);
		assert_eq!(mixer.endpoints.authorization.as_str(), "https://mixer.com/oauth/authorize");
		assert_eq!(
			mixer.endpoints.profile.as_ref().map(Url::as_str),
			Some("https://mixer.com/api/v1/users/current")
		);
		assert_eq!(mixer.profile_id_pointer.as_deref(), Some("/id"));
	}

	#[test]
	fn microsoft_urls_are_tenant_scoped() {
		let descriptor = microsoft("contoso", "cid", "secret", ScopeSpec::default())
			.expect("Microsoft preset should build.");

		assert_eq!(
			descriptor.endpoints.token.as_str(),
			"https://login.microsoftonline.com/contoso/oauth2/v2.0/token"
		);
	}
}
