//! Registers two providers, attaches a CSRF `state` in the pre-authorization hook, and prints
//! the consent URLs a host would redirect users to.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use url::Url;
// self
use oauth_link::{
	auth::{AccessTokenResult, ScopeSet, ScopeSpec},
	error::HookError,
	flows::{
		AuthorizationQuery, Connector, HookFuture, LinkFailure, LinkHandler, LinkSuccess,
		RequestContext,
	},
	provider::{DefaultProviderStrategy, presets},
	registry::{LinkRegistry, RegistryConfig},
};

struct StateHandler;
impl LinkHandler for StateHandler {
	type Response = Option<AccessTokenResult>;

	fn pre_auth_url<'a>(
		&'a self,
		query: &'a mut AuthorizationQuery,
		provider: &'a Connector,
		_request: &'a RequestContext,
	) -> HookFuture<'a, Result<(), HookError>> {
		Box::pin(async move {
			query.insert("state", format!("{}-csrf-demo", provider.name()));

			Ok(())
		})
	}

	fn on_link<'a>(&'a self, success: LinkSuccess<'a>) -> HookFuture<'a, Self::Response> {
		Box::pin(async move { Some(success.data) })
	}

	fn on_error<'a>(&'a self, failure: LinkFailure<'a>) -> HookFuture<'a, Self::Response> {
		Box::pin(async move {
			eprintln!("Link with {} failed: {}.", failure.provider.name(), failure.error);

			None
		})
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = RegistryConfig::new(Url::parse("https://app.example.com")?);
	let mut registry = LinkRegistry::new(config, StateHandler)?;

	registry.register(
		presets::google("demo-google-client", "demo-secret", ScopeSet::new(["email", "profile"])?)?,
		Arc::new(DefaultProviderStrategy::default()),
	)?;
	registry.register(
		presets::discord(
			"demo-discord-client",
			"demo-secret",
			ScopeSpec::computed(|_, request| {
				let mut scopes = vec!["identify".to_owned()];

				if request.query("guilds").is_some() {
					scopes.push("guilds".into());
				}

				scopes
			}),
		)?,
		Arc::new(DefaultProviderStrategy::default()),
	)?;

	let request = RequestContext::from_query_str("guilds=1");

	for name in registry.providers() {
		let url = registry.authorization_url(name, &request).await?;

		println!("{name}: send your user to {url}");
		println!("{name}: callback route {}", RegistryConfig::callback_path(name));
	}

	Ok(())
}
