//! Interactive OAuth 1.0a walkthrough for Twitter.
//!
//! The demo obtains a temporary credential, prints the consent URL, waits for the user to paste
//! the URL Twitter redirected to, completes the handshake, and fetches the linked profile.

// std
use std::{
	io::{self, Write},
	sync::Arc,
};
// crates.io
use color_eyre::Result;
use url::Url;
// self
use oauth_link::{
	flows::{DefaultLinkHandler, RequestContext},
	provider::presets,
	registry::{LinkRegistry, RegistryConfig},
	store::{MemoryCredentialStore, TemporaryCredentialStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let consumer_key = prompt("Enter your Twitter consumer key")?;
	let consumer_secret = prompt("Enter your Twitter consumer secret")?;
	let base_url = Url::parse(&prompt("Enter the base URL of your callback host")?)?;
	let store: Arc<dyn TemporaryCredentialStore> = Arc::new(MemoryCredentialStore::default());
	let mut registry = LinkRegistry::new(RegistryConfig::new(base_url), DefaultLinkHandler)?;

	registry.register(
		presets::twitter(consumer_key, consumer_secret)?,
		Arc::new(presets::twitter_strategy(store)?),
	)?;

	let url = registry.authorization_url("twitter", &RequestContext::default()).await?;

	println!("Authorize URL: {url}");

	let returned = Url::parse(&prompt("Paste the full URL Twitter redirected you to")?)?;
	let tokens = registry.handle_callback("twitter", &RequestContext::from_url(&returned)).await??;

	println!("Access token: {}", tokens.access_token.expose());

	if let Some(secret) = tokens.secret_token.as_ref() {
		println!("Token secret: {}", secret.expose());
	}

	let profile = registry.connector("twitter")?.fetch_profile(&tokens).await?;

	println!("Linked user id: {}", profile.id.as_deref().unwrap_or("<unknown>"));

	Ok(())
}

fn prompt(message: &str) -> Result<String> {
	loop {
		print!("{message}: ");

		io::stdout().flush()?;

		let mut input = String::new();

		io::stdin().read_line(&mut input)?;

		let trimmed = input.trim();

		if !trimmed.is_empty() {
			return Ok(trimmed.to_owned());
		}
	}
}
