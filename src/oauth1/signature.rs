//! RFC 5849 HMAC-SHA1 request signing.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use rand::{Rng, distr::Alphanumeric};
use sha1::Sha1;
// self
use crate::{_prelude::*, error::ConfigError, http::encode_component};

type HmacSha1 = Hmac<Sha1>;

const NONCE_LEN: usize = 32;

/// Signature method advertised in every signed request.
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";

/// Consumer and (optional) token credentials used to sign one request.
#[derive(Clone, Copy)]
pub struct Signer<'a> {
	/// Consumer key (the provider's client id).
	pub consumer_key: &'a str,
	/// Consumer secret (the provider's client secret).
	pub consumer_secret: &'a str,
	/// Request or access token, when the request is made on behalf of one.
	pub token: Option<&'a str>,
	/// Secret paired with `token`.
	pub token_secret: Option<&'a str>,
}
impl<'a> Signer<'a> {
	/// Signs as the consumer only.
	pub fn consumer(consumer_key: &'a str, consumer_secret: &'a str) -> Self {
		Self { consumer_key, consumer_secret, token: None, token_secret: None }
	}

	/// Adds token credentials.
	pub fn with_token(mut self, token: &'a str, token_secret: &'a str) -> Self {
		self.token = Some(token);
		self.token_secret = Some(token_secret);

		self
	}

	/// Builds the `Authorization` header for a request, using a fresh nonce and timestamp.
	///
	/// `protocol` carries extra `oauth_*` parameters such as `oauth_callback` or
	/// `oauth_verifier`; `body` carries form parameters sent in the request body.
	pub fn authorization_header(
		&self,
		method: &str,
		url: &Url,
		protocol: &[(&str, &str)],
		body: &[(&str, &str)],
	) -> Result<String> {
		let nonce = nonce();
		let timestamp = OffsetDateTime::now_utc().unix_timestamp().to_string();

		self.authorization_header_with(method, url, protocol, body, &nonce, &timestamp)
	}

	/// Same as [`authorization_header`](Self::authorization_header) with a fixed nonce and
	/// timestamp.
	pub fn authorization_header_with(
		&self,
		method: &str,
		url: &Url,
		protocol: &[(&str, &str)],
		body: &[(&str, &str)],
		nonce: &str,
		timestamp: &str,
	) -> Result<String> {
		let mut oauth = vec![
			("oauth_consumer_key", self.consumer_key),
			("oauth_nonce", nonce),
			("oauth_signature_method", SIGNATURE_METHOD),
			("oauth_timestamp", timestamp),
			("oauth_version", "1.0"),
		];

		if let Some(token) = self.token {
			oauth.push(("oauth_token", token));
		}

		oauth.extend_from_slice(protocol);

		let params = oauth.iter().chain(body).map(|(k, v)| (*k, *v));
		let base = signature_base_string(method, url, params);
		let signature = sign(&base, self.consumer_secret, self.token_secret.unwrap_or_default())?;

		oauth.push(("oauth_signature", &signature));
		oauth.sort_unstable();

		let fields = oauth
			.iter()
			.map(|(k, v)| format!("{}=\"{}\"", encode_component(k), encode_component(v)))
			.collect::<Vec<_>>()
			.join(", ");

		Ok(format!("OAuth {fields}"))
	}
}
impl Debug for Signer<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Signer")
			.field("consumer_key", &self.consumer_key)
			.field("token", &self.token)
			.finish_non_exhaustive()
	}
}

/// Builds the signature base string: method, base URI, and normalized parameters.
///
/// Query parameters already present on `url` are folded into the normalized set.
pub fn signature_base_string<'a, I>(method: &str, url: &Url, params: I) -> String
where
	I: IntoIterator<Item = (&'a str, &'a str)>,
{
	let mut normalized = url
		.query_pairs()
		.map(|(k, v)| (encode_component(&k), encode_component(&v)))
		.chain(params.into_iter().map(|(k, v)| (encode_component(k), encode_component(v))))
		.collect::<Vec<_>>();

	normalized.sort_unstable();

	let normalized =
		normalized.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&");

	format!(
		"{}&{}&{}",
		method.to_ascii_uppercase(),
		encode_component(&base_uri(url)),
		encode_component(&normalized)
	)
}

/// Signs `base` with `consumer_secret&token_secret` and returns the base64 digest.
pub fn sign(base: &str, consumer_secret: &str, token_secret: &str) -> Result<String> {
	let key = format!("{}&{}", encode_component(consumer_secret), encode_component(token_secret));
	let mut mac =
		HmacSha1::new_from_slice(key.as_bytes()).map_err(|_| ConfigError::InvalidSigningKey)?;

	mac.update(base.as_bytes());

	Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Generates an alphanumeric nonce.
pub fn nonce() -> String {
	rand::rng().sample_iter(&Alphanumeric).take(NONCE_LEN).map(char::from).collect()
}

fn base_uri(url: &Url) -> String {
	let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
	let port = url.port().map(|port| format!(":{port}")).unwrap_or_default();

	format!("{}://{host}{port}{}", url.scheme(), url.path())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const CONSUMER_KEY: &str = "xvz1evFS4wEEPTGEFPHBog";
	const CONSUMER_SECRET: &str = "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw";
	const TOKEN: &str = "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb";
	const TOKEN_SECRET: &str = "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE";
	const NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
	const TIMESTAMP: &str = "1318622958";
	const STATUS: &str = "Hello Ladies + Gentlemen, a signed OAuth request!";

	fn status_url() -> Url {
		Url::parse("https://api.twitter.com/1.1/statuses/update.json?include_entities=true")
			.expect("Status URL should parse.")
	}

	#[test]
	fn base_string_matches_published_example() {
		let base = signature_base_string(
			"post",
			&status_url(),
			[
				("status", STATUS),
				("oauth_consumer_key", CONSUMER_KEY),
				("oauth_nonce", NONCE),
				("oauth_signature_method", SIGNATURE_METHOD),
				("oauth_timestamp", TIMESTAMP),
				("oauth_token", TOKEN),
				("oauth_version", "1.0"),
			],
		);

		assert!(base.starts_with(concat!(
			"POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json",
			"&include_entities%3Dtrue%26oauth_consumer_key",
		)));
		assert!(base.ends_with(concat!(
			"status%3DHello%2520Ladies%2520%252B%2520Gentlemen%252C",
			"%2520a%2520signed%2520OAuth%2520request%2521",
		)));
	}

	#[test]
	fn header_carries_published_signature() {
		let header = Signer::consumer(CONSUMER_KEY, CONSUMER_SECRET)
			.with_token(TOKEN, TOKEN_SECRET)
			.authorization_header_with(
				"POST",
				&status_url(),
				&[],
				&[("status", STATUS)],
				NONCE,
				TIMESTAMP,
			)
			.expect("Signing should succeed.");

		assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\", "));
		assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
		assert!(
			header.contains("oauth_token=\"370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb\"")
		);
	}

	#[test]
	fn consumer_only_signatures_use_an_empty_token_secret() {
		let base = "GET&https%3A%2F%2Fexample.com%2F&a%3Db";

		assert_eq!(
			sign(base, "secret", "").expect("Signing should succeed."),
			sign(base, "secret", "").expect("Signing should succeed.")
		);
		assert_ne!(
			sign(base, "secret", "").expect("Signing should succeed."),
			sign(base, "secret", "token").expect("Signing should succeed.")
		);
	}

	#[test]
	fn nonces_are_alphanumeric() {
		let nonce = nonce();

		assert_eq!(nonce.len(), NONCE_LEN);
		assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
		assert_ne!(nonce, super::nonce());
	}
}
