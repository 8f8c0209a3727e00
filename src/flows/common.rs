//! Shared request and query types used by every flow.

// std
use std::collections::btree_map::Iter;
// self
use crate::{_prelude::*, http};

/// Host-supplied view of one inbound request (begin-authorization or callback).
///
/// Only the pieces the engine reads are kept: decoded query parameters and, for hosts that
/// want to pass them along to hooks or computed scopes, lower-cased headers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
	query: BTreeMap<String, String>,
	headers: BTreeMap<String, String>,
}
impl RequestContext {
	/// Builds a context from decoded query pairs. The first occurrence of a key wins.
	pub fn from_pairs<I, K, V>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let mut query = BTreeMap::new();

		for (key, value) in pairs {
			query.entry(key.into()).or_insert_with(|| value.into());
		}

		Self { query, headers: BTreeMap::new() }
	}

	/// Builds a context from a raw (still percent-encoded) query string.
	pub fn from_query_str(raw: &str) -> Self {
		Self::from_pairs(url::form_urlencoded::parse(raw.trim_start_matches('?').as_bytes()))
	}

	/// Builds a context from the full URL the provider redirected the user to.
	pub fn from_url(url: &Url) -> Self {
		Self::from_pairs(url.query_pairs())
	}

	/// Attaches a header; names are matched case-insensitively.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Returns a decoded query parameter.
	pub fn query(&self, key: &str) -> Option<&str> {
		self.query.get(key).map(String::as_str)
	}

	/// Returns a header value.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Iterates over every decoded query parameter.
	pub fn query_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
		self.query.iter().map(|(key, value)| (key.as_str(), value.as_str()))
	}
}

/// Query sent to the provider's consent screen.
///
/// The pre-authorization hook receives it mutably, so hosts can add fields such as a CSRF
/// `state` before it is encoded onto the authorization URL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizationQuery(BTreeMap<String, String>);
impl AuthorizationQuery {
	/// Inserts or replaces a parameter.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
		self.0.insert(key.into(), value.into())
	}

	/// Returns a parameter value.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// Returns true when the parameter is present.
	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	/// Removes a parameter.
	pub fn remove(&mut self, key: &str) -> Option<String> {
		self.0.remove(key)
	}

	/// Number of parameters.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true when no parameters are set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over the parameters in key order.
	pub fn iter(&self) -> Iter<'_, String, String> {
		self.0.iter()
	}

	/// Percent-encodes the parameters (`%20` for spaces) into a query string.
	pub fn to_query_string(&self) -> String {
		self.0
			.iter()
			.map(|(key, value)| {
				format!("{}={}", http::encode_component(key), http::encode_component(value))
			})
			.collect::<Vec<_>>()
			.join("&")
	}

	/// Appends the encoded parameters to `base`, keeping any query it already carries.
	pub fn append_to(&self, base: &Url) -> Url {
		let mut url = base.clone();
		let encoded = self.to_query_string();
		let combined = match base.query() {
			Some(existing) if !existing.is_empty() && !encoded.is_empty() =>
				format!("{existing}&{encoded}"),
			Some(existing) if !existing.is_empty() => existing.to_owned(),
			_ => encoded,
		};

		url.set_query(if combined.is_empty() { None } else { Some(&combined) });

		url
	}
}
impl<'a> IntoIterator for &'a AuthorizationQuery {
	type IntoIter = Iter<'a, String, String>;
	type Item = (&'a String, &'a String);

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}
