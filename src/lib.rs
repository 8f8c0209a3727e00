//! Provider-agnostic login engine that normalizes OAuth 2.0 authorization-code grants and
//! OAuth 1.0a three-legged handshakes behind one host-facing contract.
//!
//! A host registers providers (descriptor + strategy) in a [`registry::LinkRegistry`], sends
//! users to the URL returned by its begin-authorization route, and feeds the provider's
//! callback back in. The outcome reaches the host through exactly one call to its
//! [`flows::LinkHandler`]. Outbound calls go through [`http::TokenHttpClient`], with a reqwest
//! implementation behind the default `reqwest` feature.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod oauth1;
pub mod obs;
pub mod provider;
pub mod registry;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use crate::{
		error::TransportError,
		flows::{Connector, RequestContext},
		http::{
			HttpFuture, HttpRequest, HttpResponse, ReqwestHttpClient, StatusCode, TokenHttpClient,
			header::HeaderMap,
		},
		provider::{DefaultProviderStrategy, ProviderDescriptor, ProviderStrategy},
	};

	/// Snapshot of one request seen by [`RecordingHttpClient`].
	#[derive(Clone, Debug)]
	pub struct RecordedRequest {
		/// HTTP method.
		pub method: String,
		/// Full request URI.
		pub uri: String,
		/// Request headers.
		pub headers: HeaderMap,
		/// Raw request body.
		pub body: Vec<u8>,
	}
	impl RecordedRequest {
		/// Returns a header value as text.
		pub fn header(&self, name: &str) -> Option<&str> {
			self.headers.get(name).and_then(|value| value.to_str().ok())
		}

		/// Returns the body as text.
		pub fn body_text(&self) -> String {
			String::from_utf8_lossy(&self.body).into_owned()
		}
	}

	/// In-process transport that records every request and answers with a canned response.
	#[derive(Clone, Debug)]
	pub struct RecordingHttpClient {
		calls: Arc<AtomicUsize>,
		requests: Arc<Mutex<Vec<RecordedRequest>>>,
		status: u16,
		body: Arc<str>,
	}
	impl RecordingHttpClient {
		/// Answers every request with `status` and `body`.
		pub fn new(status: u16, body: &str) -> Self {
			Self {
				calls: Default::default(),
				requests: Default::default(),
				status,
				body: Arc::from(body),
			}
		}

		/// Number of requests executed so far.
		pub fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}

		/// Requests executed so far, oldest first.
		pub fn requests(&self) -> Vec<RecordedRequest> {
			self.requests.lock().clone()
		}
	}
	impl TokenHttpClient for RecordingHttpClient {
		fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
			Box::pin(async move {
				self.calls.fetch_add(1, Ordering::SeqCst);
				self.requests.lock().push(RecordedRequest {
					method: request.method().to_string(),
					uri: request.uri().to_string(),
					headers: request.headers().clone(),
					body: request.into_body(),
				});

				let mut response = HttpResponse::new(self.body.as_bytes().to_vec());

				*response.status_mut() = StatusCode::from_u16(self.status)
					.map_err(TransportError::network)?;

				Ok(response)
			})
		}
	}

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`Connector`] backed by the default provider strategy and the reqwest
	/// transport used across integration tests.
	pub fn build_reqwest_test_connector(
		descriptor: ProviderDescriptor,
		redirect_uri: &str,
	) -> Connector {
		let strategy: Arc<dyn ProviderStrategy> = Arc::new(DefaultProviderStrategy::default());

		build_reqwest_test_connector_with(descriptor, strategy, redirect_uri)
	}

	/// Same as [`build_reqwest_test_connector`] with a caller-selected strategy.
	pub fn build_reqwest_test_connector_with(
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		redirect_uri: &str,
	) -> Connector {
		let redirect_uri =
			Url::parse(redirect_uri).expect("Test redirect URI should parse successfully.");

		Connector::with_http_client(descriptor, strategy, redirect_uri, test_reqwest_http_client())
	}

	/// Builds a [`RequestContext`] from `key=value` query pairs.
	pub fn query_context<'a, I>(pairs: I) -> RequestContext
	where
		I: IntoIterator<Item = (&'a str, &'a str)>,
	{
		RequestContext::from_pairs(pairs)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
