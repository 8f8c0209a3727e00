//! Transport primitives for outbound provider calls.
//!
//! The engine depends on [`TokenHttpClient`] only, so hosts can swap in any HTTP stack (or a
//! recording fake in tests). Requests and responses use the `http` types re-exported by the
//! `oauth2` crate.

// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
// self
use crate::{_prelude::*, error::TransportError};

pub use oauth2::{HttpRequest, HttpResponse, http::{Method, Request, StatusCode, header}};

/// Characters left untouched by [`encode_component`] (RFC 3986 unreserved set).
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Boxed future returned by [`TokenHttpClient::execute`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing provider calls.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared across
/// connectors behind an `Arc`, and the returned future must be `Send` so flows can run on
/// multi-threaded executors. Any HTTP status is a successful transport outcome; only failures
/// to obtain a response map to [`TransportError`].
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Sends one request and buffers the full response.
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Provider endpoints should not follow redirects, because token and profile endpoints return
/// results directly; [`ReqwestHttpClient::new`] configures that.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a client that never follows redirects.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl TokenHttpClient for ReqwestHttpClient {
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client.execute(request.try_into()?).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for crate::error::ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Percent-encodes a query or signature component, leaving only RFC 3986 unreserved bytes.
pub fn encode_component(value: &str) -> String {
	utf8_percent_encode(value, COMPONENT).to_string()
}
