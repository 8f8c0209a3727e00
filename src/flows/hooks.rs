//! Host hook contract consumed by the authorization and callback flows.
//!
//! The engine never decides what happens after a link succeeds or fails; it hands the outcome
//! to a [`LinkHandler`] exactly once per callback and returns whatever the handler produces.

// self
use crate::{
	_prelude::*,
	auth::AccessTokenResult,
	error::HookError,
	flows::{AuthorizationQuery, Connector, RequestContext},
};

/// Boxed future returned by host hooks.
pub type HookFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a + Send>>;

/// Successful link handed to [`LinkHandler::on_link`].
#[derive(Debug)]
pub struct LinkSuccess<'a> {
	/// Provider that completed the link.
	pub provider: &'a Connector,
	/// Tokens issued by the provider.
	pub data: AccessTokenResult,
	/// Callback request that completed the link.
	pub request: &'a RequestContext,
}

/// Failed link handed to [`LinkHandler::on_error`].
#[derive(Debug)]
pub struct LinkFailure<'a> {
	/// Provider whose callback failed.
	pub provider: &'a Connector,
	/// Normalized failure.
	pub error: Error,
	/// Callback request that failed.
	pub request: &'a RequestContext,
}

/// Host-supplied hooks that decide what happens around a login.
///
/// Every callback ends in exactly one call to either [`on_link`](Self::on_link) or
/// [`on_error`](Self::on_error); their common [`Response`](Self::Response) is returned to the
/// host's route handler unchanged.
pub trait LinkHandler: Send + Sync {
	/// Value produced by the terminal hooks.
	type Response: Send;

	/// Observes or extends the authorization query before it is encoded.
	///
	/// Returning an error aborts the authorization and no URL is produced.
	fn pre_auth_url<'a>(
		&'a self,
		_query: &'a mut AuthorizationQuery,
		_provider: &'a Connector,
		_request: &'a RequestContext,
	) -> HookFuture<'a, Result<(), HookError>> {
		Box::pin(async { Ok(()) })
	}

	/// Receives a successful link.
	fn on_link<'a>(&'a self, success: LinkSuccess<'a>) -> HookFuture<'a, Self::Response>;

	/// Receives a failed link.
	fn on_error<'a>(&'a self, failure: LinkFailure<'a>) -> HookFuture<'a, Self::Response>;
}

/// Handler that returns the issued tokens on success and the error on failure.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultLinkHandler;
impl LinkHandler for DefaultLinkHandler {
	type Response = Result<AccessTokenResult>;

	fn on_link<'a>(&'a self, success: LinkSuccess<'a>) -> HookFuture<'a, Self::Response> {
		Box::pin(async move { Ok(success.data) })
	}

	fn on_error<'a>(&'a self, failure: LinkFailure<'a>) -> HookFuture<'a, Self::Response> {
		Box::pin(async move { Err(failure.error) })
	}
}
