//! Storage contract and built-in implementation for OAuth 1.0a temporary credentials.
//!
//! A temporary credential links the request token issued by the provider to its secret (and
//! the host's echoed `state`) for the short window between issuing the authorization URL and
//! receiving the callback. Entries are single use: [`TemporaryCredentialStore::take`] removes
//! and returns an entry in one step so two callbacks can never consume the same token.

pub mod memory;

pub use memory::MemoryCredentialStore;

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Boxed future returned by [`TemporaryCredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Keyed storage shared by every in-flight OAuth 1.0a handshake of a provider.
///
/// Implementations must be safe under concurrent access: one handshake's insert must never be
/// observed as another handshake's lookup result.
pub trait TemporaryCredentialStore
where
	Self: Send + Sync,
{
	/// Stores `credential` under the provider-issued request `token`, replacing any previous
	/// entry for the same token.
	fn insert(&self, token: String, credential: TemporaryCredential) -> StoreFuture<'_, ()>;

	/// Records the host's `state` on an existing entry; returns false when the entry is absent.
	fn record_state<'a>(&'a self, token: &'a str, state: Option<String>) -> StoreFuture<'a, bool>;

	/// Atomically removes and returns the live entry for `token`.
	fn take<'a>(&'a self, token: &'a str) -> StoreFuture<'a, Option<TemporaryCredential>>;

	/// Drops every entry issued before `now - ttl`; returns how many were removed.
	fn purge_expired(&self, now: OffsetDateTime) -> StoreFuture<'_, usize>;
}

/// Secret half of a request token plus the host's echoed state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporaryCredential {
	/// Request token secret used to sign the access-token exchange.
	pub secret: TokenSecret,
	/// State added by the host's pre-authorization hook, echoed back on success.
	pub state: Option<String>,
	/// Issue instant used for expiry.
	#[serde(with = "time::serde::rfc3339")]
	pub issued_at: OffsetDateTime,
}
impl TemporaryCredential {
	/// Creates an entry issued now.
	pub fn new(secret: impl Into<String>) -> Self {
		Self::issued_at(secret, OffsetDateTime::now_utc())
	}

	/// Creates an entry issued at `issued_at`.
	pub fn issued_at(secret: impl Into<String>, issued_at: OffsetDateTime) -> Self {
		Self { secret: TokenSecret::new(secret), state: None, issued_at }
	}

	/// Returns true when the entry is older than `ttl` at `now`.
	pub fn is_expired(&self, ttl: Duration, now: OffsetDateTime) -> bool {
		now - self.issued_at >= ttl
	}
}

/// Error type produced by [`TemporaryCredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
