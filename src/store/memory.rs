//! Thread-safe in-memory [`TemporaryCredentialStore`] with lazy TTL eviction.

// self
use crate::{
	_prelude::*,
	store::{StoreError, StoreFuture, TemporaryCredential, TemporaryCredentialStore},
};

/// Default lifetime of an unconsumed temporary credential.
pub const DEFAULT_CREDENTIAL_TTL: Duration = Duration::minutes(15);

type CredentialMap = Arc<Mutex<HashMap<String, TemporaryCredential>>>;

/// Lock-guarded map keyed by request token.
///
/// Abandoned handshakes are evicted lazily: every insert purges entries older than the TTL and
/// expired entries are never returned by [`take`](TemporaryCredentialStore::take).
#[derive(Clone, Debug)]
pub struct MemoryCredentialStore {
	map: CredentialMap,
	ttl: Duration,
}
impl MemoryCredentialStore {
	/// Creates a store with [`DEFAULT_CREDENTIAL_TTL`].
	pub fn new() -> Self {
		Self::with_ttl(DEFAULT_CREDENTIAL_TTL)
	}

	/// Creates a store whose entries expire after `ttl`.
	pub fn with_ttl(ttl: Duration) -> Self {
		Self { map: Default::default(), ttl }
	}

	/// Lifetime applied to entries.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Number of entries currently held, expired or not.
	pub fn len(&self) -> usize {
		self.map.lock().len()
	}

	/// Returns true when no entries are held.
	pub fn is_empty(&self) -> bool {
		self.map.lock().is_empty()
	}

	fn insert_now(&self, token: String, credential: TemporaryCredential) -> Result<(), StoreError> {
		let mut guard = self.map.lock();

		Self::purge_locked(&mut guard, self.ttl, OffsetDateTime::now_utc());
		guard.insert(token, credential);

		Ok(())
	}

	fn record_state_now(&self, token: &str, state: Option<String>) -> bool {
		match self.map.lock().get_mut(token) {
			Some(credential) => {
				credential.state = state;

				true
			},
			None => false,
		}
	}

	fn take_now(&self, token: &str, now: OffsetDateTime) -> Option<TemporaryCredential> {
		let credential = self.map.lock().remove(token)?;

		if credential.is_expired(self.ttl, now) {
			#[cfg(feature = "tracing")]
			tracing::debug!(token, "discarded expired temporary credential");

			return None;
		}

		Some(credential)
	}

	fn purge_locked(
		map: &mut HashMap<String, TemporaryCredential>,
		ttl: Duration,
		now: OffsetDateTime,
	) -> usize {
		let before = map.len();

		map.retain(|_, credential| !credential.is_expired(ttl, now));

		let purged = before - map.len();

		#[cfg(feature = "tracing")]
		if purged > 0 {
			tracing::debug!(purged, "evicted expired temporary credentials");
		}

		purged
	}
}
impl Default for MemoryCredentialStore {
	fn default() -> Self {
		Self::new()
	}
}
impl TemporaryCredentialStore for MemoryCredentialStore {
	fn insert(&self, token: String, credential: TemporaryCredential) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.insert_now(token, credential) })
	}

	fn record_state<'a>(&'a self, token: &'a str, state: Option<String>) -> StoreFuture<'a, bool> {
		Box::pin(async move { Ok(self.record_state_now(token, state)) })
	}

	fn take<'a>(&'a self, token: &'a str) -> StoreFuture<'a, Option<TemporaryCredential>> {
		Box::pin(async move { Ok(self.take_now(token, OffsetDateTime::now_utc())) })
	}

	fn purge_expired(&self, now: OffsetDateTime) -> StoreFuture<'_, usize> {
		Box::pin(async move { Ok(Self::purge_locked(&mut self.map.lock(), self.ttl, now)) })
	}
}
