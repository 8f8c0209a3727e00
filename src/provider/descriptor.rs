//! Provider descriptor data structures shared by all flows.
//!
//! The module exposes the validated configuration, its builder, serde-friendly settings for
//! hosts that load providers from files, and the token request body encoding.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Token request body encodings.
pub mod encoding;

pub use builder::*;
pub use encoding::*;

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, ScopeSpec, TokenSecret},
};

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Consent screen the user is redirected to.
	pub authorization: Url,
	/// Token endpoint used for code exchanges and refreshes (OAuth1: access-token endpoint).
	pub token: Url,
	/// Optional profile endpoint queried after a successful link.
	pub profile: Option<Url>,
}

/// Immutable provider configuration consumed by flows.
#[derive(Clone, Debug)]
pub struct ProviderDescriptor {
	/// Provider name.
	pub id: ProviderId,
	/// Client identifier issued by the provider.
	pub client_id: String,
	/// Client secret issued by the provider.
	pub client_secret: TokenSecret,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Scope specification evaluated once per authorization request.
	pub scopes: ScopeSpec,
	/// Static query parameters appended to every authorization request.
	pub query: BTreeMap<String, String>,
	/// Body encoding used for token requests.
	pub encoding: BodyEncoding,
	/// Character used to join scopes in the `scope` parameter.
	pub scope_delimiter: char,
	/// JSON pointer locating the user's unique id inside the profile payload.
	pub profile_id_pointer: Option<String>,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}

	/// Provider name as used in redirect URIs and route paths.
	pub fn name(&self) -> &str {
		self.id.as_str()
	}
}
