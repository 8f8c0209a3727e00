// std
use std::iter::IntoIterator;
// self
use crate::{
	_prelude::*,
	auth::{ProviderId, ScopeSet, ScopeSpec, TokenSecret},
	error::ConfigError,
	provider::{BodyEncoding, ProviderDescriptor, ProviderEndpoints},
};

const RESERVED_QUERY_PARAMS: [&str; 3] = ["response_type", "client_id", "redirect_uri"];

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderDescriptorError {
	/// Authorization endpoint is mandatory.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is mandatory.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Client identifier is mandatory.
	#[error("Missing client identifier.")]
	MissingClientId,
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Static query extras cannot shadow the parameters the engine always sets.
	#[error("Query parameter `{name}` is reserved.")]
	ReservedQueryParameter {
		/// Offending parameter name.
		name: String,
	},
	/// Reject scope delimiters that are control characters.
	#[error("Scope delimiter must be a printable character.")]
	InvalidScopeDelimiter {
		/// Invalid delimiter that was supplied.
		delimiter: char,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProviderId,
	/// Client identifier issued by the provider.
	pub client_id: Option<String>,
	/// Client secret issued by the provider.
	pub client_secret: TokenSecret,
	/// Consent screen endpoint.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint used for exchanges and refreshes.
	pub token_endpoint: Option<Url>,
	/// Optional profile endpoint.
	pub profile_endpoint: Option<Url>,
	/// Scope specification.
	pub scopes: ScopeSpec,
	/// Static authorization query extras.
	pub query: BTreeMap<String, String>,
	/// Token request body encoding.
	pub encoding: BodyEncoding,
	/// Scope delimiter.
	pub scope_delimiter: char,
	/// JSON pointer to the profile's unique id.
	pub profile_id_pointer: Option<String>,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			client_id: None,
			client_secret: TokenSecret::new(""),
			authorization_endpoint: None,
			token_endpoint: None,
			profile_endpoint: None,
			scopes: ScopeSpec::default(),
			query: BTreeMap::new(),
			encoding: BodyEncoding::default(),
			scope_delimiter: ' ',
			profile_id_pointer: None,
		}
	}

	/// Sets the client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
		self.client_secret = TokenSecret::new(client_secret);

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the optional profile endpoint.
	pub fn profile_endpoint(mut self, url: Url) -> Self {
		self.profile_endpoint = Some(url);

		self
	}

	/// Sets the scope specification.
	pub fn scopes(mut self, scopes: impl Into<ScopeSpec>) -> Self {
		self.scopes = scopes.into();

		self
	}

	/// Adds one static authorization query parameter.
	pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.insert(key.into(), value.into());

		self
	}

	/// Adds multiple static authorization query parameters.
	pub fn query_params<I, K, V>(mut self, params: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		for (key, value) in params.into_iter() {
			self.query.insert(key.into(), value.into());
		}

		self
	}

	/// Overrides the token request body encoding.
	pub fn encoding(mut self, encoding: BodyEncoding) -> Self {
		self.encoding = encoding;

		self
	}

	/// Overrides the scope delimiter.
	pub fn scope_delimiter(mut self, delimiter: char) -> Self {
		self.scope_delimiter = delimiter;

		self
	}

	/// Sets the JSON pointer used to pull the unique id out of profile payloads.
	pub fn profile_id_pointer(mut self, pointer: impl Into<String>) -> Self {
		self.profile_id_pointer = Some(pointer.into());

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let authorization = self
			.authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingAuthorizationEndpoint)?;
		let token = self.token_endpoint.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?;
		let client_id = self
			.client_id
			.filter(|value| !value.is_empty())
			.ok_or(ProviderDescriptorError::MissingClientId)?;
		let descriptor = ProviderDescriptor {
			id: self.id,
			client_id,
			client_secret: self.client_secret,
			endpoints: ProviderEndpoints { authorization, token, profile: self.profile_endpoint },
			scopes: self.scopes,
			query: self.query,
			encoding: self.encoding,
			scope_delimiter: self.scope_delimiter,
			profile_id_pointer: self.profile_id_pointer,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		validate_endpoint("authorization", &self.endpoints.authorization)?;
		validate_endpoint("token", &self.endpoints.token)?;

		if let Some(profile) = self.endpoints.profile.as_ref() {
			validate_endpoint("profile", profile)?;
		}
		if let Some(name) =
			self.query.keys().find(|key| RESERVED_QUERY_PARAMS.contains(&key.as_str()))
		{
			return Err(ProviderDescriptorError::ReservedQueryParameter { name: name.to_owned() });
		}
		if self.scope_delimiter.is_control() {
			return Err(ProviderDescriptorError::InvalidScopeDelimiter {
				delimiter: self.scope_delimiter,
			});
		}

		Ok(())
	}
}

/// Serde-friendly provider configuration for hosts that load providers from files.
#[derive(Clone, Debug, Deserialize)]
pub struct ProviderSettings {
	/// Provider name.
	pub name: ProviderId,
	/// Client identifier.
	pub client_id: String,
	/// Client secret.
	#[serde(default)]
	pub client_secret: Option<String>,
	/// Consent screen endpoint.
	pub auth_url: Url,
	/// Token endpoint.
	pub token_url: Url,
	/// Optional profile endpoint.
	#[serde(default)]
	pub profile_url: Option<Url>,
	/// JSON pointer to the profile's unique id.
	#[serde(default)]
	pub profile_id_pointer: Option<String>,
	/// Fixed scope list.
	#[serde(default)]
	pub scopes: ScopeSet,
	/// Static authorization query extras.
	#[serde(default)]
	pub query: BTreeMap<String, String>,
	/// Token request body encoding.
	#[serde(default)]
	pub encoding: BodyEncoding,
}
impl TryFrom<ProviderSettings> for ProviderDescriptor {
	type Error = ConfigError;

	fn try_from(settings: ProviderSettings) -> Result<Self, Self::Error> {
		let mut builder = ProviderDescriptor::builder(settings.name)
			.client_id(settings.client_id)
			.client_secret(settings.client_secret.unwrap_or_default())
			.authorization_endpoint(settings.auth_url)
			.token_endpoint(settings.token_url)
			.scopes(settings.scopes)
			.query_params(settings.query)
			.encoding(settings.encoding);

		if let Some(profile) = settings.profile_url {
			builder = builder.profile_endpoint(profile);
		}
		if let Some(pointer) = settings.profile_id_pointer {
			builder = builder.profile_id_pointer(pointer);
		}

		Ok(builder.build()?)
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	let loopback = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));

	match url.scheme() {
		"https" => Ok(()),
		"http" if loopback => Ok(()),
		_ =>
			Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() }),
	}
}
