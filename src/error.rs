//! Engine-level error types shared across flows, providers, and the credential store.

// self
use crate::_prelude::*;

/// Engine-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical engine error handed to the host's error hook.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS) while calling a provider endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The callback reported a user-facing authorization failure.
	#[error(transparent)]
	Code(#[from] CodeError),
	/// The pre-authorization hook rejected the request.
	#[error(transparent)]
	Hook(#[from] HookError),
	/// Temporary credential store failure.
	#[error(transparent)]
	Storage(#[from] crate::store::StoreError),

	/// Provider answered with an HTTP status outside `200..300`.
	#[error("Provider endpoint returned unexpected HTTP status {status}.")]
	UnexpectedStatus {
		/// HTTP status code returned by the provider.
		status: u16,
		/// Truncated response body, when one was returned.
		body: Option<String>,
	},
	/// Provider signalled a logical failure through an `error` field in its response body.
	#[error("Provider rejected the token request: {}.", provider_reason(.error, .description))]
	ProviderToken {
		/// Provider-supplied `error` code.
		error: String,
		/// Provider-supplied `error_description`, if any.
		description: Option<String>,
	},
	/// Provider returned a success status with a body that is not a valid token payload.
	#[error("Provider returned a malformed token response.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// OAuth 1.0a credential response lacked a required field.
	#[error("Provider credential response is missing `{field}`.")]
	CredentialResponse {
		/// Missing form field.
		field: &'static str,
	},
	/// No temporary credential exists for the token carried by the callback.
	#[error("Request data missing for the returned request token.")]
	RequestDataMissing,
	/// The OAuth1 temporary credential could not be obtained.
	#[error("Failed to obtain a request token.")]
	RequestToken {
		/// Underlying failure.
		#[source]
		source: Box<Error>,
	},
	/// The provider strategy does not implement profile retrieval.
	#[error("Provider `{provider}` does not implement profile retrieval.")]
	ProfileNotImplemented {
		/// Provider name.
		provider: String,
	},
}
impl Error {
	/// Wraps a failed temporary-credential request.
	pub fn request_token(source: Error) -> Self {
		Self::RequestToken { source: Box::new(source) }
	}
}

fn provider_reason<'a>(error: &'a str, description: &'a Option<String>) -> &'a str {
	description.as_deref().unwrap_or(error)
}

/// Callback-level failures detected before any token exchange happens.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CodeError {
	/// The user declined the authorization request.
	#[error("User denied the authorization request.")]
	Denied {
		/// Provider-supplied description, if any.
		description: Option<String>,
	},
	/// The callback did not carry an authorization code.
	#[error("Authorization callback is missing the code.")]
	Missing,
	/// The callback carried an error code that is not a denial.
	#[error("Authorization callback returned error `{error}`.")]
	Unknown {
		/// Provider-supplied `error` value.
		error: String,
		/// Provider-supplied description, if any.
		description: Option<String>,
	},
}

/// Rejection raised by the host's pre-authorization hook.
#[derive(Debug, ThisError)]
#[error("Pre-authorization hook rejected the request: {message}.")]
pub struct HookError {
	/// Host-supplied reason.
	pub message: String,
	/// Underlying host failure, if any.
	#[source]
	pub source: Option<BoxError>,
}
impl HookError {
	/// Creates a rejection carrying only a message.
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into(), source: None }
	}

	/// Creates a rejection that wraps a host error.
	pub fn with_source(
		message: impl Into<String>,
		source: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self { message: message.into(), source: Some(Box::new(source)) }
	}
}

/// Configuration and validation failures raised by the engine.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A configured endpoint or redirect URI is invalid.
	#[error("The {field} URL is invalid.")]
	InvalidUrl {
		/// Which URL failed validation.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Provider identifier failed validation.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Provider descriptor failed validation.
	#[error(transparent)]
	InvalidDescriptor(#[from] crate::provider::ProviderDescriptorError),
	/// Request scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Payload could not be serialized for the configured body encoding.
	#[error("Token request body could not be serialized.")]
	BodySerialization(#[from] serde_json::Error),

	/// OAuth 1.0a signing key was rejected by the MAC implementation.
	#[error("OAuth 1.0a signing key is invalid.")]
	InvalidSigningKey,

	/// Provider does not support the requested grant.
	#[error("Provider `{provider}` does not support the {grant} grant.")]
	UnsupportedGrant {
		/// Provider name.
		provider: String,
		/// Grant label.
		grant: &'static str,
	},
	/// Registry has no provider with the requested name.
	#[error("No provider named `{provider}` is registered.")]
	UnknownProvider {
		/// Requested provider name.
		provider: String,
	},
	/// Registry already holds a provider with this name.
	#[error("Provider `{provider}` is already registered.")]
	DuplicateProvider {
		/// Conflicting provider name.
		provider: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
