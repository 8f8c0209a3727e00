//! Provider names.

// std
use std::borrow::Borrow;
// self
use crate::_prelude::*;

const PROVIDER_ID_MAX_LEN: usize = 64;

/// Error returned when a provider name fails validation.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// The name was empty.
	#[error("Provider name cannot be empty.")]
	Empty,
	/// The name contains a character that is not safe inside a URL path segment.
	#[error("Provider name contains the unsupported character {ch:?}.")]
	InvalidCharacter {
		/// First offending character.
		ch: char,
	},
	/// The name exceeded the allowed length.
	#[error("Provider name exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted length.
		max: usize,
	},
}

/// Provider name used in redirect URIs, route paths, and host hooks.
///
/// Names are restricted to ASCII letters, digits, `-`, `_`, and `.` so they can be embedded in
/// `/oauth/{name}` without escaping.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderId(String);
impl ProviderId {
	/// Validates and wraps a provider name.
	pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
		let value = value.into();

		validate(&value)?;

		Ok(Self(value))
	}

	/// Borrowed name.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for ProviderId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for ProviderId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<ProviderId> for String {
	fn from(value: ProviderId) -> Self {
		value.0
	}
}
impl TryFrom<String> for ProviderId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for ProviderId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for ProviderId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Provider({})", self.0)
	}
}
impl Display for ProviderId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate(value: &str) -> Result<(), IdentifierError> {
	if value.is_empty() {
		return Err(IdentifierError::Empty);
	}
	if let Some(ch) =
		value.chars().find(|ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.')))
	{
		return Err(IdentifierError::InvalidCharacter { ch });
	}
	if value.len() > PROVIDER_ID_MAX_LEN {
		return Err(IdentifierError::TooLong { max: PROVIDER_ID_MAX_LEN });
	}

	Ok(())
}
