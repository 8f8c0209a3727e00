//! Scope sets and the per-provider scope specification.

// std
use std::collections::BTreeSet;
// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError, ser::SerializeSeq};
// self
use crate::{_prelude::*, flows::RequestContext};

/// Errors emitted when validating scopes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeValidationError {
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain embedded whitespace characters.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
}

/// Normalized set of OAuth scopes.
///
/// Scopes are deduplicated and sorted lexicographically so the serialized `scope` parameter is
/// stable no matter how the host listed them. Input order is not preserved: `["b", "a"]` is
/// sent as `scope=a%20b`. Providers that give meaning to scope order are not supported.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeSet(Arc<[String]>);
impl ScopeSet {
	/// Creates a normalized scope set from any iterator.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		normalize(scopes).map(Self)
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no scopes are defined.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns true if the normalized set contains the provided scope.
	pub fn contains(&self, scope: &str) -> bool {
		self.0.binary_search_by(|candidate| candidate.as_str().cmp(scope)).is_ok()
	}

	/// Iterator over normalized scopes.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(|s| s.as_str())
	}

	/// Joins the sorted scopes with `delimiter`, returning `None` for an empty set.
	pub fn join(&self, delimiter: char) -> Option<String> {
		if self.is_empty() {
			return None;
		}

		let mut buf = String::new();

		for (idx, value) in self.iter().enumerate() {
			if idx > 0 {
				buf.push(delimiter);
			}

			buf.push_str(value);
		}

		Some(buf)
	}

	/// Returns the underlying slice of scope strings.
	pub fn as_slice(&self) -> &[String] {
		&self.0
	}
}
impl Debug for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeSet").field(&self.0).finish()
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0.join(" "))
	}
}
impl TryFrom<Vec<String>> for ScopeSet {
	type Error = ScopeValidationError;

	fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for ScopeSet {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Ok(Self::default());
		}
		if s.chars().all(char::is_whitespace) {
			return Err(ScopeValidationError::Empty);
		}

		Self::new(s.split_whitespace())
	}
}
impl Serialize for ScopeSet {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut seq = serializer.serialize_seq(Some(self.0.len()))?;

		for scope in self.0.iter() {
			seq.serialize_element(scope)?;
		}

		seq.end()
	}
}
impl<'de> Deserialize<'de> for ScopeSet {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let values = <Vec<String>>::deserialize(deserializer)?;

		ScopeSet::new(values).map_err(DeError::custom)
	}
}

/// Host callback that computes scopes per authorization request.
pub type ComputeScopes = dyn Fn(&str, &RequestContext) -> Vec<String> + Send + Sync;

/// Where a provider's scopes come from.
///
/// Evaluated once per authorization request. Both variants yield a [`ScopeSet`], so computed
/// scopes are deduplicated and sorted the same way as fixed ones.
#[derive(Clone)]
pub enum ScopeSpec {
	/// Static scope list configured with the provider.
	Fixed(ScopeSet),
	/// Scopes computed from the provider name and the inbound request.
	Computed(Arc<ComputeScopes>),
}
impl ScopeSpec {
	/// Wraps a closure as a computed scope specification.
	pub fn computed<F>(f: F) -> Self
	where
		F: 'static + Fn(&str, &RequestContext) -> Vec<String> + Send + Sync,
	{
		Self::Computed(Arc::new(f))
	}

	/// Resolves the scope set for one authorization request.
	pub fn evaluate(
		&self,
		provider: &str,
		ctx: &RequestContext,
	) -> Result<ScopeSet, ScopeValidationError> {
		match self {
			Self::Fixed(scopes) => Ok(scopes.clone()),
			Self::Computed(compute) => ScopeSet::new(compute(provider, ctx)),
		}
	}
}
impl Default for ScopeSpec {
	fn default() -> Self {
		Self::Fixed(ScopeSet::default())
	}
}
impl From<ScopeSet> for ScopeSpec {
	fn from(value: ScopeSet) -> Self {
		Self::Fixed(value)
	}
}
impl Debug for ScopeSpec {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Fixed(scopes) => f.debug_tuple("Fixed").field(scopes).finish(),
			Self::Computed(_) => f.write_str("Computed(..)"),
		}
	}
}

fn normalize<I, S>(scopes: I) -> Result<Arc<[String]>, ScopeValidationError>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let mut set = BTreeSet::new();

	for scope in scopes {
		let owned: String = scope.into();

		if owned.is_empty() {
			return Err(ScopeValidationError::Empty);
		}
		if owned.chars().any(char::is_whitespace) {
			return Err(ScopeValidationError::ContainsWhitespace { scope: owned });
		}

		set.insert(owned);
	}

	Ok(Arc::from(set.into_iter().collect::<Vec<_>>()))
}
