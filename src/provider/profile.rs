//! Provider profiles returned after a successful link.

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, auth::ProviderId};

/// Raw provider profile plus the unique id located inside it.
///
/// Field-level schemas stay with the host; the engine only knows where the id lives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderProfile {
	/// Provider that issued the profile.
	pub provider: ProviderId,
	/// Unique user id, when the descriptor names a pointer and the payload carries it.
	pub id: Option<String>,
	/// Unparsed profile payload.
	pub raw: Value,
}
impl ProviderProfile {
	/// Wraps a profile payload, extracting the id through an optional JSON pointer.
	pub fn from_json(provider: ProviderId, raw: Value, id_pointer: Option<&str>) -> Self {
		let id = id_pointer.and_then(|pointer| raw.pointer(pointer)).and_then(|value| match value {
			Value::String(s) => Some(s.clone()),
			Value::Number(n) => Some(n.to_string()),
			_ => None,
		});

		Self { provider, id, raw }
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn nested_numeric_ids_are_stringified() {
		let provider = ProviderId::new("picarto").expect("Provider fixture should be valid.");
		let profile = ProviderProfile::from_json(
			provider,
			json!({ "channel_details": { "user_id": 42 } }),
			Some("/channel_details/user_id"),
		);

		assert_eq!(profile.id.as_deref(), Some("42"));
	}

	#[test]
	fn missing_pointer_leaves_id_empty() {
		let provider = ProviderId::new("google").expect("Provider fixture should be valid.");
		let profile = ProviderProfile::from_json(provider, json!({ "id": "abc" }), None);

		assert_eq!(profile.id, None);
		assert_eq!(profile.raw["id"], "abc");
	}
}
