// self
use crate::_prelude::*;

/// Serialization applied to outbound token request bodies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyEncoding {
	/// Compact JSON object.
	#[default]
	Json,
	/// `application/x-www-form-urlencoded` pairs.
	FormUrlencoded,
}
impl BodyEncoding {
	/// Returns the `Content-Type` header value matching the encoding.
	pub const fn content_type(self) -> &'static str {
		match self {
			BodyEncoding::Json => "application/json",
			BodyEncoding::FormUrlencoded => "application/x-www-form-urlencoded",
		}
	}
}
impl Display for BodyEncoding {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.content_type())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn encodings_deserialize_from_snake_case() {
		let form: BodyEncoding = serde_json::from_str("\"form_urlencoded\"")
			.expect("Form encoding label should deserialize.");

		assert_eq!(form, BodyEncoding::FormUrlencoded);
		assert_eq!(form.content_type(), "application/x-www-form-urlencoded");
		assert_eq!(BodyEncoding::default().content_type(), "application/json");
	}
}
