//! JSON body helpers.

use bytes::Bytes;

use crate::Result;

/// Encode an outgoing document.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use seagull_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Profile { #[serde(rename = "fullName")] full_name: String }
///
/// let profile = Profile { full_name: "Jane Doe".to_string() };
/// let bytes = to_json(&profile).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"fullName":"Jane Doe"}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Decode a document, reporting where decoding stopped.
///
/// Uses `serde_path_to_error` so the error names the field that failed
/// (e.g. `patient.birthday`).
///
/// # Errors
///
/// Returns an error if JSON deserialization fails.
///
/// # Example
///
/// ```
/// use seagull_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct Profile { #[serde(rename = "fullName")] full_name: String }
///
/// let bytes = br#"{"fullName":"Jane Doe"}"#;
/// let profile: Profile = from_json(bytes).expect("deserialize");
/// assert_eq!(profile, Profile { full_name: "Jane Doe".to_string() });
/// ```
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}
