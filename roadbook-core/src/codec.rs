//! Day-plan blob codec.
//!
//! The persisted representation of a day plan is an opaque byte blob
//! holding UTF-8 JSON of `{points, routes}`. Nothing outside this module
//! reasons about the blob format, and a malformed blob never propagates a
//! failure past the decode boundary: the editor opens with an empty plan
//! and a logged warning instead of crashing.

use thiserror::Error;

use crate::plan::PlanBody;

/// A persisted blob could not be decoded.
///
/// Raised for logging and UI warnings only; the decode call still returns
/// an empty plan body.
#[derive(Debug, Error)]
#[error("malformed day-plan blob: {0}")]
pub struct ParseError(#[from] serde_json::Error);

/// Result of decoding a persisted blob.
#[derive(Debug)]
pub struct DecodedPlan {
    /// The decoded body, empty when the blob was malformed.
    pub body: PlanBody,
    /// The non-fatal parse failure, if any.
    pub warning: Option<ParseError>,
}

/// Serialize a plan body to UTF-8 JSON bytes.
pub fn encode(body: &PlanBody) -> Result<Vec<u8>, ParseError> {
    Ok(serde_json::to_vec(body)?)
}

/// Decode a persisted blob.
///
/// Truncated, non-UTF-8, or otherwise malformed input yields an empty body
/// alongside a [`ParseError`] for the caller to surface; the failure never
/// escapes this call.
///
/// # Examples
/// ```
/// use roadbook_core::codec;
///
/// let decoded = codec::decode(b"not json at all");
/// assert!(decoded.body.is_empty());
/// assert!(decoded.warning.is_some());
/// ```
#[must_use]
pub fn decode(bytes: &[u8]) -> DecodedPlan {
    match serde_json::from_slice::<PlanBody>(bytes) {
        Ok(body) => DecodedPlan {
            body,
            warning: None,
        },
        Err(err) => {
            log::warn!("failed to decode day-plan blob: {err}");
            DecodedPlan {
                body: PlanBody::default(),
                warning: Some(ParseError(err)),
            }
        }
    }
}
