//! Errors raised while turning a raw reference into a URI.

/// A reference that is present in the document but cannot be resolved.
///
/// These never escape a scan: the link is still reported, without a target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    /// A `%` not followed by two hex digits.
    #[error("malformed percent-encoding at byte {offset} in `{reference}`")]
    MalformedPercentEncoding {
        /// The offending reference.
        reference: String,
        /// Byte offset of the `%`.
        offset: usize,
    },

    /// An ASCII control character inside the reference.
    #[error("control character at byte {offset} in `{reference}`")]
    ControlCharacter {
        /// The offending reference.
        reference: String,
        /// Byte offset of the control character.
        offset: usize,
    },
}
