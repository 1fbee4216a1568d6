use alloc::string::String;

use thiserror::Error;

/// Why a property path failed to resolve.
///
/// Malformed paths and unknown names are equally "invalid" to callers of
/// [`resolve`](super::resolve); the distinction only serves diagnostics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResolveError {
    #[error("empty path segment at byte {at}")]
    EmptySegment { at: usize },

    #[error("no property named `{name}`")]
    NotFound { name: String },

    #[error("path ends with a dangling `.`")]
    DanglingDot,

    #[error("malformed index at byte {at}")]
    MalformedIndex { at: usize },

    #[error("property `{name}` is neither an array nor a container")]
    NotIndexable { name: String },

    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unexpected characters after index at byte {at}")]
    TrailingCharacters { at: usize },
}
