use alloc::string::String;

use thiserror::Error;

use crate::any::AnyError;
use crate::path::ResolveError;

/// A failed lock or typed access through [`PropertyData`](super::PropertyData).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PropertyError {
    #[error("property data is already locked")]
    Locked,

    #[error("the handle refused the lock")]
    LockFailed,

    #[error("property data is not locked")]
    NotLocked,

    #[error("property data is only read-locked")]
    NotWritable,

    #[error("property `{name}` is read-only")]
    ReadOnly { name: String },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("bytes {start}..{end} are outside the {size}-byte storage")]
    OutOfBounds {
        start: usize,
        end: usize,
        size: usize,
    },

    #[error("property `{name}` has no type-erased form")]
    NoBridge { name: String },

    #[error(transparent)]
    Any(#[from] AnyError),
}
