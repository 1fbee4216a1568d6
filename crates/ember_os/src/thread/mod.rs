//! Thread identity helpers.
//!
//! Events record which thread is currently invoking them; this module gives
//! that identity a stable name.

pub use std::thread::{ThreadId, sleep, spawn};

/// Returns the [`ThreadId`] of the calling thread.
///
/// # Examples
///
/// ```
/// use ember_os::thread::current_id;
///
/// assert_eq!(current_id(), current_id());
/// ```
#[inline]
pub fn current_id() -> ThreadId {
    std::thread::current().id()
}
