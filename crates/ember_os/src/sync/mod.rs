//! Useful synchronization primitives.
//!
//! This module re-exports the standard library's `sync` contents so that
//! the rest of the workspace names a single path for them.
//!
//! Poisoning is surfaced unchanged; callers that cannot recover from a
//! poisoned lock should treat it as a failed acquisition.
//!
//! See the [standard library] for further details.
//!
//! [standard library]: https://doc.rust-lang.org/std/sync/index.html

// -----------------------------------------------------------------------------
// Modules

pub mod atomic;

// -----------------------------------------------------------------------------
// Exports

pub use alloc::sync::{Arc, Weak};

pub use std::sync::{
    LazyLock, LockResult, Mutex, MutexGuard, OnceLock, PoisonError, RwLock, RwLockReadGuard,
    RwLockWriteGuard, TryLockError, TryLockResult,
};
