//! Provide atomic types.
//!
//! Platforms without atomic pointers are not supported, since
//! `Arc` requires them.
//!
//! See the [standard library] for further details.
//!
//! [standard library]: https://doc.rust-lang.org/core/sync/atomic

pub use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize};
pub use core::sync::atomic::{Ordering, fence};

#[cfg(not(target_has_atomic = "ptr"))]
compile_error!("Platforms without atomic pointers are currently not supported.");
