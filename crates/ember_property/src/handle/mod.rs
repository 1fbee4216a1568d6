//! Lockable access to an owner's storage bytes.
//!
//! A [`PropertyHandle`] pairs an owner's metadata ([`PropertyApi`]) with the
//! bytes its properties live in. Access to the bytes goes through guards:
//! [`rlock`](PropertyHandle::rlock) hands out shared read access,
//! [`wlock`](PropertyHandle::wlock) exclusive write access, and dropping
//! the guard releases the lock. One writer or any number of readers, never
//! both, is up to the implementation to enforce.
//!
//! [`PropertyStorage`] is the reference implementation, backed by a
//! reader/writer lock over a byte buffer.

// -----------------------------------------------------------------------------
// Modules

mod storage;

// -----------------------------------------------------------------------------
// Exports

pub use storage::PropertyStorage;
pub(crate) use storage::{read_bytes, write_bytes};

use alloc::boxed::Box;
use core::ops::{Deref, DerefMut};

use crate::metadata::PropertyApi;

// -----------------------------------------------------------------------------
// PropertyHandle

/// Shared read access to a handle's bytes. Dropping it releases the lock.
pub type ReadLock<'a> = Box<dyn Deref<Target = [u8]> + 'a>;

/// Exclusive write access to a handle's bytes. Dropping it releases the lock.
pub type WriteLock<'a> = Box<dyn DerefMut<Target = [u8]> + 'a>;

/// The lockable accessor to an owner's storage.
///
/// Property offsets resolved against [`owner`](Self::owner)'s metadata are
/// byte offsets into the locked slice.
pub trait PropertyHandle: Send + Sync {
    /// The metadata provider describing the bytes.
    fn owner(&self) -> &dyn PropertyApi;

    /// Number of storage bytes.
    fn size(&self) -> usize;

    /// Acquires shared read access, blocking while a writer holds the lock.
    ///
    /// `None` when the storage cannot be locked at all.
    fn rlock(&self) -> Option<ReadLock<'_>>;

    /// Acquires exclusive write access, blocking while the lock is held.
    ///
    /// `None` when the storage cannot be locked at all.
    fn wlock(&self) -> Option<WriteLock<'_>>;
}
