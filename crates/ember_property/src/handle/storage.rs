use alloc::boxed::Box;
use alloc::vec;
use core::fmt;
use core::ops::{Deref, DerefMut};

use bytemuck::Pod;
use ember_os::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::handle::{PropertyHandle, ReadLock, WriteLock};
use crate::metadata::PropertyApi;

// -----------------------------------------------------------------------------
// Guards

struct ReadBytes<'a>(RwLockReadGuard<'a, Box<[u8]>>);

impl Deref for ReadBytes<'_> {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

struct WriteBytes<'a>(RwLockWriteGuard<'a, Box<[u8]>>);

impl Deref for WriteBytes<'_> {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl DerefMut for WriteBytes<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

/// Read-locks a byte buffer, logging a poisoned lock as an error.
pub(crate) fn read_bytes<'a>(bytes: &'a RwLock<Box<[u8]>>, owner: &str) -> Option<ReadLock<'a>> {
    match bytes.read() {
        Ok(guard) => Some(Box::new(ReadBytes(guard))),
        Err(_) => {
            log::error!("storage of `{owner}` is poisoned");
            None
        }
    }
}

/// Write-locks a byte buffer, logging a poisoned lock as an error.
pub(crate) fn write_bytes<'a>(bytes: &'a RwLock<Box<[u8]>>, owner: &str) -> Option<WriteLock<'a>> {
    match bytes.write() {
        Ok(guard) => Some(Box::new(WriteBytes(guard))),
        Err(_) => {
            log::error!("storage of `{owner}` is poisoned");
            None
        }
    }
}

// -----------------------------------------------------------------------------
// PropertyStorage

/// A [`PropertyHandle`] over an owned byte buffer guarded by a [`RwLock`].
///
/// The buffer never changes size, so [`size`](PropertyHandle::size) does
/// not take the lock.
///
/// A poisoned lock is reported through `log::error!` and treated as a
/// failed acquisition.
///
/// # Examples
///
/// ```
/// use ember_os::sync::Arc;
/// use ember_property::handle::{PropertyHandle, PropertyStorage};
/// use ember_property::metadata::{Property, StaticProperties};
///
/// static TABLE: [Property; 0] = [];
///
/// let storage = PropertyStorage::from_pod(
///     Arc::new(StaticProperties::new("Counter", &TABLE)),
///     7u32,
/// );
/// assert_eq!(storage.size(), 4);
///
/// storage.write_as::<u32>(8);
/// assert_eq!(storage.read_as::<u32>(), Some(8));
/// ```
pub struct PropertyStorage {
    owner: Arc<dyn PropertyApi>,
    size: usize,
    bytes: RwLock<Box<[u8]>>,
}

impl PropertyStorage {
    /// Wraps `bytes` described by `owner`.
    pub fn new(owner: Arc<dyn PropertyApi>, bytes: impl Into<Box<[u8]>>) -> Self {
        let bytes = bytes.into();
        Self {
            owner,
            size: bytes.len(),
            bytes: RwLock::new(bytes),
        }
    }

    /// Allocates `size` zeroed bytes described by `owner`.
    pub fn zeroed(owner: Arc<dyn PropertyApi>, size: usize) -> Self {
        Self::new(owner, vec![0u8; size])
    }

    /// Copies the bytes of `value` into a new storage described by `owner`.
    pub fn from_pod<T: Pod>(owner: Arc<dyn PropertyApi>, value: T) -> Self {
        Self::new(owner, bytemuck::bytes_of(&value))
    }

    /// Shared owner metadata.
    #[inline]
    pub fn owner_arc(&self) -> &Arc<dyn PropertyApi> {
        &self.owner
    }

    /// Reads the whole storage as a `T`.
    ///
    /// `None` when the sizes differ or the lock is poisoned.
    pub fn read_as<T: Pod>(&self) -> Option<T> {
        let bytes = self.rlock()?;
        if bytes.len() != size_of::<T>() {
            return None;
        }
        Some(bytemuck::pod_read_unaligned(&bytes))
    }

    /// Overwrites the whole storage with `value`.
    ///
    /// Returns `false` when the sizes differ or the lock is poisoned.
    pub fn write_as<T: Pod>(&self, value: T) -> bool {
        let Some(mut bytes) = self.wlock() else {
            return false;
        };
        if bytes.len() != size_of::<T>() {
            return false;
        }
        bytes.copy_from_slice(bytemuck::bytes_of(&value));
        true
    }
}

impl PropertyHandle for PropertyStorage {
    #[inline]
    fn owner(&self) -> &dyn PropertyApi {
        &*self.owner
    }

    #[inline]
    fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn rlock(&self) -> Option<ReadLock<'_>> {
        read_bytes(&self.bytes, self.owner.type_name())
    }

    #[inline]
    fn wlock(&self) -> Option<WriteLock<'_>> {
        write_bytes(&self.bytes, self.owner.type_name())
    }
}

impl fmt::Debug for PropertyStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyStorage")
            .field("owner", &self.owner.type_name())
            .field("size", &self.size())
            .finish()
    }
}
