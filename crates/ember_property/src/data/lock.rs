use core::fmt;

use crate::data::{PropertyError, PropertyValue, PropertyValueMut};
use crate::handle::{PropertyHandle, ReadLock, WriteLock};
use crate::metadata::{Property, PropertyApi};
use crate::path::{PropertyOffset, resolve, try_resolve};

// -----------------------------------------------------------------------------
// LockState

enum LockState<'h> {
    Unlocked,
    Read {
        handle: &'h dyn PropertyHandle,
        data: ReadLock<'h>,
    },
    Write {
        handle: &'h dyn PropertyHandle,
        data: WriteLock<'h>,
    },
}

#[inline]
fn same_handle(a: &dyn PropertyHandle, b: &dyn PropertyHandle) -> bool {
    core::ptr::addr_eq(a as *const dyn PropertyHandle, b as *const dyn PropertyHandle)
}

// -----------------------------------------------------------------------------
// PropertyData

/// Holds the read or write lock of one [`PropertyHandle`] at a time and
/// resolves property paths against the locked storage.
///
/// Lock and unlock calls must be balanced: locking an already locked
/// instance fails without touching the held lock, and unlocking only
/// succeeds with the very handle (by identity) that was locked. Misuse is
/// logged with `log::warn!` and reported as `false`.
///
/// Dropping a locked instance releases the lock.
///
/// # Examples
///
/// ```
/// use ember_os::sync::Arc;
/// use ember_property::PropertyData;
/// use ember_property::handle::PropertyStorage;
/// use ember_property::metadata::{Property, StaticProperties};
/// use ember_os::sync::LazyLock;
///
/// static TABLE: LazyLock<[Property; 1]> =
///     LazyLock::new(|| [Property::scalar::<u32>("frame", 0)]);
///
/// let storage = PropertyStorage::zeroed(
///     Arc::new(StaticProperties::new("Clock", &LazyLock::force(&TABLE)[..])),
///     4,
/// );
///
/// let mut data = PropertyData::new();
/// assert!(data.rlock(&storage));
/// assert!(!data.wlock(&storage));
/// assert_eq!(data.property_count(), 1);
///
/// let frame = data.find_property("frame").unwrap();
/// assert_eq!(data.value(&frame).unwrap().get::<u32>(), Ok(0));
///
/// assert!(!data.wunlock(&storage));
/// assert!(data.runlock(&storage));
/// assert!(!data.is_locked());
/// ```
pub struct PropertyData<'h> {
    state: LockState<'h>,
    owner: Option<&'h dyn PropertyApi>,
    size: usize,
}

impl Default for PropertyData<'_> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<'h> PropertyData<'h> {
    /// An unlocked instance.
    #[inline]
    pub const fn new() -> Self {
        Self {
            state: LockState::Unlocked,
            owner: None,
            size: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Locking

    /// Takes the write lock of `handle`, reporting why it failed.
    pub fn try_wlock(&mut self, handle: &'h dyn PropertyHandle) -> Result<(), PropertyError> {
        if self.is_locked() {
            return Err(PropertyError::Locked);
        }
        let data = handle.wlock().ok_or(PropertyError::LockFailed)?;
        self.owner = Some(handle.owner());
        self.size = handle.size();
        self.state = LockState::Write { handle, data };
        Ok(())
    }

    /// Takes the read lock of `handle`, reporting why it failed.
    pub fn try_rlock(&mut self, handle: &'h dyn PropertyHandle) -> Result<(), PropertyError> {
        if self.is_locked() {
            return Err(PropertyError::Locked);
        }
        let data = handle.rlock().ok_or(PropertyError::LockFailed)?;
        self.owner = Some(handle.owner());
        self.size = handle.size();
        self.state = LockState::Read { handle, data };
        Ok(())
    }

    /// Takes the write lock of `handle`.
    ///
    /// Fails without any change when this instance is already locked.
    pub fn wlock(&mut self, handle: &'h dyn PropertyHandle) -> bool {
        match self.try_wlock(handle) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("PropertyData::wlock: {err}");
                false
            }
        }
    }

    /// Takes the read lock of `handle`.
    ///
    /// Fails without any change when this instance is already locked.
    pub fn rlock(&mut self, handle: &'h dyn PropertyHandle) -> bool {
        match self.try_rlock(handle) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("PropertyData::rlock: {err}");
                false
            }
        }
    }

    /// Takes the write lock of `handle` and resolves `path` in it.
    ///
    /// When the path does not resolve the lock is released again, so a
    /// `None` result never leaves the instance locked by this call.
    pub fn wlock_path(
        &mut self,
        handle: &'h dyn PropertyHandle,
        path: &str,
    ) -> Option<PropertyOffset<'h>> {
        if !self.wlock(handle) {
            return None;
        }
        match self.try_find_property(path) {
            Ok(offset) => Some(offset),
            Err(err) => {
                log::debug!("`{path}` does not resolve: {err}");
                self.wunlock(handle);
                None
            }
        }
    }

    /// Takes the read lock of `handle` and resolves `path` in it.
    ///
    /// See [`wlock_path`](Self::wlock_path).
    pub fn rlock_path(
        &mut self,
        handle: &'h dyn PropertyHandle,
        path: &str,
    ) -> Option<PropertyOffset<'h>> {
        if !self.rlock(handle) {
            return None;
        }
        match self.try_find_property(path) {
            Ok(offset) => Some(offset),
            Err(err) => {
                log::debug!("`{path}` does not resolve: {err}");
                self.runlock(handle);
                None
            }
        }
    }

    /// Releases the write lock of `handle`.
    ///
    /// Fails when `handle` is not the handle this instance write-locked.
    pub fn wunlock(&mut self, handle: &dyn PropertyHandle) -> bool {
        match &self.state {
            LockState::Write { handle: locked, .. } if same_handle(*locked, handle) => {
                self.release();
                true
            }
            LockState::Write { .. } => {
                log::warn!("PropertyData::wunlock: not the locked handle");
                false
            }
            LockState::Read { .. } => {
                log::warn!("PropertyData::wunlock: the handle is read-locked");
                false
            }
            LockState::Unlocked => {
                log::warn!("PropertyData::wunlock: not locked");
                false
            }
        }
    }

    /// Releases the read lock of `handle`.
    ///
    /// Fails when `handle` is not the handle this instance read-locked.
    pub fn runlock(&mut self, handle: &dyn PropertyHandle) -> bool {
        match &self.state {
            LockState::Read { handle: locked, .. } if same_handle(*locked, handle) => {
                self.release();
                true
            }
            LockState::Read { .. } => {
                log::warn!("PropertyData::runlock: not the locked handle");
                false
            }
            LockState::Write { .. } => {
                log::warn!("PropertyData::runlock: the handle is write-locked");
                false
            }
            LockState::Unlocked => {
                log::warn!("PropertyData::runlock: not locked");
                false
            }
        }
    }

    fn release(&mut self) {
        // Dropping the guard releases the handle's lock.
        self.state = LockState::Unlocked;
        self.owner = None;
        self.size = 0;
    }

    // -------------------------------------------------------------------------
    // Introspection

    #[inline]
    pub fn is_locked(&self) -> bool {
        !matches!(self.state, LockState::Unlocked)
    }

    #[inline]
    pub fn is_write_locked(&self) -> bool {
        matches!(self.state, LockState::Write { .. })
    }

    /// The locked handle's owner.
    #[inline]
    pub fn owner(&self) -> Option<&'h dyn PropertyApi> {
        self.owner
    }

    /// Storage size of the locked handle; `0` when unlocked.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// The locked owner's metadata; empty when unlocked.
    #[inline]
    pub fn meta_data(&self) -> &'h [Property] {
        match self.owner {
            Some(owner) => owner.meta_data(),
            None => &[],
        }
    }

    #[inline]
    pub fn meta_data_at(&self, index: usize) -> Option<&'h Property> {
        self.meta_data().get(index)
    }

    #[inline]
    pub fn property_count(&self) -> usize {
        self.meta_data().len()
    }

    /// The locked bytes, in either mode.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.state {
            LockState::Read { data, .. } => Some(&data[..]),
            LockState::Write { data, .. } => Some(&data[..]),
            LockState::Unlocked => None,
        }
    }

    /// The locked bytes, when write-locked.
    pub fn data_mut(&mut self) -> Option<&mut [u8]> {
        match &mut self.state {
            LockState::Write { data, .. } => Some(&mut data[..]),
            LockState::Read { .. } | LockState::Unlocked => None,
        }
    }

    // -------------------------------------------------------------------------
    // Resolution

    /// Resolves `path` in the locked owner.
    #[inline]
    pub fn find_property(&self, path: &str) -> Option<PropertyOffset<'h>> {
        self.try_find_property(path).ok()
    }

    /// Resolves `path` in the locked owner, reporting why it failed.
    pub fn try_find_property(&self, path: &str) -> Result<PropertyOffset<'h>, PropertyError> {
        let storage = self.data().ok_or(PropertyError::NotLocked)?;
        Ok(try_resolve(self.meta_data(), path, storage)?)
    }

    /// Resolves `path` in `properties` laid out over `storage`.
    #[inline]
    pub fn find_property_in<'a>(
        properties: &'a [Property],
        path: &str,
        storage: &[u8],
    ) -> Option<PropertyOffset<'a>> {
        resolve(properties, path, storage)
    }

    // -------------------------------------------------------------------------
    // Views

    /// A read view of a resolved property.
    pub fn value<'s>(
        &'s self,
        offset: &PropertyOffset<'s>,
    ) -> Result<PropertyValue<'s>, PropertyError> {
        let storage = self.data().ok_or(PropertyError::NotLocked)?;
        Ok(PropertyValue::new(offset.property, storage, offset.offset))
    }

    /// A read-write view of a resolved property; requires the write lock.
    pub fn value_mut<'s>(
        &'s mut self,
        offset: &PropertyOffset<'s>,
    ) -> Result<PropertyValueMut<'s>, PropertyError> {
        let storage = match &mut self.state {
            LockState::Write { data, .. } => &mut data[..],
            LockState::Read { .. } => return Err(PropertyError::NotWritable),
            LockState::Unlocked => return Err(PropertyError::NotLocked),
        };
        Ok(PropertyValueMut::new(offset.property, storage, offset.offset))
    }
}

impl Drop for PropertyData<'_> {
    fn drop(&mut self) {
        if self.is_locked() {
            log::trace!("PropertyData dropped while locked, releasing the lock");
        }
    }
}

impl fmt::Debug for PropertyData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            LockState::Unlocked => "unlocked",
            LockState::Read { .. } => "read",
            LockState::Write { .. } => "write",
        };
        f.debug_struct("PropertyData")
            .field("state", &state)
            .field("owner", &self.owner.map(|o| o.type_name()))
            .field("size", &self.size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::PropertyData;
    use crate::data::PropertyError;
    use crate::handle::{PropertyHandle, PropertyStorage};
    use crate::metadata::{InlineVec, Property, StaticProperties};
    use ember_os::sync::{Arc, LazyLock};
    use glam::Vec2;

    static TABLE: LazyLock<[Property; 3]> = LazyLock::new(|| {
        [
            Property::scalar::<i32>("intVal", 0),
            Property::scalar::<Vec2>("vec2Val", 4),
            Property::inline_vec::<u32>("ids", 12, 4),
        ]
    });

    const SIZE: usize = 12 + InlineVec::<u32>::byte_size(4);

    fn storage() -> PropertyStorage {
        let owner = Arc::new(StaticProperties::new("Thing", &LazyLock::force(&TABLE)[..]));
        PropertyStorage::zeroed(owner, SIZE)
    }

    #[test]
    fn second_lock_fails_and_keeps_state() {
        let first = storage();
        let second = storage();
        let mut data = PropertyData::new();

        assert!(data.wlock(&first));
        assert_eq!(data.size(), SIZE);
        assert!(!data.wlock(&first));
        assert!(!data.wlock(&second));
        assert!(!data.rlock(&second));
        assert_eq!(data.try_rlock(&second), Err(PropertyError::Locked));

        assert!(data.is_write_locked());
        assert_eq!(data.size(), SIZE);
        assert_eq!(data.owner().unwrap().type_name(), "Thing");
        assert_eq!(data.property_count(), 3);
        assert!(data.wunlock(&first));
    }

    #[test]
    fn unlock_requires_the_locked_handle() {
        let first = storage();
        let second = storage();
        let mut data = PropertyData::new();

        assert!(!data.wunlock(&first));
        assert!(data.wlock(&first));
        assert!(!data.wunlock(&second));
        assert!(!data.runlock(&first));
        assert!(data.is_locked());
        assert!(data.wunlock(&first));
        assert!(!data.wunlock(&first));

        assert!(!data.is_locked());
        assert!(data.owner().is_none());
        assert_eq!(data.size(), 0);
        assert!(data.meta_data().is_empty());
        assert!(data.meta_data_at(0).is_none());
        assert!(data.data().is_none());
    }

    #[test]
    fn failed_path_releases_the_lock() {
        let storage = storage();
        let mut data = PropertyData::new();

        assert!(data.wlock_path(&storage, "doesNotExist").is_none());
        assert!(!data.is_locked());
        assert!(data.rlock_path(&storage, "ids[0]").is_none());
        assert!(!data.is_locked());

        let found = data.rlock_path(&storage, "vec2Val").unwrap();
        assert_eq!(found.offset, 4);
        assert!(data.is_locked());
        assert_eq!(
            data.value_mut(&found).err(),
            Some(PropertyError::NotWritable)
        );
        assert!(data.runlock(&storage));
        assert_eq!(data.value(&found).err(), Some(PropertyError::NotLocked));
    }

    #[test]
    fn containers_resolve_against_locked_bytes() {
        let storage = storage();
        let mut data = PropertyData::new();
        assert!(data.wlock(&storage));

        let bytes = data.data_mut().unwrap();
        assert!(InlineVec::<u32>::push(bytes, 12, 4, 5));
        assert!(InlineVec::<u32>::push(bytes, 12, 4, 6));

        let second = data.find_property("ids[1]").unwrap();
        assert_eq!(second.index, 1);
        assert_eq!(data.value(&second).unwrap().get::<u32>(), Ok(6));
        data.value_mut(&second).unwrap().set(60u32).unwrap();
        assert!(data.find_property("ids[2]").is_none());
        assert!(data.wunlock(&storage));

        let found = PropertyData::find_property_in(&TABLE[..], "ids[1]", &[]);
        assert!(found.is_none());
        assert_eq!(
            crate::data::get_property_value::<u32>(&storage, "ids[1]"),
            Some(60)
        );
    }

    #[test]
    fn drop_releases_the_lock() {
        let storage = storage();
        {
            let mut data = PropertyData::new();
            assert!(data.wlock(&storage));
        }
        assert!(storage.wlock().is_some());
    }
}
