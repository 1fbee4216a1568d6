use core::fmt;
use core::marker::PhantomData;
use core::ops::Range;

use bytemuck::Pod;

use crate::data::PropertyError;
use crate::data::view::{check_writable, typed_range};
use crate::handle::{PropertyHandle, ReadLock, WriteLock};
use crate::metadata::Property;
use crate::path::{PropertyOffset, try_resolve};

// -----------------------------------------------------------------------------
// Helpers

fn locate<'h, T: Pod>(
    handle: &'h dyn PropertyHandle,
    storage: &[u8],
    path: &str,
) -> Result<(PropertyOffset<'h>, Range<usize>), PropertyError> {
    let offset = try_resolve(handle.owner().meta_data(), path, storage)?;
    let range = typed_range::<T>(offset.property, offset.offset, storage.len())?;
    Ok((offset, range))
}

// -----------------------------------------------------------------------------
// ScopedHandle

/// Write access to one typed property, holding the write lock until dropped.
///
/// The path, type and bounds are checked once when the handle is made, so
/// the accessors cannot fail.
pub struct ScopedHandle<'h, T> {
    lock: WriteLock<'h>,
    property: &'h Property,
    range: Range<usize>,
    _marker: PhantomData<fn() -> T>,
}

/// Write-locks `handle` and binds the property at `path` as a `T`.
///
/// `None`, with the lock released, when the path does not resolve, the
/// property is not a `T` or it is read-only.
///
/// # Examples
///
/// ```
/// use ember_os::sync::Arc;
/// use ember_property::data::make_scoped_handle;
/// use ember_property::handle::PropertyStorage;
/// use ember_property::metadata::{Property, StaticProperties};
/// use ember_os::sync::LazyLock;
///
/// static TABLE: LazyLock<[Property; 1]> =
///     LazyLock::new(|| [Property::scalar::<i32>("hp", 0)]);
///
/// let storage = PropertyStorage::zeroed(
///     Arc::new(StaticProperties::new("Unit", &LazyLock::force(&TABLE)[..])),
///     4,
/// );
///
/// assert!(make_scoped_handle::<i32>(&storage, "mana").is_none());
/// assert!(make_scoped_handle::<u32>(&storage, "hp").is_none());
///
/// let mut hp = make_scoped_handle::<i32>(&storage, "hp").unwrap();
/// hp.set(10);
/// hp.update(|hp| *hp -= 3);
/// assert_eq!(hp.get(), 7);
/// ```
pub fn make_scoped_handle<'h, T: Pod>(
    handle: &'h dyn PropertyHandle,
    path: &str,
) -> Option<ScopedHandle<'h, T>> {
    let lock = handle.wlock()?;
    let located = locate::<T>(handle, &lock[..], path)
        .and_then(|(offset, range)| check_writable(offset.property).map(|()| (offset, range)));
    match located {
        Ok((offset, range)) => Some(ScopedHandle {
            lock,
            property: offset.property,
            range,
            _marker: PhantomData,
        }),
        Err(err) => {
            log::debug!("make_scoped_handle(`{path}`): {err}");
            None
        }
    }
}

impl<T: Pod> ScopedHandle<'_, T> {
    #[inline]
    pub fn property(&self) -> &Property {
        self.property
    }

    pub fn get(&self) -> T {
        bytemuck::pod_read_unaligned(&self.lock[self.range.clone()])
    }

    pub fn set(&mut self, value: T) {
        self.lock[self.range.clone()].copy_from_slice(bytemuck::bytes_of(&value));
    }

    /// Reads, modifies and writes back the value.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        let mut value = self.get();
        f(&mut value);
        self.set(value);
    }
}

impl<T> fmt::Debug for ScopedHandle<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedHandle")
            .field("property", &self.property.name())
            .field("range", &self.range)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ScopedReadHandle

/// Read access to one typed property, holding the read lock until dropped.
pub struct ScopedReadHandle<'h, T> {
    lock: ReadLock<'h>,
    property: &'h Property,
    range: Range<usize>,
    _marker: PhantomData<fn() -> T>,
}

/// Read-locks `handle` and binds the property at `path` as a `T`.
///
/// `None`, with the lock released, when the path does not resolve or the
/// property is not a `T`.
pub fn make_scoped_read_handle<'h, T: Pod>(
    handle: &'h dyn PropertyHandle,
    path: &str,
) -> Option<ScopedReadHandle<'h, T>> {
    let lock = handle.rlock()?;
    let located = locate::<T>(handle, &lock[..], path);
    match located {
        Ok((offset, range)) => Some(ScopedReadHandle {
            lock,
            property: offset.property,
            range,
            _marker: PhantomData,
        }),
        Err(err) => {
            log::debug!("make_scoped_read_handle(`{path}`): {err}");
            None
        }
    }
}

impl<T: Pod> ScopedReadHandle<'_, T> {
    #[inline]
    pub fn property(&self) -> &Property {
        self.property
    }

    pub fn get(&self) -> T {
        bytemuck::pod_read_unaligned(&self.lock[self.range.clone()])
    }
}

impl<T> fmt::Debug for ScopedReadHandle<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedReadHandle")
            .field("property", &self.property.name())
            .field("range", &self.range)
            .finish()
    }
}
