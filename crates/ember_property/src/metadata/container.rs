use alloc::boxed::Box;
use core::fmt;
use core::marker::PhantomData;

use bytemuck::Pod;

use crate::metadata::Property;

// -----------------------------------------------------------------------------
// ContainerMethods

/// Returns the element count of the container starting at byte `at` of `storage`.
pub type ContainerSizeFn = fn(storage: &[u8], at: usize) -> usize;

/// Returns the storage offset of element `index` of the container starting at
/// byte `at` of `storage`.
pub type ContainerGetFn = fn(storage: &[u8], at: usize, index: usize) -> usize;

/// Access functions of a dynamically sized container field.
///
/// Both functions receive the whole storage buffer and the container's own
/// offset inside it. `get` returns an offset from the start of the storage,
/// so element offsets are comparable with fixed-field offsets. Callers
/// bounds-check `index` against `size` before calling `get`.
#[derive(Clone)]
pub struct ContainerMethods {
    element: Box<Property>,
    size: ContainerSizeFn,
    get: ContainerGetFn,
}

impl ContainerMethods {
    /// Creates container methods from an element description and access functions.
    pub fn new(element: Property, size: ContainerSizeFn, get: ContainerGetFn) -> Self {
        Self {
            element: Box::new(element),
            size,
            get,
        }
    }

    /// Container methods for the [`InlineVec`] layout with elements of type `T`.
    pub fn inline_vec<T: Pod>(element: Property) -> Self {
        Self::new(element, InlineVec::<T>::len, InlineVec::<T>::element_offset)
    }

    /// Describes one element of the container.
    #[inline]
    pub fn element(&self) -> &Property {
        &self.element
    }

    /// Current element count of the container at byte `at`.
    #[inline]
    pub fn size(&self, storage: &[u8], at: usize) -> usize {
        (self.size)(storage, at)
    }

    /// Storage offset of element `index` of the container at byte `at`.
    #[inline]
    pub fn get(&self, storage: &[u8], at: usize, index: usize) -> usize {
        (self.get)(storage, at, index)
    }
}

impl fmt::Debug for ContainerMethods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerMethods")
            .field("element", &self.element)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// InlineVec

/// Layout of a bounded vector stored inline in an owner's bytes.
///
/// A `u32` length comes first, padded up to the alignment of `T`,
/// followed by `capacity` slots of `T`. Values are read and written
/// unaligned, so the storage buffer itself needs no particular alignment.
///
/// # Examples
///
/// ```
/// use ember_property::metadata::InlineVec;
///
/// let mut bytes = vec![0u8; InlineVec::<f32>::byte_size(2)];
///
/// assert!(InlineVec::<f32>::push(&mut bytes, 0, 2, 1.5));
/// assert!(InlineVec::<f32>::push(&mut bytes, 0, 2, 2.5));
/// assert!(!InlineVec::<f32>::push(&mut bytes, 0, 2, 3.5));
///
/// assert_eq!(InlineVec::<f32>::len(&bytes, 0), 2);
/// assert_eq!(InlineVec::<f32>::get(&bytes, 0, 1), Some(2.5));
/// ```
pub struct InlineVec<T>(PhantomData<T>);

impl<T: Pod> InlineVec<T> {
    /// Bytes before the first element.
    pub const HEADER: usize = if align_of::<T>() > size_of::<u32>() {
        align_of::<T>()
    } else {
        size_of::<u32>()
    };

    /// Bytes needed for a container of `capacity` elements.
    #[inline]
    pub const fn byte_size(capacity: usize) -> usize {
        Self::HEADER + capacity * size_of::<T>()
    }

    /// Number of elements, clamped to what fits in `storage`.
    pub fn len(storage: &[u8], at: usize) -> usize {
        let Some(header) = Self::header(storage, at) else {
            return 0;
        };
        let Some(first) = at.checked_add(Self::HEADER) else {
            return 0;
        };
        let len = bytemuck::pod_read_unaligned::<u32>(header) as usize;
        let room = storage.len().saturating_sub(first) / size_of::<T>().max(1);
        len.min(room)
    }

    /// Storage offset of element `index`, saturating at `usize::MAX`.
    #[inline]
    pub fn element_offset(_storage: &[u8], at: usize, index: usize) -> usize {
        at.saturating_add(Self::HEADER)
            .saturating_add(index.saturating_mul(size_of::<T>()))
    }

    /// Reads element `index`, if it exists.
    pub fn get(storage: &[u8], at: usize, index: usize) -> Option<T> {
        if index >= Self::len(storage, at) {
            return None;
        }
        let start = Self::element_offset(storage, at, index);
        let bytes = storage.get(start..start.checked_add(size_of::<T>())?)?;
        Some(bytemuck::pod_read_unaligned(bytes))
    }

    /// Overwrites element `index`. Returns `false` when it does not exist.
    pub fn set(storage: &mut [u8], at: usize, index: usize, value: T) -> bool {
        if index >= Self::len(storage, at) {
            return false;
        }
        let start = Self::element_offset(storage, at, index);
        let Some(end) = start.checked_add(size_of::<T>()) else {
            return false;
        };
        match storage.get_mut(start..end) {
            Some(slot) => {
                slot.copy_from_slice(bytemuck::bytes_of(&value));
                true
            }
            None => false,
        }
    }

    /// Appends `value`. Returns `false` when the container is full.
    pub fn push(storage: &mut [u8], at: usize, capacity: usize, value: T) -> bool {
        let len = Self::len(storage, at);
        if len >= capacity || !Self::write_len(storage, at, len + 1) {
            return false;
        }
        if Self::set(storage, at, len, value) {
            return true;
        }
        // Storage shorter than declared; restore the length.
        Self::write_len(storage, at, len);
        false
    }

    /// Removes the last element.
    pub fn pop(storage: &mut [u8], at: usize) -> Option<T> {
        let len = Self::len(storage, at);
        let value = Self::get(storage, at, len.checked_sub(1)?)?;
        Self::write_len(storage, at, len - 1);
        Some(value)
    }

    /// Sets the length to zero. Element bytes are left untouched.
    #[inline]
    pub fn clear(storage: &mut [u8], at: usize) -> bool {
        Self::write_len(storage, at, 0)
    }

    fn write_len(storage: &mut [u8], at: usize, len: usize) -> bool {
        let Ok(len) = u32::try_from(len) else {
            return false;
        };
        let Some(end) = at.checked_add(size_of::<u32>()) else {
            return false;
        };
        match storage.get_mut(at..end) {
            Some(header) => {
                header.copy_from_slice(&len.to_ne_bytes());
                true
            }
            None => false,
        }
    }

    fn header(storage: &[u8], at: usize) -> Option<&[u8]> {
        storage.get(at..at.checked_add(size_of::<u32>())?)
    }
}

#[cfg(test)]
mod tests {
    use super::{ContainerMethods, InlineVec};
    use crate::metadata::Property;
    use alloc::vec;
    use glam::Vec4;

    #[test]
    fn header_follows_alignment() {
        assert_eq!(InlineVec::<u8>::HEADER, 4);
        assert_eq!(InlineVec::<f64>::HEADER, 8);
        assert_eq!(InlineVec::<u32>::byte_size(3), 16);
    }

    #[test]
    fn push_pop_clear() {
        let mut bytes = vec![0u8; 8 + InlineVec::<u32>::byte_size(3)];
        let at = 8;
        assert_eq!(InlineVec::<u32>::len(&bytes, at), 0);
        assert!(InlineVec::<u32>::push(&mut bytes, at, 3, 7));
        assert!(InlineVec::<u32>::push(&mut bytes, at, 3, 8));
        assert_eq!(InlineVec::<u32>::pop(&mut bytes, at), Some(8));
        assert_eq!(InlineVec::<u32>::len(&bytes, at), 1);
        assert!(InlineVec::<u32>::set(&mut bytes, at, 0, 42));
        assert_eq!(InlineVec::<u32>::get(&bytes, at, 0), Some(42));
        assert!(!InlineVec::<u32>::set(&mut bytes, at, 1, 1));
        assert!(InlineVec::<u32>::clear(&mut bytes, at));
        assert_eq!(InlineVec::<u32>::pop(&mut bytes, at), None);
    }

    #[test]
    fn corrupt_length_is_clamped() {
        let mut bytes = vec![0u8; InlineVec::<u32>::byte_size(2)];
        bytes[..4].copy_from_slice(&1000u32.to_ne_bytes());
        assert_eq!(InlineVec::<u32>::len(&bytes, 0), 2);
        assert_eq!(InlineVec::<u32>::len(&bytes, 64), 0);
    }

    #[test]
    fn offsets_near_the_address_limit_are_empty() {
        let mut bytes = vec![0u8; InlineVec::<u32>::byte_size(2)];
        for at in [usize::MAX, usize::MAX - 2] {
            assert_eq!(InlineVec::<u32>::len(&bytes, at), 0);
            assert_eq!(InlineVec::<u32>::get(&bytes, at, 0), None);
            assert!(!InlineVec::<u32>::clear(&mut bytes, at));
            assert!(!InlineVec::<u32>::push(&mut bytes, at, 2, 1));
            assert_eq!(InlineVec::<u32>::pop(&mut bytes, at), None);
        }
        assert_eq!(InlineVec::<u32>::element_offset(&bytes, usize::MAX, 3), usize::MAX);
    }

    #[test]
    fn methods_dispatch_to_layout() {
        let methods = ContainerMethods::inline_vec::<Vec4>(Property::scalar::<Vec4>("c", 0));
        let mut bytes = vec![0u8; InlineVec::<Vec4>::byte_size(2)];
        assert!(InlineVec::<Vec4>::push(&mut bytes, 0, 2, Vec4::ONE));
        assert_eq!(methods.size(&bytes, 0), 1);
        assert_eq!(methods.get(&bytes, 0, 1), InlineVec::<Vec4>::HEADER + 16);
        assert_eq!(methods.element().name(), "c");
    }
}
