use alloc::boxed::Box;
use core::fmt;

use bytemuck::Pod;

use crate::any::{AnyError, AnyObject, AnyResult, AnyReturn, AnyType, AnyValue};

// -----------------------------------------------------------------------------
// AnyBridge

/// Converts between the bytes of a stored value and the `any` layer.
///
/// Created with [`AnyBridge::of`] for a `Pod` type and carried by
/// [`PropertyType`](crate::metadata::PropertyType), so a property can be
/// read and written as a type-erased value without knowing its type.
///
/// # Examples
///
/// ```
/// use ember_property::any::{AnyBridge, AnyReturn};
///
/// let bridge = AnyBridge::of::<u32>();
/// let mut bytes = 5u32.to_ne_bytes();
///
/// let mut value = bridge.to_any(&bytes).unwrap();
/// assert_eq!(value.get_value::<u32>(), Some(5));
///
/// value.set_value(6u32).unwrap();
/// assert_eq!(bridge.from_any(&*value, &mut bytes), Ok(AnyReturn::Success));
/// assert_eq!(bridge.from_any(&*value, &mut bytes), Ok(AnyReturn::NothingToDo));
/// assert_eq!(u32::from_ne_bytes(bytes), 6);
/// ```
#[derive(Clone, Copy)]
pub struct AnyBridge {
    to_any: fn(&[u8]) -> Option<Box<dyn AnyObject>>,
    from_any: fn(&dyn AnyObject, &mut [u8]) -> AnyResult,
}

impl AnyBridge {
    /// The bridge for values of type `T`.
    pub fn of<T: Pod + AnyType>() -> Self {
        Self {
            to_any: to_any::<T>,
            from_any: from_any::<T>,
        }
    }

    /// Boxes the value stored at the start of `bytes`.
    ///
    /// `None` when `bytes` is too short.
    #[inline]
    pub fn to_any(&self, bytes: &[u8]) -> Option<Box<dyn AnyObject>> {
        (self.to_any)(bytes)
    }

    /// Writes `src` into the start of `bytes`, converting it as
    /// [`copy_from`](AnyObject::copy_from) does.
    ///
    /// Returns [`AnyReturn::NothingToDo`] when the bytes already held the value.
    #[inline]
    pub fn from_any(&self, src: &dyn AnyObject, bytes: &mut [u8]) -> AnyResult {
        (self.from_any)(src, bytes)
    }
}

impl fmt::Debug for AnyBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyBridge").finish_non_exhaustive()
    }
}

fn to_any<T: Pod + AnyType>(bytes: &[u8]) -> Option<Box<dyn AnyObject>> {
    let bytes = bytes.get(..size_of::<T>())?;
    Some(Box::new(AnyValue::new(bytemuck::pod_read_unaligned::<T>(bytes))))
}

fn from_any<T: Pod + AnyType>(src: &dyn AnyObject, bytes: &mut [u8]) -> AnyResult {
    let slot = bytes
        .get_mut(..size_of::<T>())
        .ok_or(AnyError::InvalidArgument)?;

    let mut value = AnyValue::new(bytemuck::pod_read_unaligned::<T>(slot));
    let erased: &mut dyn AnyObject = &mut value;
    erased.copy_from(src)?;

    let written = bytemuck::bytes_of(value.value());
    if slot == written {
        return Ok(AnyReturn::NothingToDo);
    }
    slot.copy_from_slice(written);
    Ok(AnyReturn::Success)
}

#[cfg(test)]
mod tests {
    use super::AnyBridge;
    use crate::any::{AnyError, AnyValue};
    use glam::{UVec2, Vec2};

    #[test]
    fn short_buffers_are_rejected() {
        let bridge = AnyBridge::of::<Vec2>();
        assert!(bridge.to_any(&[0u8; 4]).is_none());
        assert_eq!(
            bridge.from_any(&AnyValue::new(Vec2::ONE), &mut [0u8; 4]),
            Err(AnyError::InvalidArgument)
        );
    }

    #[test]
    fn incompatible_sources_do_not_write() {
        let bridge = AnyBridge::of::<Vec2>();
        let mut bytes = [0u8; 8];
        assert_eq!(
            bridge.from_any(&AnyValue::new(UVec2::new(1, 1)), &mut bytes),
            Err(AnyError::IncompatibleType)
        );
        assert_eq!(bytes, [0u8; 8]);
    }

    #[test]
    fn reads_prefix_of_longer_buffer() {
        let bridge = AnyBridge::of::<u16>();
        let value = bridge.to_any(&[1, 0, 9, 9]).unwrap();
        assert_eq!(value.get_value::<u16>(), Some(u16::from_ne_bytes([1, 0])));
    }
}
