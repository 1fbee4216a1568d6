use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId};

use crate::any::{AnyError, AnyObject, AnyResult, AnyReturn, AnyType, CompatibilityDirection};

/// Builds a `T` from `src`: first through `T`'s own conversion of the
/// stored value, then by asking `src` for a `T`.
pub(crate) fn convert<T: AnyType>(src: &dyn AnyObject) -> Option<T> {
    if let Some(value) = T::inject(src.as_any()) {
        return Some(value);
    }
    let mut slot: Option<T> = None;
    src.read_into(&mut slot);
    slot
}

// -----------------------------------------------------------------------------
// AnyValue

/// An [`AnyObject`] holding one `T`.
///
/// A value built with [`read_only`](Self::read_only) can still be read and
/// copied from, but every write through the `any` layer fails.
#[derive(Debug, Clone, PartialEq)]
pub struct AnyValue<T> {
    value: T,
    read_only: bool,
}

impl<T: AnyType> AnyValue<T> {
    /// A writable value.
    #[inline]
    pub const fn new(value: T) -> Self {
        Self {
            value,
            read_only: false,
        }
    }

    /// A value that rejects writes.
    #[inline]
    pub const fn read_only(value: T) -> Self {
        Self {
            value,
            read_only: true,
        }
    }

    /// Borrows the value.
    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Unwraps the value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: AnyType> AnyObject for AnyValue<T> {
    #[inline]
    fn type_uid(&self) -> TypeId {
        TypeId::of::<T>()
    }

    #[inline]
    fn type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }

    fn compatible_types(&self, direction: CompatibilityDirection) -> Vec<TypeId> {
        T::compatible_types(direction)
    }

    #[inline]
    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn read_into(&self, out: &mut dyn Any) -> bool {
        self.value.extract(out)
    }

    fn write_from(&mut self, src: &dyn Any) -> AnyResult {
        self.value = T::inject(src).ok_or(AnyError::Fail)?;
        Ok(AnyReturn::Success)
    }

    /// Falls back to reading a `T` out of `src` when `T` cannot be built
    /// from the source's stored value.
    fn assign_from(&mut self, src: &dyn AnyObject) -> AnyResult {
        self.value = convert(src).ok_or(AnyError::Fail)?;
        Ok(AnyReturn::Success)
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        &self.value
    }

    fn clone_any(&self) -> Box<dyn AnyObject> {
        Box::new(self.clone())
    }
}
