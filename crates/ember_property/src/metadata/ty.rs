use core::any::TypeId;
use core::fmt;

use bytemuck::Pod;

use crate::any::{AnyBridge, AnyType};

// -----------------------------------------------------------------------------
// PropertyValue

/// A value that can live inside an owner's byte storage and
/// be bridged to the type-erased [`any`](crate::any) layer.
///
/// Implemented for every `Pod` type that is also an [`AnyType`].
pub trait PropertyValue: Pod + AnyType {}

impl<T: Pod + AnyType> PropertyValue for T {}

// -----------------------------------------------------------------------------
// PropertyType

/// Marker used as the type of fields that are not typed-accessible,
/// such as the raw bytes of a container.
struct Opaque;

/// The runtime type of a property: identity, layout and an optional bridge
/// to type-erased values.
///
/// Two types are equal when their [`TypeId`] and size are equal.
#[derive(Clone, Copy)]
pub struct PropertyType {
    id: TypeId,
    name: &'static str,
    size: usize,
    align: usize,
    bridge: Option<AnyBridge>,
}

impl PropertyType {
    /// The type of a [`PropertyValue`], bridged to the `any` layer.
    ///
    /// # Examples
    ///
    /// ```
    /// use ember_property::metadata::PropertyType;
    ///
    /// let ty = PropertyType::of::<f32>();
    /// assert!(ty.is::<f32>());
    /// assert_eq!(ty.size(), 4);
    /// assert!(ty.bridge().is_some());
    /// ```
    pub fn of<T: PropertyValue>() -> Self {
        Self {
            bridge: Some(AnyBridge::of::<T>()),
            ..Self::pod::<T>()
        }
    }

    /// The type of any `Pod` value, without an `any` bridge.
    ///
    /// Used for nested structs that are only reached through their members.
    pub fn pod<T: Pod>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
            size: size_of::<T>(),
            align: align_of::<T>(),
            bridge: None,
        }
    }

    /// An untyped block of `size` bytes. Typed access never matches it.
    pub fn opaque(size: usize, align: usize) -> Self {
        Self {
            id: TypeId::of::<Opaque>(),
            name: "opaque",
            size,
            align,
            bridge: None,
        }
    }

    /// Returns the `TypeId`.
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Check if the given type matches this one.
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Returns the type name, as given by [`core::any::type_name`].
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Size of one value in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Alignment of one value in bytes.
    #[inline]
    pub fn align(&self) -> usize {
        self.align
    }

    /// Returns the bridge to the `any` layer, if the type has one.
    #[inline]
    pub fn bridge(&self) -> Option<&AnyBridge> {
        self.bridge.as_ref()
    }
}

impl PartialEq for PropertyType {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.size == other.size
    }
}

impl Eq for PropertyType {}

impl fmt::Debug for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyType")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("align", &self.align)
            .field("bridged", &self.bridge.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::PropertyType;
    use glam::{UVec2, Vec2};

    #[test]
    fn same_layout_different_types() {
        let a = PropertyType::of::<Vec2>();
        let b = PropertyType::of::<UVec2>();
        assert_eq!(a.size(), b.size());
        assert_ne!(a, b);
        assert!(!a.is::<UVec2>());
    }

    #[test]
    fn opaque_matches_nothing() {
        let ty = PropertyType::opaque(16, 4);
        assert!(!ty.is::<[u8; 16]>());
        assert!(ty.bridge().is_none());
        assert_eq!(ty.name(), "opaque");
    }
}
