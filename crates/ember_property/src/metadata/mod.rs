//! Static descriptions of an owner's fields.
//!
//! A metadata table is an ordered slice of [`Property`] descriptors. Each
//! descriptor names one field, its byte offset from the owner's base and its
//! shape ([`PropertyKind`]): a scalar, a fixed array, a dynamic container
//! reached through [`ContainerMethods`], or a nested struct with its own
//! member table.
//!
//! Tables are immutable once built and are shared between threads without
//! locking. Owners expose them through [`PropertyApi`].
//!
//! # Examples
//!
//! ```
//! use ember_property::metadata::{Property, PropertyKind};
//! use glam::Vec3;
//!
//! let members = [
//!     Property::scalar::<Vec3>("position", 0),
//!     Property::scalar::<f32>("scale", 12),
//! ];
//! let transform = Property::structure::<[f32; 4]>("transform", 16, members);
//!
//! assert!(matches!(transform.kind(), PropertyKind::Struct { .. }));
//! assert_eq!(transform.members()[1].name(), "scale");
//! ```

// -----------------------------------------------------------------------------
// Modules

mod api;
mod container;
mod property;
mod ty;

// -----------------------------------------------------------------------------
// Exports

pub use api::{PropertyApi, StaticProperties};
pub use container::{ContainerGetFn, ContainerMethods, ContainerSizeFn, InlineVec};
pub use property::{Property, PropertyFlags, PropertyKind};
pub use ty::{PropertyType, PropertyValue};

// -----------------------------------------------------------------------------
// Macros

/// Builds a boxed metadata table for the scalar fields of a `#[repr(C)]` struct.
///
/// Offsets come from [`core::mem::offset_of!`], names default to the field
/// identifier and can be overridden with `field = "name"`.
///
/// # Examples
///
/// ```
/// use bytemuck::{Pod, Zeroable};
/// use glam::Vec2;
///
/// #[repr(C)]
/// #[derive(Clone, Copy, Pod, Zeroable)]
/// struct Sprite {
///     layer: u32,
///     size: Vec2,
/// }
///
/// let table = ember_property::properties!(Sprite {
///     layer: u32,
///     size = "spriteSize": Vec2,
/// });
///
/// assert_eq!(table.len(), 2);
/// assert_eq!(table[1].name(), "spriteSize");
/// assert_eq!(table[1].offset(), 4);
/// ```
#[macro_export]
macro_rules! properties {
    ($owner:ty { $( $field:ident $(= $name:literal)? : $ty:ty ),* $(,)? }) => {
        $crate::__macro_exports::Box::<[$crate::metadata::Property]>::from([
            $(
                $crate::metadata::Property::scalar::<$ty>(
                    $crate::__property_name!($field $(, $name)?),
                    $crate::__macro_exports::offset_of!($owner, $field),
                )
            ),*
        ])
    };
}
