use alloc::borrow::Cow;
use alloc::boxed::Box;

use bitflags::bitflags;
use bytemuck::Pod;
use ember_utils::hash::hash_name;

use crate::metadata::{ContainerMethods, InlineVec, PropertyType, PropertyValue};

// -----------------------------------------------------------------------------
// PropertyFlags

bitflags! {
    /// Tooling and serialization hints attached to a [`Property`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropertyFlags: u32 {
        /// Writes through typed views are rejected.
        const READ_ONLY = 1 << 0;
        /// Hidden from editors and inspectors.
        const HIDDEN = 1 << 1;
        /// Skipped by serializers.
        const NO_SERIALIZE = 1 << 2;
        /// May be driven by animation bindings.
        const ANIMATABLE = 1 << 3;
    }
}

// -----------------------------------------------------------------------------
// PropertyKind

/// The shape of a field.
///
/// A fixed array and a dynamic container are distinct variants, so a field
/// can never be both.
#[derive(Debug, Clone)]
pub enum PropertyKind {
    /// A single value.
    Scalar,
    /// `count` contiguous elements described by `element`.
    FixedArray { element: Box<Property>, count: usize },
    /// A variable-length sequence reached through [`ContainerMethods`].
    Container(ContainerMethods),
    /// A nested struct with its own member table.
    Struct { members: Box<[Property]> },
}

// -----------------------------------------------------------------------------
// Property

/// Describes one named field of an owner type.
///
/// `offset` is relative to the owner's base (or, for members, to the
/// enclosing struct). `hash` is a pre-filter for name lookups.
#[derive(Debug, Clone)]
pub struct Property {
    name: Cow<'static, str>,
    display_name: Option<Cow<'static, str>>,
    hash: u32,
    offset: usize,
    count: usize,
    ty: PropertyType,
    flags: PropertyFlags,
    kind: PropertyKind,
}

impl Property {
    /// Creates a scalar property with an explicit type.
    pub fn new(name: impl Into<Cow<'static, str>>, offset: usize, ty: PropertyType) -> Self {
        let name = name.into();
        Self {
            hash: hash_name(&name),
            name,
            display_name: None,
            offset,
            count: 1,
            ty,
            flags: PropertyFlags::empty(),
            kind: PropertyKind::Scalar,
        }
    }

    /// Creates a scalar property of type `T`.
    #[inline]
    pub fn scalar<T: PropertyValue>(name: impl Into<Cow<'static, str>>, offset: usize) -> Self {
        Self::new(name, offset, PropertyType::of::<T>())
    }

    /// Creates a nested struct property of type `T` with the given members.
    ///
    /// Member offsets are relative to the start of the struct.
    pub fn structure<T: Pod>(
        name: impl Into<Cow<'static, str>>,
        offset: usize,
        members: impl Into<Box<[Property]>>,
    ) -> Self {
        Self::structure_with(name, offset, PropertyType::pod::<T>(), members)
    }

    /// Creates a nested struct property with an explicit type.
    pub fn structure_with(
        name: impl Into<Cow<'static, str>>,
        offset: usize,
        ty: PropertyType,
        members: impl Into<Box<[Property]>>,
    ) -> Self {
        Self {
            kind: PropertyKind::Struct {
                members: members.into(),
            },
            ..Self::new(name, offset, ty)
        }
    }

    /// Creates a fixed array of `count` values of type `T`.
    pub fn fixed_array<T: PropertyValue>(
        name: impl Into<Cow<'static, str>>,
        offset: usize,
        count: usize,
    ) -> Self {
        let name = name.into();
        let element = Self::scalar::<T>(name.clone(), 0);
        Self::fixed_array_of(name, offset, count, element)
    }

    /// Creates a fixed array of `count` elements described by `element`.
    ///
    /// The element's own offset is ignored; elements are laid out
    /// contiguously with a stride of `element.size()`.
    pub fn fixed_array_of(
        name: impl Into<Cow<'static, str>>,
        offset: usize,
        count: usize,
        element: Property,
    ) -> Self {
        let ty = element.ty;
        Self {
            count,
            kind: PropertyKind::FixedArray {
                element: Box::new(element.at_offset(0)),
                count,
            },
            ..Self::new(name, offset, ty)
        }
    }

    /// Creates a dynamic container occupying `byte_size` bytes of the owner.
    pub fn container(
        name: impl Into<Cow<'static, str>>,
        offset: usize,
        byte_size: usize,
        methods: ContainerMethods,
    ) -> Self {
        let align = methods.element().ty().align().max(align_of::<u32>());
        Self {
            kind: PropertyKind::Container(methods),
            ..Self::new(name, offset, PropertyType::opaque(byte_size, align))
        }
    }

    /// Creates an [`InlineVec`] container of up to `capacity` values of type `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ember_property::metadata::{InlineVec, Property};
    ///
    /// let lights = Property::inline_vec::<f32>("intensities", 0, 4);
    /// assert!(lights.is_container());
    /// assert_eq!(lights.size(), InlineVec::<f32>::byte_size(4));
    /// ```
    pub fn inline_vec<T: PropertyValue>(
        name: impl Into<Cow<'static, str>>,
        offset: usize,
        capacity: usize,
    ) -> Self {
        let name = name.into();
        let element = Self::scalar::<T>(name.clone(), 0);
        Self::inline_vec_of::<T>(name, offset, capacity, element)
    }

    /// Creates an [`InlineVec`] container whose elements are laid out as `T`
    /// and described by `element` (for example a struct with members).
    pub fn inline_vec_of<T: Pod>(
        name: impl Into<Cow<'static, str>>,
        offset: usize,
        capacity: usize,
        element: Property,
    ) -> Self {
        Self::container(
            name,
            offset,
            InlineVec::<T>::byte_size(capacity),
            ContainerMethods::inline_vec::<T>(element),
        )
    }

    /// Sets the flags.
    #[inline]
    pub fn with_flags(mut self, flags: PropertyFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets a human-readable name for tooling.
    #[inline]
    pub fn with_display_name(mut self, display_name: impl Into<Cow<'static, str>>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    #[inline]
    fn at_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Returns the property name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the display name, falling back to the name.
    #[inline]
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Returns the precomputed hash of the name.
    #[inline]
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Byte offset from the owner's (or enclosing struct's) base.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of elements: `1` for scalars, structs and containers.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// The value type. For fixed arrays this is the element type.
    #[inline]
    pub fn ty(&self) -> &PropertyType {
        &self.ty
    }

    #[inline]
    pub fn flags(&self) -> PropertyFlags {
        self.flags
    }

    #[inline]
    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    /// `true` for fixed-size arrays.
    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self.kind, PropertyKind::FixedArray { .. })
    }

    /// `true` for dynamic containers.
    #[inline]
    pub fn is_container(&self) -> bool {
        matches!(self.kind, PropertyKind::Container(_))
    }

    /// Returns the container methods of a dynamic container.
    #[inline]
    pub fn container_methods(&self) -> Option<&ContainerMethods> {
        match &self.kind {
            PropertyKind::Container(methods) => Some(methods),
            _ => None,
        }
    }

    /// Returns the element description of an array or container.
    pub fn element(&self) -> Option<&Property> {
        match &self.kind {
            PropertyKind::FixedArray { element, .. } => Some(element),
            PropertyKind::Container(methods) => Some(methods.element()),
            PropertyKind::Scalar | PropertyKind::Struct { .. } => None,
        }
    }

    /// Returns the member table of a nested struct, empty otherwise.
    #[inline]
    pub fn members(&self) -> &[Property] {
        match &self.kind {
            PropertyKind::Struct { members } => members,
            _ => &[],
        }
    }

    /// Total number of bytes the field occupies in its owner.
    pub fn size(&self) -> usize {
        match &self.kind {
            PropertyKind::FixedArray { element, count } => element.size() * count,
            _ => self.ty.size(),
        }
    }

    /// Exact name comparison with the hash as a pre-filter.
    #[inline]
    pub fn matches(&self, name: &str, hash: u32) -> bool {
        self.hash == hash && self.name == name
    }
}
