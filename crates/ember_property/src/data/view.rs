use alloc::boxed::Box;
use alloc::string::ToString;
use core::fmt;
use core::ops::Range;

use bytemuck::Pod;
use ember_utils::hash::hash_name;

use crate::any::{AnyObject, AnyReturn};
use crate::data::PropertyError;
use crate::metadata::{Property, PropertyFlags, PropertyKind};
use crate::path::{ResolveError, element_at};

// -----------------------------------------------------------------------------
// Checks

/// Byte range of `property` at `offset`, checked against the storage length.
pub(crate) fn field_range(
    property: &Property,
    offset: usize,
    storage_len: usize,
) -> Result<Range<usize>, PropertyError> {
    let end = offset.saturating_add(property.size());
    if end > storage_len {
        return Err(PropertyError::OutOfBounds {
            start: offset,
            end,
            size: storage_len,
        });
    }
    Ok(offset..end)
}

/// Byte range of `property` at `offset` when it can be accessed as a `T`.
///
/// Arrays and containers are never accessed as a whole.
pub(crate) fn typed_range<T: 'static>(
    property: &Property,
    offset: usize,
    storage_len: usize,
) -> Result<Range<usize>, PropertyError> {
    let whole = matches!(
        property.kind(),
        PropertyKind::Scalar | PropertyKind::Struct { .. }
    );
    if !whole || !property.ty().is::<T>() || property.ty().size() != size_of::<T>() {
        return Err(PropertyError::TypeMismatch {
            expected: core::any::type_name::<T>(),
            found: property.ty().name(),
        });
    }
    field_range(property, offset, storage_len)
}

/// Rejects writes to properties flagged [`READ_ONLY`](PropertyFlags::READ_ONLY).
pub(crate) fn check_writable(property: &Property) -> Result<(), PropertyError> {
    if property.flags().contains(PropertyFlags::READ_ONLY) {
        return Err(PropertyError::ReadOnly {
            name: property.name().to_string(),
        });
    }
    Ok(())
}

fn member<'a>(property: &'a Property, name: &str) -> Result<&'a Property, PropertyError> {
    let hash = hash_name(name);
    property
        .members()
        .iter()
        .find(|p| p.matches(name, hash))
        .ok_or_else(|| {
            PropertyError::Resolve(ResolveError::NotFound {
                name: name.to_string(),
            })
        })
}

fn element_count(property: &Property, storage: &[u8], offset: usize) -> usize {
    match property.kind() {
        PropertyKind::FixedArray { count, .. } => *count,
        PropertyKind::Container(methods) => methods.size(storage, offset),
        PropertyKind::Scalar | PropertyKind::Struct { .. } => 1,
    }
}

fn bridged_range(
    property: &Property,
    offset: usize,
    storage_len: usize,
) -> Result<Range<usize>, PropertyError> {
    if property.is_array() || property.is_container() || property.ty().bridge().is_none() {
        return Err(PropertyError::NoBridge {
            name: property.name().to_string(),
        });
    }
    field_range(property, offset, storage_len)
}

// -----------------------------------------------------------------------------
// PropertyValue

/// A read view of one property inside locked storage.
#[derive(Clone, Copy)]
pub struct PropertyValue<'a> {
    property: &'a Property,
    storage: &'a [u8],
    offset: usize,
}

impl<'a> PropertyValue<'a> {
    /// A view of `property` located at byte `offset` of `storage`.
    #[inline]
    pub fn new(property: &'a Property, storage: &'a [u8], offset: usize) -> Self {
        Self {
            property,
            storage,
            offset,
        }
    }

    #[inline]
    pub fn property(&self) -> &'a Property {
        self.property
    }

    /// Offset from the start of the storage.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The bytes of the whole field.
    pub fn bytes(&self) -> Result<&'a [u8], PropertyError> {
        let range = field_range(self.property, self.offset, self.storage.len())?;
        Ok(&self.storage[range])
    }

    /// Reads the value as a `T`, which must be the declared type.
    pub fn get<T: Pod>(&self) -> Result<T, PropertyError> {
        let range = typed_range::<T>(self.property, self.offset, self.storage.len())?;
        Ok(bytemuck::pod_read_unaligned(&self.storage[range]))
    }

    /// Element count of an array or container; `1` otherwise.
    #[inline]
    pub fn len(&self) -> usize {
        element_count(self.property, self.storage, self.offset)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A view of element `index` of an array or container.
    pub fn at(&self, index: usize) -> Result<PropertyValue<'a>, PropertyError> {
        let (element, offset) = element_at(self.property, self.storage, self.offset, index)?;
        Ok(Self::new(element, self.storage, offset))
    }

    /// A view of the struct member `name`.
    pub fn field(&self, name: &str) -> Result<PropertyValue<'a>, PropertyError> {
        let member = member(self.property, name)?;
        Ok(Self::new(member, self.storage, self.offset + member.offset()))
    }

    /// Copies the value into a type-erased box.
    pub fn to_any(&self) -> Result<Box<dyn AnyObject>, PropertyError> {
        let range = bridged_range(self.property, self.offset, self.storage.len())?;
        self.property
            .ty()
            .bridge()
            .and_then(|bridge| bridge.to_any(&self.storage[range]))
            .ok_or_else(|| PropertyError::NoBridge {
                name: self.property.name().to_string(),
            })
    }
}

impl fmt::Debug for PropertyValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyValue")
            .field("property", &self.property.name())
            .field("offset", &self.offset)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// PropertyValueMut

/// A read-write view of one property inside write-locked storage.
///
/// Writes are rejected for properties flagged
/// [`READ_ONLY`](PropertyFlags::READ_ONLY).
pub struct PropertyValueMut<'a> {
    property: &'a Property,
    storage: &'a mut [u8],
    offset: usize,
}

impl<'a> PropertyValueMut<'a> {
    /// A view of `property` located at byte `offset` of `storage`.
    #[inline]
    pub fn new(property: &'a Property, storage: &'a mut [u8], offset: usize) -> Self {
        Self {
            property,
            storage,
            offset,
        }
    }

    #[inline]
    pub fn property(&self) -> &'a Property {
        self.property
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Reborrows as a read view.
    #[inline]
    pub fn as_value(&self) -> PropertyValue<'_> {
        PropertyValue::new(self.property, &*self.storage, self.offset)
    }

    /// Reads the value as a `T`, which must be the declared type.
    #[inline]
    pub fn get<T: Pod>(&self) -> Result<T, PropertyError> {
        self.as_value().get()
    }

    /// Writes `value`; `T` must be the declared type.
    ///
    /// Nothing is written on error.
    pub fn set<T: Pod>(&mut self, value: T) -> Result<(), PropertyError> {
        check_writable(self.property)?;
        let range = typed_range::<T>(self.property, self.offset, self.storage.len())?;
        self.storage[range].copy_from_slice(bytemuck::bytes_of(&value));
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_value().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A mutable view of element `index` of an array or container.
    pub fn at(&mut self, index: usize) -> Result<PropertyValueMut<'_>, PropertyError> {
        let (element, offset) = element_at(self.property, &*self.storage, self.offset, index)?;
        Ok(PropertyValueMut::new(element, self.storage, offset))
    }

    /// A mutable view of the struct member `name`.
    pub fn field(&mut self, name: &str) -> Result<PropertyValueMut<'_>, PropertyError> {
        let member = member(self.property, name)?;
        let offset = self.offset + member.offset();
        Ok(PropertyValueMut::new(member, self.storage, offset))
    }

    /// Copies the value into a type-erased box.
    #[inline]
    pub fn to_any(&self) -> Result<Box<dyn AnyObject>, PropertyError> {
        self.as_value().to_any()
    }

    /// Writes the value from a type-erased source, converting it when the
    /// source type is compatible.
    pub fn set_from_any(&mut self, src: &dyn AnyObject) -> Result<AnyReturn, PropertyError> {
        check_writable(self.property)?;
        let range = bridged_range(self.property, self.offset, self.storage.len())?;
        let bridge = self.property.ty().bridge().ok_or_else(|| PropertyError::NoBridge {
            name: self.property.name().to_string(),
        })?;
        Ok(bridge.from_any(src, &mut self.storage[range])?)
    }
}

impl fmt::Debug for PropertyValueMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyValueMut")
            .field("property", &self.property.name())
            .field("offset", &self.offset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{PropertyValue, PropertyValueMut};
    use crate::any::{AnyReturn, AnyValue};
    use crate::data::PropertyError;
    use crate::metadata::{InlineVec, Property, PropertyFlags};
    use alloc::vec;
    use glam::{UVec2, Vec2};

    fn light() -> Property {
        Property::structure::<[f32; 4]>(
            "light",
            4,
            [
                Property::scalar::<Vec2>("pos", 0),
                Property::scalar::<f32>("range", 8),
                Property::scalar::<f32>("power", 12).with_flags(PropertyFlags::READ_ONLY),
            ],
        )
    }

    #[test]
    fn struct_members_by_name() {
        let light = light();
        let mut bytes = vec![0u8; 20];
        let mut view = PropertyValueMut::new(&light, &mut bytes, 4);

        view.field("range").unwrap().set(7.5f32).unwrap();
        view.field("pos").unwrap().set(Vec2::new(1.0, 2.0)).unwrap();
        assert_eq!(view.field("range").unwrap().get::<f32>(), Ok(7.5));
        assert!(matches!(
            view.field("missing"),
            Err(PropertyError::Resolve(_))
        ));
        assert_eq!(
            view.get::<[f32; 4]>(),
            Ok([1.0, 2.0, 7.5, 0.0])
        );
    }

    #[test]
    fn read_only_members_reject_writes() {
        let light = light();
        let mut bytes = vec![0u8; 20];
        let mut view = PropertyValueMut::new(&light, &mut bytes, 4);
        let mut power = view.field("power").unwrap();
        assert!(matches!(power.set(1.0f32), Err(PropertyError::ReadOnly { .. })));
        assert!(matches!(
            power.set_from_any(&AnyValue::new(1.0f32)),
            Err(PropertyError::ReadOnly { .. })
        ));
        assert_eq!(power.get::<f32>(), Ok(0.0));
    }

    #[test]
    fn type_mismatch_writes_nothing() {
        let p = Property::scalar::<Vec2>("vec2Val", 0);
        let mut bytes = vec![0u8; 8];
        let mut view = PropertyValueMut::new(&p, &mut bytes, 0);
        assert!(matches!(
            view.set(UVec2::new(1, 1)),
            Err(PropertyError::TypeMismatch { .. })
        ));
        assert_eq!(view.get::<Vec2>(), Ok(Vec2::ZERO));
    }

    #[test]
    fn out_of_bounds_storage() {
        let p = Property::scalar::<u32>("late", 8);
        let bytes = [0u8; 10];
        let view = PropertyValue::new(&p, &bytes, 8);
        assert_eq!(
            view.get::<u32>(),
            Err(PropertyError::OutOfBounds {
                start: 8,
                end: 12,
                size: 10
            })
        );
    }

    #[test]
    fn arrays_by_index() {
        let p = Property::fixed_array::<u32>("ids", 0, 3);
        let mut bytes = vec![0u8; 12];
        let mut view = PropertyValueMut::new(&p, &mut bytes, 0);
        assert_eq!(view.len(), 3);
        view.at(2).unwrap().set(9u32).unwrap();
        assert!(view.at(3).is_err());
        assert!(matches!(
            view.get::<u32>(),
            Err(PropertyError::TypeMismatch { .. })
        ));
        assert_eq!(u32::from_ne_bytes(bytes[8..12].try_into().unwrap()), 9);
    }

    #[test]
    fn containers_by_index() {
        let p = Property::inline_vec::<u32>("ids", 0, 4);
        let mut bytes = vec![0u8; InlineVec::<u32>::byte_size(4)];
        assert!(InlineVec::<u32>::push(&mut bytes, 0, 4, 11));
        let view = PropertyValue::new(&p, &bytes, 0);
        assert_eq!(view.len(), 1);
        assert_eq!(view.at(0).unwrap().get::<u32>(), Ok(11));
        assert!(view.at(1).is_err());
        assert!(matches!(view.to_any(), Err(PropertyError::NoBridge { .. })));
    }

    #[test]
    fn bridged_through_any() {
        let p = Property::scalar::<Vec2>("vec2Val", 0);
        let mut bytes = vec![0u8; 8];
        let mut view = PropertyValueMut::new(&p, &mut bytes, 0);

        let src = AnyValue::new(Vec2::new(2.0, 3.0));
        assert_eq!(view.set_from_any(&src), Ok(AnyReturn::Success));
        assert_eq!(view.set_from_any(&src), Ok(AnyReturn::NothingToDo));
        assert!(matches!(
            view.set_from_any(&AnyValue::new(UVec2::ONE)),
            Err(PropertyError::Any(_))
        ));
        assert_eq!(
            view.to_any().unwrap().get_value::<Vec2>(),
            Some(Vec2::new(2.0, 3.0))
        );
    }
}
