use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId};

use crate::any::value::convert;
use crate::any::{
    AnyError, AnyObject, AnyResult, AnyReturn, AnyType, AnyValue, CompatibilityDirection,
};

// -----------------------------------------------------------------------------
// ArrayAny

/// Index-based access to a type-erased sequence.
///
/// Indices past the end fail with [`AnyError::InvalidArgument`]. The typed
/// helpers ([`get_at`](Self::get_at), [`set_at`](Self::set_at),
/// [`insert_at`](Self::insert_at)) are inherent methods of `dyn ArrayAny`.
pub trait ArrayAny: AnyObject {
    /// Current number of elements.
    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identity of the element type.
    fn element_type(&self) -> TypeId;

    /// Compatible types of one element.
    fn element_compatible_types(&self, direction: CompatibilityDirection) -> Vec<TypeId>;

    /// Stores element `index` into `out`, an `Option<U>` slot.
    fn read_at(&self, index: usize, out: &mut dyn Any) -> bool;

    /// Replaces element `index` from `src`.
    ///
    /// Compatibility is checked by the caller.
    fn write_at(&mut self, index: usize, src: &dyn AnyObject) -> AnyResult;

    /// Inserts an element built from `src` before `index`, or appends it
    /// when `index` is `None`.
    fn insert_from(&mut self, index: Option<usize>, src: &dyn AnyObject) -> AnyResult;

    /// Removes element `index`, shifting the following elements down.
    fn remove_at(&mut self, index: usize) -> AnyResult;

    /// Removes every element.
    fn clear(&mut self) -> AnyReturn;

    /// A boxed copy of element `index`.
    fn get_any_at(&self, index: usize) -> Option<Box<dyn AnyObject>>;
}

impl dyn ArrayAny {
    /// `true` when an element can be written from a value of type `id`
    /// whose readable types are `readable`.
    fn accepts(&self, id: TypeId, readable: &[TypeId]) -> bool {
        self.element_compatible_types(CompatibilityDirection::Set)
            .contains(&id)
            || readable.contains(&self.element_type())
    }

    /// Reads element `index` as a `T`.
    ///
    /// Follows the rules of [`get_value`](AnyObject::get_value).
    pub fn get_at<T: AnyType>(&self, index: usize) -> Option<T> {
        self.get_any_at(index)?.get_value()
    }

    /// Replaces element `index` with `value`.
    #[inline]
    pub fn set_at<T: AnyType>(&mut self, index: usize, value: T) -> AnyResult {
        self.set_any_at(index, &AnyValue::new(value))
    }

    /// Inserts `value` before `index`, or appends it when `index` is `None`.
    #[inline]
    pub fn insert_at<T: AnyType>(&mut self, index: Option<usize>, value: T) -> AnyResult {
        self.insert_any_at(index, &AnyValue::new(value))
    }

    /// Replaces element `index` from another type-erased value.
    pub fn set_any_at(&mut self, index: usize, value: &dyn AnyObject) -> AnyResult {
        let readable = value.compatible_types(CompatibilityDirection::Get);
        if !self.accepts(value.type_uid(), &readable) {
            return Err(AnyError::IncompatibleType);
        }
        self.write_at(index, value)
    }

    /// Inserts a copy of another type-erased value.
    pub fn insert_any_at(&mut self, index: Option<usize>, value: &dyn AnyObject) -> AnyResult {
        let readable = value.compatible_types(CompatibilityDirection::Get);
        if !self.accepts(value.type_uid(), &readable) {
            return Err(AnyError::IncompatibleType);
        }
        self.insert_from(index, value)
    }
}

// -----------------------------------------------------------------------------
// ArrayAnyValue

/// An [`ArrayAny`] over a `Vec<T>`.
///
/// As a whole it is an [`AnyObject`] of type `Vec<T>`.
///
/// # Examples
///
/// ```
/// use ember_property::any::{ArrayAny, ArrayAnyValue};
///
/// let mut weights = ArrayAnyValue::new(vec![0.5f32, 1.0]);
/// let array: &mut dyn ArrayAny = &mut weights;
///
/// array.insert_at(None, 2.0f32).unwrap();
/// array.insert_at(Some(0), 0.0f32).unwrap();
/// array.remove_at(1).unwrap();
///
/// assert_eq!(array.len(), 3);
/// assert_eq!(array.get_at::<f32>(0), Some(0.0));
/// assert_eq!(array.get_at::<f32>(2), Some(2.0));
/// assert_eq!(weights.values(), &[0.0, 1.0, 2.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayAnyValue<T> {
    values: Vec<T>,
}

impl<T: AnyType> ArrayAnyValue<T> {
    #[inline]
    pub fn new(values: Vec<T>) -> Self {
        Self { values }
    }

    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    #[inline]
    pub fn into_inner(self) -> Vec<T> {
        self.values
    }
}

impl<T: AnyType> AnyObject for ArrayAnyValue<T> {
    #[inline]
    fn type_uid(&self) -> TypeId {
        TypeId::of::<Vec<T>>()
    }

    #[inline]
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Vec<T>>()
    }

    fn compatible_types(&self, direction: CompatibilityDirection) -> Vec<TypeId> {
        Vec::<T>::compatible_types(direction)
    }

    fn read_into(&self, out: &mut dyn Any) -> bool {
        self.values.extract(out)
    }

    fn write_from(&mut self, src: &dyn Any) -> AnyResult {
        self.values = Vec::<T>::inject(src).ok_or(AnyError::Fail)?;
        Ok(AnyReturn::Success)
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        &self.values
    }

    fn clone_any(&self) -> Box<dyn AnyObject> {
        Box::new(self.clone())
    }

    #[inline]
    fn as_array(&self) -> Option<&dyn ArrayAny> {
        Some(self)
    }

    #[inline]
    fn as_array_mut(&mut self) -> Option<&mut dyn ArrayAny> {
        Some(self)
    }
}

impl<T: AnyType> ArrayAny for ArrayAnyValue<T> {
    #[inline]
    fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    fn element_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn element_compatible_types(&self, direction: CompatibilityDirection) -> Vec<TypeId> {
        T::compatible_types(direction)
    }

    fn read_at(&self, index: usize, out: &mut dyn Any) -> bool {
        self.values.get(index).is_some_and(|value| value.extract(out))
    }

    fn write_at(&mut self, index: usize, src: &dyn AnyObject) -> AnyResult {
        let slot = self
            .values
            .get_mut(index)
            .ok_or(AnyError::InvalidArgument)?;
        *slot = convert(src).ok_or(AnyError::Fail)?;
        Ok(AnyReturn::Success)
    }

    fn insert_from(&mut self, index: Option<usize>, src: &dyn AnyObject) -> AnyResult {
        let index = index.unwrap_or(self.values.len());
        if index > self.values.len() {
            return Err(AnyError::InvalidArgument);
        }
        let value = convert(src).ok_or(AnyError::Fail)?;
        self.values.insert(index, value);
        Ok(AnyReturn::Success)
    }

    fn remove_at(&mut self, index: usize) -> AnyResult {
        if index >= self.values.len() {
            return Err(AnyError::InvalidArgument);
        }
        self.values.remove(index);
        Ok(AnyReturn::Success)
    }

    fn clear(&mut self) -> AnyReturn {
        if self.values.is_empty() {
            return AnyReturn::NothingToDo;
        }
        self.values.clear();
        AnyReturn::Success
    }

    fn get_any_at(&self, index: usize) -> Option<Box<dyn AnyObject>> {
        let value = self.values.get(index)?.clone();
        Some(Box::new(AnyValue::new(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::{ArrayAny, ArrayAnyValue};
    use crate::any::{AnyError, AnyObject, AnyReturn, AnyValue};
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn out_of_range_indices_fail() {
        let mut values = ArrayAnyValue::new(vec![1u32, 2]);
        let array: &mut dyn ArrayAny = &mut values;
        assert_eq!(array.get_at::<u32>(2), None);
        assert_eq!(array.set_at(2, 9u32), Err(AnyError::InvalidArgument));
        assert_eq!(array.insert_at(Some(3), 9u32), Err(AnyError::InvalidArgument));
        assert_eq!(array.remove_at(2), Err(AnyError::InvalidArgument));
        assert_eq!(array.len(), 2);
    }

    #[test]
    fn element_types_are_checked() {
        let mut values = ArrayAnyValue::new(vec![1u32]);
        let array: &mut dyn ArrayAny = &mut values;
        assert_eq!(array.set_at(0, 1.0f32), Err(AnyError::IncompatibleType));
        assert_eq!(array.get_at::<i32>(0), None);
        assert_eq!(
            array.insert_any_at(None, &AnyValue::new(1u64)),
            Err(AnyError::IncompatibleType)
        );
        assert_eq!(array.insert_any_at(None, &AnyValue::new(7u32)), Ok(AnyReturn::Success));
        assert_eq!(array.get_any_at(1).unwrap().get_value::<u32>(), Some(7));
    }

    #[test]
    fn whole_array_is_an_any_of_vec() {
        let mut values = ArrayAnyValue::new(vec![1i16, 2, 3]);
        let object: &mut dyn AnyObject = &mut values;
        assert_eq!(object.get_value::<Vec<i16>>(), Some(vec![1, 2, 3]));
        assert!(object.set_value(vec![4i16]).is_ok());

        let array = object.as_array_mut().unwrap();
        assert_eq!(array.len(), 1);
        assert_eq!(array.clear(), AnyReturn::Success);
        assert_eq!(array.clear(), AnyReturn::NothingToDo);
        assert!(array.is_empty());
    }

    #[test]
    fn plain_values_are_not_arrays() {
        let value: &dyn AnyObject = &AnyValue::new(1u8);
        assert!(value.as_array().is_none());
    }
}
