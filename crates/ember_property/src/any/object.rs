use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use crate::any::{AnyError, AnyResult, AnyType, AnyValue, ArrayAny, CompatibilityDirection};

// -----------------------------------------------------------------------------
// AnyObject

/// An object-safe, type-erased value.
///
/// Implementors expose the raw conversion hooks; the typed operations
/// ([`get_value`](Self::get_value), [`set_value`](Self::set_value),
/// [`copy_from`](Self::copy_from)) are inherent methods of `dyn AnyObject`
/// and check compatibility before calling them.
pub trait AnyObject: Send + Sync + 'static {
    /// Identity of the stored type.
    fn type_uid(&self) -> TypeId;

    /// Name of the stored type, for diagnostics.
    fn type_name(&self) -> &'static str;

    /// Types the value can be read as ([`Get`](CompatibilityDirection::Get))
    /// or written from ([`Set`](CompatibilityDirection::Set)).
    fn compatible_types(&self, direction: CompatibilityDirection) -> Vec<TypeId>;

    /// `true` when writes are rejected with [`AnyError::ReadOnly`].
    fn is_read_only(&self) -> bool {
        false
    }

    /// Stores the value into `out`, an `Option<U>` slot of a readable type.
    fn read_into(&self, out: &mut dyn Any) -> bool;

    /// Replaces the value from `src`, a value of a writable type.
    ///
    /// Does not check [`is_read_only`](Self::is_read_only).
    fn write_from(&mut self, src: &dyn Any) -> AnyResult;

    /// Replaces the value from another type-erased value.
    ///
    /// Compatibility is checked by the caller. The default only tries
    /// [`write_from`](Self::write_from) on the source's stored value.
    fn assign_from(&mut self, src: &dyn AnyObject) -> AnyResult {
        self.write_from(src.as_any())
    }

    /// The stored value itself.
    fn as_any(&self) -> &dyn Any;

    /// A boxed copy of `self`.
    fn clone_any(&self) -> Box<dyn AnyObject>;

    /// Index-based access, for array values.
    fn as_array(&self) -> Option<&dyn ArrayAny> {
        None
    }

    /// Mutable index-based access, for array values.
    fn as_array_mut(&mut self) -> Option<&mut dyn ArrayAny> {
        None
    }
}

impl dyn AnyObject {
    /// `true` if a `T` can be read out of `self`.
    ///
    /// Either the stored type lists `T` as readable, or `T` lists the
    /// stored type as a source. The latter lets a concrete interface
    /// pointer be read back out of a base-interface slot.
    pub fn is_get_compatible_with<T: AnyType>(&self) -> bool {
        self.compatible_types(CompatibilityDirection::Get)
            .contains(&TypeId::of::<T>())
            || T::compatible_types(CompatibilityDirection::Set).contains(&self.type_uid())
    }

    /// `true` if `self` can be written from a `T`.
    ///
    /// Either the stored type accepts `T`, or `T` can be read as the
    /// stored type.
    pub fn is_set_compatible_with<T: AnyType>(&self) -> bool {
        self.compatible_types(CompatibilityDirection::Set)
            .contains(&TypeId::of::<T>())
            || T::compatible_types(CompatibilityDirection::Get).contains(&self.type_uid())
    }

    /// Reads the value as a `T`.
    ///
    /// `None` when `T` is not get-compatible, or when the conversion
    /// fails (an expired weak pointer, for example).
    pub fn get_value<T: AnyType>(&self) -> Option<T> {
        if !self.is_get_compatible_with::<T>() {
            return None;
        }
        let mut slot: Option<T> = None;
        if self.read_into(&mut slot) {
            return slot;
        }
        T::inject(self.as_any())
    }

    /// Writes `value`, copying it.
    pub fn set_value<T: AnyType>(&mut self, value: T) -> AnyResult {
        if self.is_read_only() {
            return Err(AnyError::ReadOnly);
        }
        if !self.is_set_compatible_with::<T>() {
            return Err(AnyError::IncompatibleType);
        }
        self.assign_from(&AnyValue::new(value))
    }

    /// Copies the value of another type-erased value.
    pub fn copy_from(&mut self, src: &dyn AnyObject) -> AnyResult {
        if self.is_read_only() {
            return Err(AnyError::ReadOnly);
        }
        let accepted = self
            .compatible_types(CompatibilityDirection::Set)
            .contains(&src.type_uid())
            || src
                .compatible_types(CompatibilityDirection::Get)
                .contains(&self.type_uid());
        if !accepted {
            return Err(AnyError::IncompatibleType);
        }
        self.assign_from(src)
    }
}

impl fmt::Debug for dyn AnyObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyObject")
            .field("type", &self.type_name())
            .field("read_only", &self.is_read_only())
            .finish_non_exhaustive()
    }
}

impl Clone for Box<dyn AnyObject> {
    #[inline]
    fn clone(&self) -> Self {
        self.clone_any()
    }
}

#[cfg(test)]
mod tests {
    use crate::any::{AnyError, AnyObject, AnyReturn, AnyValue, ArrayAny, ArrayAnyValue};
    use crate::any::{ConstPtr, Interface};
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec::Vec;
    use ember_os::sync::{Arc, Weak};
    use glam::{UVec2, Vec2};

    #[derive(Debug, PartialEq)]
    struct Texture(u32);
    impl Interface for Texture {}

    #[derive(Debug)]
    struct Sampler;
    impl Interface for Sampler {}

    fn base_slot() -> AnyValue<Arc<dyn Interface>> {
        let sampler: Arc<dyn Interface> = Arc::new(Sampler);
        AnyValue::new(sampler)
    }

    #[test]
    fn mismatched_set_leaves_value_untouched() {
        let mut value: Box<dyn AnyObject> = Box::new(AnyValue::new(Vec2::new(1.0, 2.0)));
        assert_eq!(value.set_value(UVec2::ONE), Err(AnyError::IncompatibleType));
        assert_eq!(value.get_value::<Vec2>(), Some(Vec2::new(1.0, 2.0)));
        assert_eq!(value.get_value::<UVec2>(), None);
    }

    #[test]
    fn copy_between_erased_values() {
        let src: Box<dyn AnyObject> = Box::new(AnyValue::new(String::from("albedo")));
        let mut dst: Box<dyn AnyObject> = Box::new(AnyValue::new(String::new()));
        assert_eq!(dst.copy_from(&*src), Ok(AnyReturn::Success));
        assert_eq!(dst.get_value::<String>().as_deref(), Some("albedo"));

        let mut number: Box<dyn AnyObject> = Box::new(AnyValue::new(0u32));
        assert_eq!(number.copy_from(&*src), Err(AnyError::IncompatibleType));
    }

    #[test]
    fn read_only_values_are_sources_only() {
        let constant: Box<dyn AnyObject> = Box::new(AnyValue::read_only(4i32));
        let mut target: Box<dyn AnyObject> = Box::new(AnyValue::new(0i32));

        assert_eq!(target.copy_from(&*constant), Ok(AnyReturn::Success));
        assert_eq!(target.get_value::<i32>(), Some(4));

        let mut constant = constant;
        assert_eq!(constant.set_value(5i32), Err(AnyError::ReadOnly));
        assert_eq!(constant.copy_from(&*target), Err(AnyError::ReadOnly));
        assert_eq!(constant.get_value::<i32>(), Some(4));
    }

    #[test]
    fn boxed_values_clone_deeply() {
        let mut a: Box<dyn AnyObject> = Box::new(AnyValue::new(1u8));
        let b = a.clone();
        a.set_value(2u8).unwrap();
        assert_eq!(b.get_value::<u8>(), Some(1));
        assert_eq!(b.type_uid(), a.type_uid());
    }

    #[test]
    fn concrete_pointer_into_base_slot() {
        let mut slot = base_slot();
        let slot: &mut dyn AnyObject = &mut slot;

        assert!(slot.is_set_compatible_with::<Arc<Texture>>());
        assert_eq!(slot.set_value(Arc::new(Texture(3))), Ok(AnyReturn::Success));
        assert!(slot.get_value::<Arc<dyn Interface>>().unwrap().is::<Texture>());

        let source: &dyn AnyObject = &AnyValue::new(Arc::new(Texture(4)));
        assert_eq!(slot.copy_from(source), Ok(AnyReturn::Success));
        assert_eq!(*slot.get_value::<Arc<Texture>>().unwrap(), Texture(4));
    }

    #[test]
    fn concrete_pointer_out_of_base_slot() {
        let texture = Arc::new(Texture(2));
        let erased: Arc<dyn Interface> = texture.clone();
        let slot: &dyn AnyObject = &AnyValue::new(erased);

        assert!(slot.is_get_compatible_with::<Arc<Texture>>());
        let back = slot.get_value::<Arc<Texture>>().unwrap();
        assert!(Arc::ptr_eq(&back, &texture));
        assert_eq!(*slot.get_value::<ConstPtr<Texture>>().unwrap(), Texture(2));

        // Compatible by type, but the object is not a sampler.
        assert!(slot.is_get_compatible_with::<Arc<Sampler>>());
        assert!(slot.get_value::<Arc<Sampler>>().is_none());
    }

    #[test]
    fn weak_base_slot_follows_concrete_pointers() {
        let texture = Arc::new(Texture(5));
        let empty: Weak<dyn Interface> = Weak::<Sampler>::new();
        let mut slot = AnyValue::new(empty);
        let slot: &mut dyn AnyObject = &mut slot;

        assert_eq!(slot.set_value(texture.clone()), Ok(AnyReturn::Success));
        let back = slot.get_value::<Arc<Texture>>().unwrap();
        assert!(Arc::ptr_eq(&back, &texture));

        drop(back);
        drop(texture);
        assert!(slot.get_value::<Arc<Texture>>().is_none());
    }

    #[test]
    fn const_base_slot_takes_concrete_pointers() {
        let mut slot = AnyValue::new(ConstPtr::new(base_slot().into_inner()));
        let slot: &mut dyn AnyObject = &mut slot;

        assert_eq!(slot.set_value(Arc::new(Texture(6))), Ok(AnyReturn::Success));
        assert_eq!(*slot.get_value::<ConstPtr<Texture>>().unwrap(), Texture(6));

        let read_only = ConstPtr::new(Arc::new(Texture(7)));
        assert_eq!(slot.set_value(read_only), Ok(AnyReturn::Success));
        assert_eq!(*slot.get_value::<ConstPtr<Texture>>().unwrap(), Texture(7));

        // A read-only pointer never turns back into a shared one.
        assert!(slot.get_value::<Arc<Texture>>().is_none());
        assert!(slot.get_value::<Arc<dyn Interface>>().is_none());
    }

    #[test]
    fn unrelated_types_stay_incompatible() {
        let mut shared = base_slot();
        let shared: &mut dyn AnyObject = &mut shared;
        let read_only = ConstPtr::new(Arc::new(Texture(1)));
        assert!(!shared.is_set_compatible_with::<ConstPtr<Texture>>());
        assert_eq!(shared.set_value(read_only), Err(AnyError::IncompatibleType));
        assert_eq!(shared.set_value(1u32), Err(AnyError::IncompatibleType));

        let mut texture = AnyValue::new(Arc::new(Texture(1)));
        let texture: &mut dyn AnyObject = &mut texture;
        assert!(!texture.is_set_compatible_with::<Arc<Sampler>>());
        assert_eq!(texture.set_value(Arc::new(Sampler)), Err(AnyError::IncompatibleType));
        assert_eq!(texture.copy_from(&base_slot()), Err(AnyError::Fail));
        assert_eq!(*texture.get_value::<Arc<Texture>>().unwrap(), Texture(1));
    }

    #[test]
    fn base_pointer_arrays_take_concrete_elements() {
        let mut values = ArrayAnyValue::<Arc<dyn Interface>>::new(Vec::new());
        let array: &mut dyn ArrayAny = &mut values;

        assert_eq!(array.insert_at(None, Arc::new(Texture(8))), Ok(AnyReturn::Success));
        assert_eq!(array.insert_at(Some(0), Arc::new(Sampler)), Ok(AnyReturn::Success));
        assert_eq!(*array.get_at::<Arc<Texture>>(1).unwrap(), Texture(8));
        assert!(array.get_at::<Arc<Texture>>(0).is_none());
        assert_eq!(array.set_at(0, 3u8), Err(AnyError::IncompatibleType));
    }
}
