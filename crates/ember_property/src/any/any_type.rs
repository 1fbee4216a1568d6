use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::any::{Any, TypeId};

// -----------------------------------------------------------------------------
// CompatibilityDirection

/// The direction a compatibility check is made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompatibilityDirection {
    /// Types a value can be read out as.
    Get,
    /// Types a value can be written from.
    Set,
    /// Types usable in both directions.
    Both,
}

impl CompatibilityDirection {
    /// Picks the list matching `self` out of the read and write lists.
    ///
    /// [`Both`](Self::Both) yields the types present in both lists.
    pub fn select(self, get: &[TypeId], set: &[TypeId]) -> Vec<TypeId> {
        match self {
            Self::Get => get.to_vec(),
            Self::Set => set.to_vec(),
            Self::Both => get.iter().copied().filter(|id| set.contains(id)).collect(),
        }
    }
}

// -----------------------------------------------------------------------------
// AnyType

/// A value type usable with the `any` layer.
///
/// The default methods make a type compatible with itself only. Pointer-like
/// types override them to accept and produce related pointer types.
///
/// # Examples
///
/// ```
/// use core::any::TypeId;
/// use ember_property::any::{AnyType, CompatibilityDirection};
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Tag(u8);
///
/// impl AnyType for Tag {}
///
/// assert_eq!(
///     Tag::compatible_types(CompatibilityDirection::Get),
///     vec![TypeId::of::<Tag>()],
/// );
/// ```
pub trait AnyType: Clone + Send + Sync + 'static {
    /// Every type `Self` can be read out as, or written from.
    fn compatible_types(direction: CompatibilityDirection) -> Vec<TypeId> {
        let _ = direction;
        vec![TypeId::of::<Self>()]
    }

    /// Writes a copy of `self` into `out`, an `Option<U>` slot for one of
    /// the readable types `U`.
    ///
    /// Returns `false` when the slot type is not supported or the
    /// conversion fails.
    fn extract(&self, out: &mut dyn Any) -> bool {
        put(out, || self.clone())
    }

    /// Builds a value from `src`, a value of one of the writable types.
    fn inject(src: &dyn Any) -> Option<Self> {
        src.downcast_ref::<Self>().cloned()
    }
}

/// Stores `value()` into `out` when `out` is an `Option<U>` slot.
#[inline]
pub(crate) fn put<U: 'static>(out: &mut dyn Any, value: impl FnOnce() -> U) -> bool {
    match out.downcast_mut::<Option<U>>() {
        Some(slot) => {
            *slot = Some(value());
            true
        }
        None => false,
    }
}

macro_rules! impl_any_type {
    ($($ty:ty),* $(,)?) => {
        $( impl AnyType for $ty {} )*
    };
}

impl_any_type!(
    bool, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, char, String,
);

impl_any_type!(
    glam::Vec2,
    glam::Vec3,
    glam::Vec4,
    glam::UVec2,
    glam::UVec3,
    glam::UVec4,
    glam::IVec2,
    glam::IVec3,
    glam::IVec4,
    glam::DVec2,
    glam::DVec3,
    glam::DVec4,
    glam::Quat,
    glam::Mat2,
    glam::Mat3,
    glam::Mat4,
);

impl<T: AnyType, const N: usize> AnyType for [T; N] {}

impl<T: AnyType> AnyType for Vec<T> {}

#[cfg(test)]
mod tests {
    use super::{AnyType, CompatibilityDirection};
    use alloc::string::String;
    use core::any::{Any, TypeId};

    #[test]
    fn value_types_are_compatible_with_themselves() {
        for direction in [
            CompatibilityDirection::Get,
            CompatibilityDirection::Set,
            CompatibilityDirection::Both,
        ] {
            assert_eq!(u32::compatible_types(direction), [TypeId::of::<u32>()]);
        }
    }

    #[test]
    fn extract_fills_matching_slot_only() {
        let mut slot: Option<String> = None;
        assert!(String::from("x").extract(&mut slot));
        assert_eq!(slot.as_deref(), Some("x"));

        let mut wrong: Option<u32> = None;
        assert!(!String::from("x").extract(&mut wrong));
        assert!(wrong.is_none());
    }

    #[test]
    fn inject_requires_exact_type() {
        let src: &dyn Any = &7i32;
        assert_eq!(i32::inject(src), Some(7));
        assert_eq!(i64::inject(src), None);
    }

    #[test]
    fn both_is_the_intersection() {
        let a = TypeId::of::<u8>();
        let b = TypeId::of::<u16>();
        let c = TypeId::of::<u32>();
        assert_eq!(CompatibilityDirection::Both.select(&[a, b], &[b, c]), [b]);
        assert_eq!(CompatibilityDirection::Get.select(&[a, b], &[b, c]), [a, b]);
    }
}
