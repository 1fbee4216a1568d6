use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;
use core::ops::Deref;

use ember_os::sync::{Arc, Weak};

use crate::any::any_type::put;
use crate::any::{AnyType, CompatibilityDirection};

// -----------------------------------------------------------------------------
// Interface

/// The base of shared objects reached through type-erased pointers.
///
/// Implementing it makes `Arc<T>` and [`ConstPtr<T>`] interchangeable with
/// `Arc<dyn Interface>`, `Weak<dyn Interface>` and `ConstPtr<dyn Interface>`
/// in the `any` layer.
pub trait Interface: Any + Send + Sync {
    /// A name for diagnostics.
    fn interface_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

impl dyn Interface {
    /// Returns `true` if the concrete type is `T`.
    #[inline]
    pub fn is<T: Interface>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }

    /// Borrows the concrete `T`, if that is what `self` is.
    #[inline]
    pub fn downcast_ref<T: Interface>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref()
    }
}

impl fmt::Debug for dyn Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Interface")
            .field(&self.interface_name())
            .finish()
    }
}

/// Recovers the concrete `Arc<T>` behind an interface pointer.
pub fn downcast_arc<T: Interface>(arc: Arc<dyn Interface>) -> Option<Arc<T>> {
    let any: Arc<dyn Any + Send + Sync> = arc;
    any.downcast::<T>().ok()
}

// -----------------------------------------------------------------------------
// ConstPtr

/// A shared pointer that only grants shared access to its target.
///
/// It can be read out of a writable `Arc<T>` slot, but a `ConstPtr` is never
/// accepted as the source of a write into one.
pub struct ConstPtr<T: ?Sized>(Arc<T>);

impl<T: ?Sized> ConstPtr<T> {
    #[inline]
    pub fn new(arc: Arc<T>) -> Self {
        Self(arc)
    }

    /// `true` if both point to the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Interface> ConstPtr<T> {
    /// Erases the concrete type.
    #[inline]
    pub fn to_interface(&self) -> ConstPtr<dyn Interface> {
        ConstPtr(self.0.clone())
    }
}

impl<T: ?Sized> Clone for ConstPtr<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: ?Sized> Deref for ConstPtr<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized> From<Arc<T>> for ConstPtr<T> {
    #[inline]
    fn from(arc: Arc<T>) -> Self {
        Self(arc)
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for ConstPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConstPtr").field(&&*self.0).finish()
    }
}

// -----------------------------------------------------------------------------
// AnyType implementations

fn id<T: ?Sized + 'static>() -> TypeId {
    TypeId::of::<T>()
}

fn erase<T: Interface>(arc: &Arc<T>) -> Arc<dyn Interface> {
    arc.clone()
}

/// Converts any writable-pointer source into the shared interface pointer.
fn interface_from(src: &dyn Any) -> Option<Arc<dyn Interface>> {
    if let Some(arc) = src.downcast_ref::<Arc<dyn Interface>>() {
        return Some(arc.clone());
    }
    src.downcast_ref::<Weak<dyn Interface>>()?.upgrade()
}

impl<T: Interface> AnyType for Arc<T> {
    fn compatible_types(direction: CompatibilityDirection) -> Vec<TypeId> {
        direction.select(
            &[
                id::<Arc<T>>(),
                id::<Arc<dyn Interface>>(),
                id::<Weak<dyn Interface>>(),
                id::<ConstPtr<T>>(),
                id::<ConstPtr<dyn Interface>>(),
            ],
            &[
                id::<Arc<T>>(),
                id::<Arc<dyn Interface>>(),
                id::<Weak<dyn Interface>>(),
            ],
        )
    }

    fn extract(&self, out: &mut dyn Any) -> bool {
        put(out, || self.clone())
            || put(out, || erase(self))
            || put(out, || Arc::downgrade(&erase(self)))
            || put(out, || ConstPtr(self.clone()))
            || put(out, || ConstPtr(erase(self)))
    }

    fn inject(src: &dyn Any) -> Option<Self> {
        if let Some(arc) = src.downcast_ref::<Arc<T>>() {
            return Some(arc.clone());
        }
        downcast_arc(interface_from(src)?)
    }
}

impl<T: Interface> AnyType for ConstPtr<T> {
    fn compatible_types(direction: CompatibilityDirection) -> Vec<TypeId> {
        direction.select(
            &[id::<ConstPtr<T>>(), id::<ConstPtr<dyn Interface>>()],
            &[
                id::<ConstPtr<T>>(),
                id::<Arc<T>>(),
                id::<ConstPtr<dyn Interface>>(),
                id::<Arc<dyn Interface>>(),
                id::<Weak<dyn Interface>>(),
            ],
        )
    }

    fn extract(&self, out: &mut dyn Any) -> bool {
        put(out, || self.clone()) || put(out, || self.to_interface())
    }

    fn inject(src: &dyn Any) -> Option<Self> {
        if let Some(ptr) = src.downcast_ref::<ConstPtr<T>>() {
            return Some(ptr.clone());
        }
        if let Some(arc) = src.downcast_ref::<Arc<T>>() {
            return Some(ConstPtr(arc.clone()));
        }
        let erased = match src.downcast_ref::<ConstPtr<dyn Interface>>() {
            Some(ptr) => ptr.0.clone(),
            None => interface_from(src)?,
        };
        downcast_arc(erased).map(ConstPtr)
    }
}

impl AnyType for Arc<dyn Interface> {
    fn compatible_types(direction: CompatibilityDirection) -> Vec<TypeId> {
        direction.select(
            &[
                id::<Arc<dyn Interface>>(),
                id::<Weak<dyn Interface>>(),
                id::<ConstPtr<dyn Interface>>(),
            ],
            &[id::<Arc<dyn Interface>>(), id::<Weak<dyn Interface>>()],
        )
    }

    fn extract(&self, out: &mut dyn Any) -> bool {
        put(out, || self.clone())
            || put(out, || Arc::downgrade(self))
            || put(out, || ConstPtr(self.clone()))
    }

    fn inject(src: &dyn Any) -> Option<Self> {
        interface_from(src)
    }
}

impl AnyType for Weak<dyn Interface> {
    fn compatible_types(direction: CompatibilityDirection) -> Vec<TypeId> {
        let ids = [id::<Weak<dyn Interface>>(), id::<Arc<dyn Interface>>()];
        direction.select(&ids, &ids)
    }

    fn extract(&self, out: &mut dyn Any) -> bool {
        if put(out, || self.clone()) {
            return true;
        }
        match out.downcast_mut::<Option<Arc<dyn Interface>>>() {
            Some(slot) => {
                *slot = self.upgrade();
                slot.is_some()
            }
            None => false,
        }
    }

    fn inject(src: &dyn Any) -> Option<Self> {
        if let Some(weak) = src.downcast_ref::<Weak<dyn Interface>>() {
            return Some(weak.clone());
        }
        src.downcast_ref::<Arc<dyn Interface>>().map(Arc::downgrade)
    }
}

impl AnyType for ConstPtr<dyn Interface> {
    fn compatible_types(direction: CompatibilityDirection) -> Vec<TypeId> {
        direction.select(
            &[id::<ConstPtr<dyn Interface>>()],
            &[id::<ConstPtr<dyn Interface>>(), id::<Arc<dyn Interface>>()],
        )
    }

    fn inject(src: &dyn Any) -> Option<Self> {
        if let Some(ptr) = src.downcast_ref::<ConstPtr<dyn Interface>>() {
            return Some(ptr.clone());
        }
        src.downcast_ref::<Arc<dyn Interface>>()
            .map(|arc| ConstPtr(arc.clone()))
    }
}
