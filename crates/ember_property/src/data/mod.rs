//! Lock-scoped access to property values.
//!
//! [`PropertyData`] borrows a [`PropertyHandle`](crate::handle::PropertyHandle),
//! holds its read or write lock and resolves paths against the locked bytes.
//! Typed reads and writes go through [`PropertyValue`] and
//! [`PropertyValueMut`] views, which check the requested type against the
//! property's declared type before touching any byte.
//!
//! The free functions cover the common one-shot cases:
//!
//! - [`get_property_value`] / [`set_property_value`]: lock, resolve, access, unlock.
//! - [`make_scoped_handle`] / [`make_scoped_read_handle`]: lock, resolve and
//!   type-check once, then keep the lock for repeated access until dropped.
//!
//! # Examples
//!
//! ```
//! use ember_os::sync::Arc;
//! use ember_property::data::{PropertyData, make_scoped_handle};
//! use ember_property::handle::PropertyStorage;
//! use ember_property::metadata::{Property, StaticProperties};
//! use ember_os::sync::LazyLock;
//!
//! static CAMERA: LazyLock<[Property; 2]> = LazyLock::new(|| [
//!     Property::scalar::<f32>("fov", 0),
//!     Property::fixed_array::<f32>("clip", 4, 2),
//! ]);
//!
//! let owner = Arc::new(StaticProperties::new("Camera", &LazyLock::force(&CAMERA)[..]));
//! let storage = PropertyStorage::zeroed(owner, 12);
//!
//! let mut data = PropertyData::new();
//! let far = data.wlock_path(&storage, "clip[1]").unwrap();
//! data.value_mut(&far).unwrap().set(1000.0f32).unwrap();
//! assert!(data.wunlock(&storage));
//!
//! let mut fov = make_scoped_handle::<f32>(&storage, "fov").unwrap();
//! fov.set(60.0);
//! fov.update(|v| *v += 1.0);
//! assert_eq!(fov.get(), 61.0);
//! ```

// -----------------------------------------------------------------------------
// Modules

mod error;
mod helpers;
mod lock;
mod scoped;
mod view;

// -----------------------------------------------------------------------------
// Exports

pub use error::PropertyError;
pub use helpers::{get_property_value, set_property_value};
pub use lock::PropertyData;
pub use scoped::{ScopedHandle, ScopedReadHandle, make_scoped_handle, make_scoped_read_handle};
pub use view::{PropertyValue, PropertyValueMut};
