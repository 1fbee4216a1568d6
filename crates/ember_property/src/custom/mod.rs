//! Owners whose property tables are built at runtime.
//!
//! [`CustomPropertyPodContainer`] reserves one byte blob up-front and
//! registers offset-based properties on top of it, the way shader custom
//! parameters are declared by the material that uses them. It is its own
//! [`PropertyHandle`](crate::handle::PropertyHandle), so paths,
//! [`PropertyData`](crate::PropertyData) and the typed helpers work on it
//! unchanged.
//!
//! [`CustomPropertyBindingContainer`] holds values that are not plain bytes,
//! such as resource references, as named [`AnyObject`](crate::any::AnyObject)
//! slots.
//!
//! # Examples
//!
//! ```
//! use ember_property::custom::CustomPropertyPodContainer;
//! use glam::Vec3;
//!
//! let mut params = CustomPropertyPodContainer::new(32);
//! params.push_property::<f32>("exposure").unwrap();
//! params.push_property::<Vec3>("tint").unwrap();
//!
//! assert!(params.set_value("tint", Vec3::new(1.0, 0.5, 0.25)));
//! assert_eq!(params.get_value::<Vec3>("tint"), Some(Vec3::new(1.0, 0.5, 0.25)));
//! ```

mod binding;
mod pod;

pub use binding::CustomPropertyBindingContainer;
pub use pod::CustomPropertyPodContainer;
