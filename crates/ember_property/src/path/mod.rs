//! Resolve property paths to byte offsets.
//!
//! A path addresses a (possibly nested, possibly indexed) field of an owner:
//!
//! - `name` selects a top-level property,
//! - `.member` descends into a nested struct or into the element of an indexed array,
//! - `[N]` selects element `N` of a fixed array or dynamic container.
//!
//! Paths are ASCII, case-sensitive and allow no whitespace or escaping. For
//! example `lights[2].color` or `transform.position`.
//!
//! Resolution is all-or-nothing: either the full path resolves to a
//! [`PropertyOffset`], or nothing is returned. [`try_resolve`] reports
//! why resolution failed; [`resolve`] only tells whether it did.
//!
//! Fixed arrays and nested structs resolve from declared offsets alone. Dynamic
//! containers need the owner's storage to read their current length and element
//! positions, which is why the resolver takes a `storage` slice.
//!
//! # Examples
//!
//! ```
//! use ember_property::metadata::Property;
//! use ember_property::path::resolve_static;
//! use glam::Vec3;
//!
//! let table = [
//!     Property::scalar::<u32>("id", 0),
//!     Property::structure::<[f32; 4]>("transform", 4, [
//!         Property::scalar::<Vec3>("position", 0),
//!         Property::scalar::<f32>("scale", 12),
//!     ]),
//!     Property::fixed_array::<f32>("weights", 20, 4),
//! ];
//!
//! let scale = resolve_static(&table, "transform.scale").unwrap();
//! assert_eq!(scale.offset, 16);
//!
//! let weight = resolve_static(&table, "weights[3]").unwrap();
//! assert_eq!((weight.offset, weight.index), (32, 3));
//!
//! assert!(resolve_static(&table, "weights[4]").is_none());
//! assert!(resolve_static(&table, "doesNotExist").is_none());
//! ```

// -----------------------------------------------------------------------------
// Modules

mod error;
mod resolve;

// -----------------------------------------------------------------------------
// Exports

pub use error::ResolveError;
pub use resolve::{PropertyOffset, element_at, resolve, resolve_static, try_resolve};
