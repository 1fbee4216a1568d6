//! Type-erased values with runtime type compatibility.
//!
//! [`AnyObject`] is an object-safe box around one value whose concrete type
//! is only known at runtime. Reads and writes name a type `T` and succeed
//! when `T` is in the value's list of compatible types for that direction
//! ([`CompatibilityDirection`]):
//!
//! - plain values ([`AnyType`] implementations for primitives, `String` and
//!   `glam` math types) are compatible with their own type only;
//! - shared pointers to [`Interface`] implementors are additionally
//!   compatible with `Arc<dyn Interface>` and `Weak<dyn Interface>`, and
//!   read-only views ([`ConstPtr`]) may be read out of writable pointers but
//!   never written into them.
//!
//! [`ArrayAny`] adds index-based access for sequences, and [`AnyBridge`]
//! connects property storage bytes to this layer.
//!
//! # Examples
//!
//! ```
//! use ember_property::any::{AnyError, AnyObject, AnyValue};
//!
//! let mut value: Box<dyn AnyObject> = Box::new(AnyValue::new(1.5f32));
//!
//! assert!(value.set_value(2.5f32).is_ok());
//! assert_eq!(value.get_value::<f32>(), Some(2.5));
//!
//! assert_eq!(value.set_value(3u32), Err(AnyError::IncompatibleType));
//! assert_eq!(value.get_value::<f32>(), Some(2.5));
//! ```

// -----------------------------------------------------------------------------
// Modules

mod any_type;
mod array;
mod bridge;
mod error;
mod interface;
mod object;
mod value;

// -----------------------------------------------------------------------------
// Exports

pub use any_type::{AnyType, CompatibilityDirection};
pub use array::{ArrayAny, ArrayAnyValue};
pub use bridge::AnyBridge;
pub use error::{AnyError, AnyResult, AnyReturn};
pub use interface::{ConstPtr, Interface, downcast_arc};
pub use object::AnyObject;
pub use value::AnyValue;
