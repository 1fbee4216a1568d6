//! Items the exported macros expand to. Not part of the public API.

pub use alloc::boxed::Box;
pub use core::mem::offset_of;

#[doc(hidden)]
#[macro_export]
macro_rules! __property_name {
    ($field:ident) => {
        ::core::stringify!($field)
    };
    ($field:ident, $name:literal) => {
        $name
    };
}
