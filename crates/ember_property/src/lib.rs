#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Extern Self

// Lets the exported macros name `ember_property` inside this crate's own tests.
extern crate self as ember_property;

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod any;
pub mod custom;
pub mod data;
pub mod event;
pub mod handle;
pub mod metadata;
pub mod path;
pub mod stack;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use data::PropertyData;
pub use metadata::{Property, PropertyApi};
pub use path::PropertyOffset;
