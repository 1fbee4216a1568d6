#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(not(feature = "std"))]
compile_error!("`ember_os` currently requires the `std` feature.");

// -----------------------------------------------------------------------------
// Modules

pub mod sync;
pub mod thread;
