#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use ember_os as os;
pub use ember_property as property;
pub use ember_utils as utils;
