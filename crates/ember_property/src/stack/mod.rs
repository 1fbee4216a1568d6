//! Layered values that notify on change.
//!
//! A [`StackProperty`] resolves to the top of a stack of pushed values, or
//! to its default value when the stack is empty. Systems that temporarily
//! override a setting push a layer and pop it when done; whoever observes
//! the property only sees the effective value change.

mod property;

pub use property::StackProperty;
