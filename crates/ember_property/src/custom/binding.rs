use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use ember_utils::hash::HashMap;

use crate::any::{AnyError, AnyObject, AnyResult, AnyType};

struct Binding {
    name: Cow<'static, str>,
    value: Box<dyn AnyObject>,
}

// -----------------------------------------------------------------------------
// CustomPropertyBindingContainer

/// Named [`AnyObject`] slots for values that do not live in a byte blob,
/// such as textures and buffers bound to a material.
///
/// The type of a slot is fixed by the value it was added with; later writes
/// go through the slot's compatibility rules.
///
/// # Examples
///
/// ```
/// use ember_property::any::{AnyError, AnyValue};
/// use ember_property::custom::CustomPropertyBindingContainer;
///
/// let mut bindings = CustomPropertyBindingContainer::new();
/// assert!(bindings.add_binding("layer", Box::new(AnyValue::new(0u32))));
///
/// assert!(bindings.set_binding_value("layer", 3u32).is_ok());
/// assert_eq!(bindings.set_binding_value("layer", 3.0f32), Err(AnyError::IncompatibleType));
/// assert_eq!(bindings.get_binding_value::<u32>("layer"), Some(3));
/// ```
#[derive(Default)]
pub struct CustomPropertyBindingContainer {
    bindings: Vec<Binding>,
    index: HashMap<String, usize>,
}

impl CustomPropertyBindingContainer {
    /// Creates an empty container.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a slot called `name` holding `value`.
    ///
    /// Returns `false` when the name is taken.
    pub fn add_binding(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        value: Box<dyn AnyObject>,
    ) -> bool {
        let name = name.into();
        if self.index.contains_key(&*name) {
            log::warn!("binding `{name}` is already registered");
            return false;
        }
        self.index.insert(String::from(&*name), self.bindings.len());
        self.bindings.push(Binding { name, value });
        true
    }

    /// The slot called `name`.
    pub fn get_binding(&self, name: &str) -> Option<&dyn AnyObject> {
        let index = *self.index.get(name)?;
        self.bindings.get(index).map(|binding| &*binding.value)
    }

    /// The slot called `name`, writable.
    pub fn get_binding_mut(&mut self, name: &str) -> Option<&mut dyn AnyObject> {
        let index = *self.index.get(name)?;
        self.bindings
            .get_mut(index)
            .map(|binding| &mut *binding.value)
    }

    /// Copies `value` into the slot called `name`.
    ///
    /// Fails with [`AnyError::InvalidArgument`] when there is no such slot.
    pub fn set_binding(&mut self, name: &str, value: &dyn AnyObject) -> AnyResult {
        self.get_binding_mut(name)
            .ok_or(AnyError::InvalidArgument)?
            .copy_from(value)
    }

    /// Writes `value` into the slot called `name`.
    ///
    /// See [`set_binding`](Self::set_binding).
    pub fn set_binding_value<T: AnyType>(&mut self, name: &str, value: T) -> AnyResult {
        self.get_binding_mut(name)
            .ok_or(AnyError::InvalidArgument)?
            .set_value(value)
    }

    /// Reads the slot called `name` as a `T`.
    pub fn get_binding_value<T: AnyType>(&self, name: &str) -> Option<T> {
        self.get_binding(name)?.get_value()
    }

    #[inline]
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Slot names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|binding| &*binding.name)
    }
}

impl fmt::Debug for CustomPropertyBindingContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.bindings
                    .iter()
                    .map(|binding| (&binding.name, binding.value.type_name())),
            )
            .finish()
    }
}
