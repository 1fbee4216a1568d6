use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use ember_os::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::any::{AnyObject, AnyResult, AnyReturn, AnyType, AnyValue};
use crate::event::GenericEvent;

// -----------------------------------------------------------------------------
// StackProperty

struct Layers<T> {
    default: T,
    stack: Vec<T>,
}

impl<T> Layers<T> {
    #[inline]
    fn top(&self) -> &T {
        self.stack.last().unwrap_or(&self.default)
    }

    /// Replaces the top layer, pushing one when only the default is left.
    fn set_top(&mut self, value: T) {
        match self.stack.last_mut() {
            Some(top) => *top = value,
            None => self.stack.push(value),
        }
    }
}

/// A named value made of a default and a stack of override layers.
///
/// [`on_changed`](Self::on_changed) fires with the new effective value
/// whenever an operation changes it, after the internal lock is released.
/// Operations that leave the effective value as it was fire nothing.
///
/// # Examples
///
/// ```
/// use ember_property::stack::StackProperty;
///
/// let exposure = StackProperty::new("exposure", 1.0f32);
///
/// exposure.push_value(2.0);
/// exposure.push_value(0.5);
/// assert_eq!(exposure.value(), 0.5);
///
/// exposure.pop_value();
/// assert_eq!(exposure.value(), 2.0);
///
/// exposure.reset_value();
/// assert!(exposure.is_default());
/// assert_eq!(exposure.value(), 1.0);
/// ```
pub struct StackProperty<T> {
    name: Cow<'static, str>,
    layers: Mutex<Layers<T>>,
    on_changed: Arc<GenericEvent<T>>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> StackProperty<T> {
    pub fn new(name: impl Into<Cow<'static, str>>, default: T) -> Self {
        Self {
            name: name.into(),
            layers: Mutex::new(Layers {
                default,
                stack: Vec::new(),
            }),
            on_changed: Arc::new(GenericEvent::new()),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The event fired with the new effective value.
    #[inline]
    pub fn on_changed(&self) -> &Arc<GenericEvent<T>> {
        &self.on_changed
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, Layers<T>> {
        self.layers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `f` to the layers and notifies if the effective value changed.
    fn modify<R>(&self, f: impl FnOnce(&mut Layers<T>) -> R) -> R {
        let (result, changed) = {
            let mut layers = self.lock();
            let before = layers.top().clone();
            let result = f(&mut layers);
            let after = layers.top();
            let changed = (*after != before).then(|| after.clone());
            (result, changed)
        };
        if let Some(value) = changed {
            self.on_changed.invoke(&value);
        }
        result
    }

    /// The effective value: the top layer, or the default.
    pub fn value(&self) -> T {
        self.lock().top().clone()
    }

    pub fn default_value(&self) -> T {
        self.lock().default.clone()
    }

    pub fn set_default_value(&self, value: T) {
        self.modify(|layers| layers.default = value);
    }

    /// Pushes an override layer.
    pub fn push_value(&self, value: T) {
        self.modify(|layers| layers.stack.push(value));
    }

    /// Removes the top layer and returns it.
    pub fn pop_value(&self) -> Option<T> {
        self.modify(|layers| layers.stack.pop())
    }

    /// Replaces the top layer, or pushes one when there is none.
    pub fn set_value(&self, value: T) {
        self.modify(|layers| layers.set_top(value));
    }

    /// Removes every layer, going back to the default.
    pub fn reset_value(&self) {
        self.modify(|layers| layers.stack.clear());
    }

    /// The layers, bottom first.
    pub fn values(&self) -> Vec<T> {
        self.lock().stack.clone()
    }

    /// `true` when no layer is pushed.
    pub fn is_default(&self) -> bool {
        self.lock().stack.is_empty()
    }
}

impl<T: AnyType + PartialEq> StackProperty<T> {
    /// The effective value as a type-erased value.
    pub fn value_any(&self) -> Box<dyn AnyObject> {
        Box::new(AnyValue::new(self.value()))
    }

    /// Replaces the top layer from a type-erased value, as
    /// [`set_value`](Self::set_value) does.
    ///
    /// The layers are left untouched when the effective value would not change.
    pub fn set_from_any(&self, src: &dyn AnyObject) -> AnyResult {
        self.modify(|layers| {
            let mut value = AnyValue::new(layers.top().clone());
            let erased: &mut dyn AnyObject = &mut value;
            erased.copy_from(src)?;

            let value = value.into_inner();
            if value == *layers.top() {
                return Ok(AnyReturn::NothingToDo);
            }
            layers.set_top(value);
            Ok(AnyReturn::Success)
        })
    }
}

impl<T: fmt::Debug> fmt::Debug for StackProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layers = self.layers.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("StackProperty")
            .field("name", &self.name)
            .field("default", &layers.default)
            .field("stack", &layers.stack)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::StackProperty;
    use crate::any::{AnyError, AnyReturn, AnyValue};
    use alloc::vec;
    use alloc::vec::Vec;
    use ember_os::sync::{Arc, Mutex};

    fn observed(property: &StackProperty<i32>) -> Arc<Mutex<Vec<i32>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        property
            .on_changed()
            .add_handler(Arc::new(move |v: &i32| sink.lock().unwrap().push(*v)), None);
        seen
    }

    #[test]
    fn fires_only_when_the_effective_value_changes() {
        let p = StackProperty::new("layer", 0);
        let seen = observed(&p);

        p.push_value(1);
        p.push_value(1);
        p.set_value(2);
        assert_eq!(p.pop_value(), Some(2));
        assert_eq!(p.pop_value(), Some(1));
        assert_eq!(p.pop_value(), None);
        p.reset_value();

        assert_eq!(*seen.lock().unwrap(), [1, 2, 1, 0]);
    }

    #[test]
    fn default_changes_are_hidden_by_layers() {
        let p = StackProperty::new("layer", 0);
        let seen = observed(&p);

        p.push_value(5);
        p.set_default_value(3);
        assert_eq!(p.default_value(), 3);
        assert_eq!(p.value(), 5);
        p.reset_value();
        p.set_default_value(4);

        assert_eq!(*seen.lock().unwrap(), [5, 3, 4]);
    }

    #[test]
    fn set_value_pushes_on_empty_stack() {
        let p = StackProperty::new("layer", 0);
        p.set_value(1);
        assert!(!p.is_default());
        p.push_value(2);
        p.set_value(3);
        assert_eq!(p.values(), vec![1, 3]);
        assert_eq!(p.name(), "layer");
    }

    #[test]
    fn type_erased_access() {
        let p = StackProperty::new("layer", 0u32);
        assert_eq!(p.value_any().get_value::<u32>(), Some(0));
        assert_eq!(p.set_from_any(&AnyValue::new(0u32)), Ok(AnyReturn::NothingToDo));
        assert!(p.is_default());
        assert_eq!(p.set_from_any(&AnyValue::new(9u32)), Ok(AnyReturn::Success));
        assert_eq!(p.value(), 9);
        assert_eq!(
            p.set_from_any(&AnyValue::new(1.0f32)),
            Err(AnyError::IncompatibleType)
        );
        assert_eq!(p.value(), 9);
    }

    #[test]
    fn erased_writes_replace_the_top_layer_once() {
        let p = Arc::new(StackProperty::new("layer", 0));
        let seen = observed(&p);
        let weak = Arc::downgrade(&p);
        let effective = Arc::new(Mutex::new(Vec::new()));
        let sink = effective.clone();
        p.on_changed().add_handler(
            Arc::new(move |_: &i32| {
                let p = weak.upgrade().unwrap();
                sink.lock().unwrap().push(p.value());
            }),
            None,
        );

        p.push_value(1);
        p.push_value(2);
        assert_eq!(p.set_from_any(&AnyValue::new(7i32)), Ok(AnyReturn::Success));
        assert_eq!(p.set_from_any(&AnyValue::new(7i32)), Ok(AnyReturn::NothingToDo));
        assert_eq!(p.values(), vec![1, 7]);

        assert_eq!(*seen.lock().unwrap(), [1, 2, 7]);
        assert_eq!(*effective.lock().unwrap(), [1, 2, 7]);
    }
}
