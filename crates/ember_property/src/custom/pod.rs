use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use bytemuck::Pod;
use ember_os::sync::{Arc, PoisonError, RwLock};
use ember_utils::hash::HashMap;

use crate::data::{get_property_value, set_property_value};
use crate::event::GenericEvent;
use crate::handle::{PropertyHandle, ReadLock, WriteLock, read_bytes, write_bytes};
use crate::metadata::{Property, PropertyApi, PropertyType, PropertyValue};

const TYPE_NAME: &str = "CustomPropertyPodContainer";

// -----------------------------------------------------------------------------
// CustomPropertyPodContainer

/// A fixed-capacity byte blob with a property table built at runtime.
///
/// The blob is reserved once by [`new`](Self::new) and never grows;
/// properties that would not fit are rejected. The container is both the
/// metadata ([`PropertyApi`]) and the storage ([`PropertyHandle`]) of its
/// values, and [`size`](PropertyHandle::size) is the reserved size, so it
/// never takes the lock.
///
/// Registering properties needs `&mut self`, which keeps the table frozen
/// while any lock or resolved offset borrows the container.
pub struct CustomPropertyPodContainer {
    properties: Vec<Property>,
    index: HashMap<String, usize>,
    reserved: usize,
    used: usize,
    bytes: RwLock<Box<[u8]>>,
    on_write: Arc<GenericEvent<()>>,
}

impl CustomPropertyPodContainer {
    /// Creates an empty container with `reserve` zeroed bytes.
    pub fn new(reserve: usize) -> Self {
        Self {
            properties: Vec::new(),
            index: HashMap::default(),
            reserved: reserve,
            used: 0,
            bytes: RwLock::new(vec![0u8; reserve].into_boxed_slice()),
            on_write: Arc::new(GenericEvent::new()),
        }
    }

    /// Registers `property`.
    ///
    /// Returns `false` when the name is taken or the field does not fit in
    /// the reserved bytes.
    pub fn add_property(&mut self, property: Property) -> bool {
        if self.index.contains_key(property.name()) {
            log::warn!("custom property `{}` is already registered", property.name());
            return false;
        }
        let end = property.offset().checked_add(property.size());
        let Some(end) = end.filter(|&end| end <= self.reserved) else {
            log::warn!(
                "custom property `{}` does not fit in {} reserved bytes",
                property.name(),
                self.reserved,
            );
            return false;
        };

        self.used = self.used.max(end);
        self.index
            .insert(String::from(property.name()), self.properties.len());
        self.properties.push(property);
        true
    }

    /// Registers a scalar property of type `ty` at `offset`.
    ///
    /// See [`add_property`](Self::add_property).
    pub fn add_offset_property(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        display_name: Option<Cow<'static, str>>,
        offset: usize,
        ty: PropertyType,
    ) -> bool {
        let mut property = Property::new(name, offset, ty);
        if let Some(display_name) = display_name {
            property = property.with_display_name(display_name);
        }
        self.add_property(property)
    }

    /// Appends a property of type `T` after the used bytes, aligned for `T`.
    ///
    /// Returns its offset.
    ///
    /// # Examples
    ///
    /// ```
    /// use ember_property::custom::CustomPropertyPodContainer;
    ///
    /// let mut params = CustomPropertyPodContainer::new(16);
    /// assert_eq!(params.push_property::<u8>("mode"), Some(0));
    /// assert_eq!(params.push_property::<f32>("gain"), Some(4));
    /// assert_eq!(params.used_size(), 8);
    /// ```
    pub fn push_property<T: PropertyValue>(
        &mut self,
        name: impl Into<Cow<'static, str>>,
    ) -> Option<usize> {
        let offset = self.used.next_multiple_of(align_of::<T>());
        self.add_offset_property(name, None, offset, PropertyType::of::<T>())
            .then_some(offset)
    }

    /// The registered property called `name`.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.index
            .get(name)
            .and_then(|&index| self.properties.get(index))
    }

    /// Reads the value at `path`; see [`get_property_value`].
    #[inline]
    pub fn get_value<T: Pod>(&self, path: &str) -> Option<T> {
        get_property_value(self, path)
    }

    /// Writes the value at `path`; see [`set_property_value`].
    ///
    /// Fires [`on_write`](Self::on_write) after a successful write, once the
    /// lock is released.
    pub fn set_value<T: Pod>(&self, path: &str, value: T) -> bool {
        let written = set_property_value(self, path, value);
        if written {
            self.on_write.invoke(&());
        }
        written
    }

    /// Read-locks the whole blob.
    #[inline]
    pub fn data(&self) -> Option<ReadLock<'_>> {
        self.rlock()
    }

    /// Direct access to the whole blob.
    ///
    /// Exclusive access needs no lock. Writes made here do not fire
    /// [`on_write`](Self::on_write).
    pub fn data_mut(&mut self) -> &mut [u8] {
        let bytes = self.bytes.get_mut().unwrap_or_else(PoisonError::into_inner);
        &mut bytes[..]
    }

    /// Bytes up to the end of the last registered property.
    #[inline]
    pub fn used_size(&self) -> usize {
        self.used
    }

    /// Bytes reserved by [`new`](Self::new).
    #[inline]
    pub fn reserved_size(&self) -> usize {
        self.reserved
    }

    /// Fired after every successful [`set_value`](Self::set_value).
    #[inline]
    pub fn on_write(&self) -> &Arc<GenericEvent<()>> {
        &self.on_write
    }
}

impl PropertyApi for CustomPropertyPodContainer {
    #[inline]
    fn meta_data(&self) -> &[Property] {
        &self.properties
    }

    #[inline]
    fn type_name(&self) -> &str {
        TYPE_NAME
    }
}

impl PropertyHandle for CustomPropertyPodContainer {
    #[inline]
    fn owner(&self) -> &dyn PropertyApi {
        self
    }

    #[inline]
    fn size(&self) -> usize {
        self.reserved
    }

    #[inline]
    fn rlock(&self) -> Option<ReadLock<'_>> {
        read_bytes(&self.bytes, TYPE_NAME)
    }

    #[inline]
    fn wlock(&self) -> Option<WriteLock<'_>> {
        write_bytes(&self.bytes, TYPE_NAME)
    }
}

impl fmt::Debug for CustomPropertyPodContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(TYPE_NAME)
            .field("properties", &self.properties.len())
            .field("used", &self.used)
            .field("reserved", &self.reserved)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::CustomPropertyPodContainer;
    use crate::PropertyData;
    use crate::handle::PropertyHandle;
    use crate::metadata::{Property, PropertyApi, PropertyFlags, PropertyType};
    use ember_os::sync::Arc;
    use ember_os::sync::atomic::{AtomicUsize, Ordering};
    use glam::Vec3;

    #[test]
    fn push_aligns_offsets() {
        let mut c = CustomPropertyPodContainer::new(64);
        assert_eq!(c.push_property::<u8>("flag"), Some(0));
        assert_eq!(c.push_property::<f32>("gain"), Some(4));
        assert_eq!(c.push_property::<Vec3>("tint"), Some(8));
        assert_eq!(c.push_property::<u64>("seed"), Some(24));
        assert_eq!(c.used_size(), 32);
        assert_eq!(c.reserved_size(), 64);
        assert_eq!(c.property_count(), 4);
        assert_eq!(c.property("seed").unwrap().offset(), 24);
    }

    #[test]
    fn capacity_and_duplicates_are_enforced() {
        let mut c = CustomPropertyPodContainer::new(8);
        assert_eq!(c.push_property::<u32>("a"), Some(0));
        assert_eq!(c.push_property::<u32>("b"), Some(4));
        assert_eq!(c.push_property::<u32>("c"), None);
        assert!(!c.add_offset_property("d", None, 6, PropertyType::of::<u32>()));
        assert!(!c.add_offset_property("a", None, 0, PropertyType::of::<u32>()));
        assert!(!c.add_offset_property("e", None, usize::MAX, PropertyType::of::<u8>()));
        assert_eq!(c.property_count(), 2);
        assert_eq!(c.size(), 8);
    }

    #[test]
    fn display_names_are_kept() {
        let mut c = CustomPropertyPodContainer::new(16);
        assert!(c.add_offset_property("tint", Some("Tint".into()), 0, PropertyType::of::<Vec3>()));
        assert_eq!(c.property("tint").unwrap().display_name(), "Tint");
        assert!(c.property("Tint").is_none());
    }

    #[test]
    fn values_and_write_signal() {
        let mut c = CustomPropertyPodContainer::new(16);
        c.push_property::<f32>("gain").unwrap();
        assert!(c.add_property(
            Property::scalar::<u32>("locked", 4).with_flags(PropertyFlags::READ_ONLY)
        ));

        let writes = Arc::new(AtomicUsize::new(0));
        let counter = writes.clone();
        c.on_write().add_handler(
            Arc::new(move |_: &()| {
                counter.fetch_add(1, Ordering::Relaxed);
            }),
            None,
        );

        assert!(c.set_value("gain", 0.5f32));
        assert!(!c.set_value("gain", 1u32));
        assert!(!c.set_value("locked", 1u32));
        assert!(!c.set_value("missing", 1.0f32));
        assert_eq!(writes.load(Ordering::Relaxed), 1);
        assert_eq!(c.get_value::<f32>("gain"), Some(0.5));
        assert_eq!(c.get_value::<u32>("locked"), Some(0));
    }

    #[test]
    fn direct_bytes_skip_the_signal() {
        let mut c = CustomPropertyPodContainer::new(8);
        c.push_property::<u32>("id").unwrap();

        let writes = Arc::new(AtomicUsize::new(0));
        let counter = writes.clone();
        c.on_write().add_handler(
            Arc::new(move |_: &()| {
                counter.fetch_add(1, Ordering::Relaxed);
            }),
            None,
        );

        c.data_mut()[..4].copy_from_slice(&9u32.to_ne_bytes());
        assert_eq!(c.get_value::<u32>("id"), Some(9));
        assert_eq!(c.data().unwrap().len(), 8);
        assert_eq!(writes.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn works_with_property_data() {
        let mut c = CustomPropertyPodContainer::new(32);
        assert!(c.add_property(Property::fixed_array::<f32>("weights", 0, 4)));
        assert!(c.set_value("weights[2]", 0.75f32));

        let mut data = PropertyData::new();
        let offset = data.rlock_path(&c, "weights[2]").unwrap();
        assert_eq!(offset.offset, 8);
        assert_eq!(data.owner().unwrap().type_name(), "CustomPropertyPodContainer");
        assert_eq!(data.size(), 32);
        assert_eq!(data.value(&offset).unwrap().get::<f32>(), Ok(0.75));
        assert!(data.runlock(&c));

        assert!(data.rlock_path(&c, "weights[4]").is_none());
        assert!(!data.is_locked());
        assert!(c.wlock().is_some());
    }
}
