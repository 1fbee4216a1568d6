use bytemuck::Pod;

use crate::data::PropertyData;
use crate::handle::PropertyHandle;

/// Reads the property at `path` of `handle` as a `T`.
///
/// Takes and releases the read lock. `None` when the path does not resolve
/// or `T` is not the property's type.
pub fn get_property_value<T: Pod>(handle: &dyn PropertyHandle, path: &str) -> Option<T> {
    let mut data = PropertyData::new();
    let offset = data.rlock_path(handle, path)?;
    let value = data
        .value(&offset)
        .and_then(|view| view.get::<T>())
        .inspect_err(|err| log::debug!("get_property_value(`{path}`): {err}"))
        .ok();
    data.runlock(handle);
    value
}

/// Writes `value` to the property at `path` of `handle`.
///
/// Takes and releases the write lock. Returns `false`, leaving the storage
/// unchanged, when the path does not resolve, `T` is not the property's
/// type or the property is read-only.
pub fn set_property_value<T: Pod>(handle: &dyn PropertyHandle, path: &str, value: T) -> bool {
    let mut data = PropertyData::new();
    let Some(offset) = data.wlock_path(handle, path) else {
        return false;
    };
    let written = data
        .value_mut(&offset)
        .and_then(|mut view| view.set(value))
        .inspect_err(|err| log::debug!("set_property_value(`{path}`): {err}"))
        .is_ok();
    data.wunlock(handle);
    written
}

#[cfg(test)]
mod tests {
    use super::{get_property_value, set_property_value};
    use crate::handle::PropertyStorage;
    use crate::metadata::{Property, StaticProperties};
    use bytemuck::{Pod, Zeroable};
    use ember_os::sync::{Arc, LazyLock};
    use glam::{UVec2, Vec2};

    #[repr(C)]
    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    struct Thing {
        int_val: i32,
        vec2_val: Vec2,
        other_int_val: i32,
    }

    static THING: LazyLock<alloc::boxed::Box<[Property]>> = LazyLock::new(|| {
        crate::properties!(Thing {
            int_val = "intVal": i32,
            vec2_val = "vec2Val": Vec2,
            other_int_val = "otherIntVal": i32,
        })
    });

    fn thing() -> PropertyStorage {
        let owner = Arc::new(StaticProperties::new("Thing", &LazyLock::force(&THING)[..]));
        PropertyStorage::zeroed(owner, size_of::<Thing>())
    }

    #[test]
    fn scalar_round_trip() {
        let storage = thing();
        assert!(set_property_value(&storage, "vec2Val", Vec2::new(2.0, 3.0)));
        assert_eq!(
            get_property_value::<Vec2>(&storage, "vec2Val"),
            Some(Vec2::new(2.0, 3.0))
        );
    }

    #[test]
    fn neighbouring_fields_are_independent() {
        let storage = thing();
        assert!(set_property_value(&storage, "intVal", 1i32));
        assert!(set_property_value(&storage, "otherIntVal", 2i32));
        assert_eq!(get_property_value::<i32>(&storage, "intVal"), Some(1));
        assert_eq!(get_property_value::<i32>(&storage, "otherIntVal"), Some(2));
        assert_eq!(
            storage.read_as::<Thing>(),
            Some(Thing {
                int_val: 1,
                vec2_val: Vec2::ZERO,
                other_int_val: 2,
            })
        );
    }

    #[test]
    fn mismatched_type_is_rejected() {
        let storage = thing();
        assert!(set_property_value(&storage, "vec2Val", Vec2::new(4.0, 5.0)));
        assert!(!set_property_value(&storage, "vec2Val", UVec2::new(7, 7)));
        assert_eq!(
            get_property_value::<Vec2>(&storage, "vec2Val"),
            Some(Vec2::new(4.0, 5.0))
        );
        assert_eq!(get_property_value::<UVec2>(&storage, "vec2Val"), None);
    }

    #[test]
    fn unknown_paths_do_nothing() {
        let storage = thing();
        assert!(!set_property_value(&storage, "foo", 1i32));
        assert_eq!(get_property_value::<i32>(&storage, "foo"), None);
        assert_eq!(storage.read_as::<Thing>(), Some(Thing::zeroed()));
    }

    #[test]
    fn locks_are_released() {
        let storage = thing();
        assert!(set_property_value(&storage, "intVal", 3i32));
        assert!(!set_property_value(&storage, "foo", 1i32));
        // Would deadlock if any call above had kept its lock.
        assert!(storage.write_as(Thing::zeroed()));
    }
}
