use crate::metadata::Property;
use crate::path::{PropertyOffset, resolve_static};

// -----------------------------------------------------------------------------
// PropertyApi

/// A metadata provider: anything that exposes a table of [`Property`] descriptors.
///
/// Owners hand this out through [`PropertyHandle::owner`](crate::handle::PropertyHandle::owner).
pub trait PropertyApi: Send + Sync {
    /// The owner's metadata table, in declaration order.
    fn meta_data(&self) -> &[Property];

    /// A name for the owner type, used in diagnostics.
    fn type_name(&self) -> &str {
        ""
    }

    /// Number of top-level properties.
    #[inline]
    fn property_count(&self) -> usize {
        self.meta_data().len()
    }

    /// The top-level property at `index`.
    #[inline]
    fn meta_data_at(&self, index: usize) -> Option<&Property> {
        self.meta_data().get(index)
    }

    /// Resolves `path` without storage; see [`resolve_static`].
    #[inline]
    fn find(&self, path: &str) -> Option<PropertyOffset<'_>> {
        resolve_static(self.meta_data(), path)
    }
}

// -----------------------------------------------------------------------------
// StaticProperties

/// A [`PropertyApi`] over a table that lives for the whole program,
/// typically built once behind a `LazyLock`.
///
/// # Examples
///
/// ```
/// use ember_os::sync::LazyLock;
/// use ember_property::metadata::{Property, PropertyApi, StaticProperties};
///
/// static LIGHT: LazyLock<Box<[Property]>> = LazyLock::new(|| {
///     vec![
///         Property::scalar::<f32>("intensity", 0),
///         Property::scalar::<f32>("range", 4),
///     ]
///     .into_boxed_slice()
/// });
///
/// let api = StaticProperties::new("Light", &LazyLock::force(&LIGHT)[..]);
/// assert_eq!(api.property_count(), 2);
/// assert_eq!(api.find("range").unwrap().offset, 4);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StaticProperties {
    type_name: &'static str,
    properties: &'static [Property],
}

impl StaticProperties {
    /// Wraps a static table.
    pub fn new(type_name: &'static str, properties: &'static [Property]) -> Self {
        #[cfg(all(debug_assertions, feature = "debug"))]
        debug_validate(properties);

        Self {
            type_name,
            properties,
        }
    }
}

impl PropertyApi for StaticProperties {
    #[inline]
    fn meta_data(&self) -> &[Property] {
        self.properties
    }

    #[inline]
    fn type_name(&self) -> &str {
        self.type_name
    }
}

/// Checks that names are unique on every level of a table.
#[cfg(all(debug_assertions, feature = "debug"))]
pub(crate) fn debug_validate(properties: &[Property]) {
    for (i, property) in properties.iter().enumerate() {
        debug_assert!(
            !properties[..i]
                .iter()
                .any(|p| p.matches(property.name(), property.hash())),
            "duplicate property name `{}`",
            property.name(),
        );
        debug_validate(property.members());
        if let Some(element) = property.element() {
            debug_validate(element.members());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PropertyApi, StaticProperties};
    use crate::metadata::Property;
    use ember_os::sync::LazyLock;

    static TABLE: LazyLock<[Property; 2]> = LazyLock::new(|| {
        [
            Property::scalar::<u32>("a", 0),
            Property::scalar::<u32>("b", 4),
        ]
    });

    #[test]
    fn static_table_introspection() {
        let api = StaticProperties::new("Pair", &LazyLock::force(&TABLE)[..]);
        assert_eq!(api.type_name(), "Pair");
        assert_eq!(api.property_count(), 2);
        assert_eq!(api.meta_data_at(1).unwrap().name(), "b");
        assert!(api.meta_data_at(2).is_none());
        assert!(api.find("c").is_none());
    }
}
