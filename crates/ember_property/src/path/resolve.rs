use alloc::string::ToString;
use core::fmt;

use ember_utils::hash::hash_name;

use crate::metadata::{Property, PropertyKind};
use crate::path::ResolveError;

// -----------------------------------------------------------------------------
// PropertyOffset

/// A resolved property path.
///
/// - `property`: the descriptor at the end of the path (an element
///   descriptor when the path ends with an index).
/// - `offset`: byte offset from the start of the storage the path was
///   resolved against.
/// - `index`: the parsed index when the path ends with one, otherwise the
///   position of `property` within its table.
///
/// Two offsets are equal when they name the same descriptor (by identity)
/// at the same offset and index.
#[derive(Clone, Copy)]
pub struct PropertyOffset<'a> {
    pub property: &'a Property,
    pub offset: usize,
    pub index: usize,
}

impl PartialEq for PropertyOffset<'_> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.property, other.property)
            && self.offset == other.offset
            && self.index == other.index
    }
}

impl Eq for PropertyOffset<'_> {}

impl fmt::Debug for PropertyOffset<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyOffset")
            .field("property", &self.property.name())
            .field("offset", &self.offset)
            .field("index", &self.index)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Resolve

/// Resolves `path` against `properties`; `None` when the path is invalid.
///
/// `storage` is the owner's locked bytes. It is only read to size and
/// locate elements of dynamic containers.
#[inline]
pub fn resolve<'a>(properties: &'a [Property], path: &str, storage: &[u8]) -> Option<PropertyOffset<'a>> {
    try_resolve(properties, path, storage).ok()
}

/// Resolves `path` without any storage.
///
/// Dynamic containers then appear empty, so indexing into them fails.
#[inline]
pub fn resolve_static<'a>(properties: &'a [Property], path: &str) -> Option<PropertyOffset<'a>> {
    resolve(properties, path, &[])
}

/// Resolves `path` against `properties`, reporting why resolution failed.
///
/// A segment that names no property fails, except when the table being
/// searched is a (non-root) empty member table: resolution then stops and the
/// last resolved property is the result.
pub fn try_resolve<'a>(
    properties: &'a [Property],
    path: &str,
    storage: &[u8],
) -> Result<PropertyOffset<'a>, ResolveError> {
    let bytes = path.as_bytes();
    let mut pos = 0;
    let mut current = properties;
    let mut base = 0;
    let mut best: Option<PropertyOffset<'a>> = None;

    loop {
        let rest = &path[pos..];
        let end = rest.find(['.', '[']).unwrap_or(rest.len());
        let name = &rest[..end];
        if name.is_empty() {
            return Err(ResolveError::EmptySegment { at: pos });
        }

        let hash = hash_name(name);
        let Some((position, property)) = current
            .iter()
            .enumerate()
            .find(|(_, p)| p.matches(name, hash))
        else {
            return match best {
                Some(best) if current.is_empty() => Ok(best),
                _ => Err(ResolveError::NotFound {
                    name: name.to_string(),
                }),
            };
        };

        let offset = base + property.offset();
        best = Some(PropertyOffset {
            property,
            offset,
            index: position,
        });
        pos += end;

        let (owner, owner_offset) = match bytes.get(pos) {
            None => return Ok(PropertyOffset { property, offset, index: position }),
            Some(b'.') => (property, offset),
            Some(_) => {
                // `[`: parse the decimal index up to the closing bracket.
                let open = pos + 1;
                let close = path[open..]
                    .find(']')
                    .map(|n| open + n)
                    .ok_or(ResolveError::MalformedIndex { at: open })?;
                let digits = &path[open..close];
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ResolveError::MalformedIndex { at: open });
                }
                let index: usize = digits
                    .parse()
                    .map_err(|_| ResolveError::MalformedIndex { at: open })?;

                let (element, element_offset) = element_at(property, storage, offset, index)?;
                let resolved = PropertyOffset {
                    property: element,
                    offset: element_offset,
                    index,
                };
                best = Some(resolved);
                pos = close + 1;

                match bytes.get(pos) {
                    None => return Ok(resolved),
                    Some(b'.') => (element, element_offset),
                    Some(_) => return Err(ResolveError::TrailingCharacters { at: pos }),
                }
            }
        };

        // `.`: descend into the members of `owner`.
        pos += 1;
        if pos >= bytes.len() {
            return Err(ResolveError::DanglingDot);
        }
        current = owner.members();
        base = owner_offset;
    }
}

/// Locates element `index` of the array or container `property`, which
/// starts at byte `offset` of `storage`.
///
/// Returns the element descriptor and the element's storage offset.
pub fn element_at<'a>(
    property: &'a Property,
    storage: &[u8],
    offset: usize,
    index: usize,
) -> Result<(&'a Property, usize), ResolveError> {
    match property.kind() {
        PropertyKind::FixedArray { element, count } => {
            if index >= *count {
                return Err(ResolveError::IndexOutOfRange { index, len: *count });
            }
            Ok((element, offset + index * element.size()))
        }
        PropertyKind::Container(methods) => {
            let len = methods.size(storage, offset);
            if index >= len {
                return Err(ResolveError::IndexOutOfRange { index, len });
            }
            Ok((methods.element(), methods.get(storage, offset, index)))
        }
        PropertyKind::Scalar | PropertyKind::Struct { .. } => Err(ResolveError::NotIndexable {
            name: property.name().to_string(),
        }),
    }
}
