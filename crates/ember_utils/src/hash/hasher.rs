//! Provide `FixedHasher` and the property name hash.
//!
//! `FixedHasher` is based on the `foldhash` crate and provides
//! stable hash results through a fixed hash seed.

use core::hash::{BuildHasher, Hasher};

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHasher

/// A fixed hash seed.
const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x95EE04C4F326B271);

/// A fixed hasher whose results only depend on the input.
///
/// A type alias for [`foldhash::fast::FoldHasher`].
///
/// Which can be created through [`FixedHashState::build_hasher`].
pub type FixedHasher = FoldHasher<'static>;

/// Fixed Hash State based upon a random but fixed seed.
///
/// # Examples
///
/// ```
/// use core::hash::{Hash, Hasher, BuildHasher};
/// use ember_utils::hash::FixedHashState;
///
/// let mut a = FixedHashState.build_hasher();
/// let mut b = FixedHashState.build_hasher();
/// 3.hash(&mut a);
/// 3.hash(&mut b);
///
/// assert_eq!(a.finish(), b.finish());
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// Name hash

/// Hashes a property name to the 32-bit value stored next to it.
///
/// The value is only a pre-filter for lookups; equal hashes do not
/// imply equal names.
///
/// # Examples
///
/// ```
/// use ember_utils::hash::hash_name;
///
/// assert_eq!(hash_name("position"), hash_name("position"));
/// assert_ne!(hash_name("position"), hash_name("rotation"));
/// ```
pub fn hash_name(name: &str) -> u32 {
    let mut hasher = FixedHashState.build_hasher();
    hasher.write(name.as_bytes());
    let hash = hasher.finish();
    // Fold the upper half in instead of dropping it.
    (hash ^ (hash >> 32)) as u32
}
