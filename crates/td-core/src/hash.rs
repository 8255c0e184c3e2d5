//! Fast hash map and hash set type aliases.
//!
//! Scan results are keyed by content identifiers (hex object hashes), so the
//! Fx hash from `rustc-hash` is a good fit: short string keys, no need for
//! denial-of-service resistance.
//!
//! # Examples
//!
//! ```
//! use td_core::{FxHashMap, fx_hash_map};
//!
//! let mut map: FxHashMap<String, u32> = fx_hash_map();
//! map.insert("3f2a".to_owned(), 7);
//! assert_eq!(map.get("3f2a"), Some(&7));
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// Creates a new empty [`FxHashMap`].
#[inline]
#[must_use]
pub fn fx_hash_map<K, V>() -> FxHashMap<K, V> {
    FxHashMap::default()
}

/// Creates a new [`FxHashMap`] with room for at least `capacity` elements.
///
/// # Examples
///
/// ```
/// use td_core::fx_hash_map_with_capacity;
///
/// let map: td_core::FxHashMap<String, i32> = fx_hash_map_with_capacity(64);
/// assert!(map.capacity() >= 64);
/// ```
#[inline]
#[must_use]
pub fn fx_hash_map_with_capacity<K, V>(capacity: usize) -> FxHashMap<K, V> {
    FxHashMap::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}
