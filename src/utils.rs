use fnv::FnvHasher;
use std::{
    collections::{HashMap, HashSet},
    hash::{BuildHasherDefault, Hash}
};

pub type FnvHashSet<T> = HashSet<T, BuildHasherDefault<FnvHasher>>;
pub type FnvHashMap<K, V> = HashMap<K, V, BuildHasherDefault<FnvHasher>>;

/// Hash set with FNV hashing, much faster than the default on small keys like coordinates.
/// Not resistant to key collision attacks, which nothing here needs.
pub fn fnv_hashset<T: Hash + Eq>(capacity: usize) -> FnvHashSet<T> {
    HashSet::with_capacity_and_hasher(capacity, BuildHasherDefault::<FnvHasher>::default())
}

/// Hash map with FNV hashing, see `fnv_hashset`.
pub fn fnv_hashmap<K: Hash + Eq, V>(capacity: usize) -> FnvHashMap<K, V> {
    HashMap::with_capacity_and_hasher(capacity, BuildHasherDefault::<FnvHasher>::default())
}

/// Collect a slice of cells into an FNV hash set.
pub fn fnv_hashset_of<T: Hash + Eq + Copy>(items: &[T]) -> FnvHashSet<T> {
    let mut set = fnv_hashset(items.len());
    set.extend(items.iter().copied());
    set
}
