pub mod best_effort;
pub mod dfa;
pub mod game;
pub mod index;
pub mod ltlf;
pub mod reactive;
pub mod strategy;
pub mod timing;
pub mod vars;

#[cfg(test)]
mod test_util;

pub type Set<T> = indexmap::IndexSet<T, rustc_hash::FxBuildHasher>;
pub type Map<K, V> = rustc_hash::FxHashMap<K, V>;
pub type IndexMap<K, V> = indexmap::IndexMap<K, V, rustc_hash::FxBuildHasher>;
