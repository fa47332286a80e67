use std::hash::BuildHasherDefault;
use indexmap::IndexSet;
use rustc_hash::FxHasher;


/// Closed set of a search run
/// Membership checks hash positions with FxHasher, iteration replays the
/// expansion order that observers and the debug renderer see
pub type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;
