use hashbrown::HashMap;

use crate::types::EntryIndex;

/// Maps a key to the positions of matching entries, in append order.
pub type VecIndex<K> = HashMap<K, Vec<EntryIndex>>;
