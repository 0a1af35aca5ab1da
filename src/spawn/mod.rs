//! Loot description: spawn entries, item lists and pools.

mod entry;
mod item_list;
mod pool;

pub use entry::{condition_factor, SpawnEntry};
pub use item_list::{parse_item_list, read_items, ItemSpec};
pub use pool::SpawnPool;
