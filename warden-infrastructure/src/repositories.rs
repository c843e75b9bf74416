pub mod memory_store;
pub mod rule_seed;

pub use memory_store::*;
pub use rule_seed::*;
