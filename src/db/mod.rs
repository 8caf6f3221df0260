//! Persistence layer (key-value substrate and workout gateway).

pub mod gateway;
pub mod kv;

pub use gateway::PersistenceGateway;
pub use kv::{FileKvStore, KeyValueStore, KvError, MemoryKvStore};

/// Key layout inside the key-value store.
pub mod keys {
    /// Prefix for workout slots; the rest of the key is the workout id.
    pub const WORKOUT_PREFIX: &str = "workout:";
}
