// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO business logic
// - NO backend selection or fallback
// - NO cross-repository calls

pub mod key_value_repository;
pub mod remote_repository;
pub mod snapshot_repository;

pub use key_value_repository::{KeyValueStore, SqliteKeyValueStore};
pub use remote_repository::{RemoteCoffeeRepository, RemoteConfigRepository};
pub use snapshot_repository::{
    LocalSnapshotRepository, SnapshotRepository, StorageInfo, CURRENT_VERSION,
    DEFAULT_QUOTA_BYTES, LAST_SAVED_KEY, STORAGE_KEY, VERSION_KEY,
};

#[cfg(test)]
pub use remote_repository::{MockRemoteCoffeeRepository, MockRemoteConfigRepository};
