// src/repositories/remote_repository.rs
//
// Contracts for the hosted relational store.
// Implementations own transport, casing and timeouts; callers see entries.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{CoffeeEntry, CoffeePatch};
use crate::error::AppResult;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait RemoteCoffeeRepository: Send + Sync {
    /// All rows, newest cupping first
    async fn list_ordered(&self) -> AppResult<Vec<CoffeeEntry>>;

    /// Insert one row and return it as stored
    async fn insert(&self, entry: &CoffeeEntry) -> AppResult<CoffeeEntry>;

    /// Targeted update; `None` when no row has that id
    async fn update(&self, id: i64, patch: &CoffeePatch) -> AppResult<Option<CoffeeEntry>>;

    /// Returns whether a row was removed
    async fn delete(&self, id: i64) -> AppResult<bool>;

    async fn delete_all(&self) -> AppResult<()>;

    /// Replace every row with `entries`
    async fn replace_all(&self, entries: &[CoffeeEntry]) -> AppResult<()>;

    /// Insert or overwrite by id; returns the number of rows written
    async fn upsert_all(&self, entries: &[CoffeeEntry]) -> AppResult<usize>;
}

/// Singleton configuration rows, e.g. the access-PIN hash
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RemoteConfigRepository: Send + Sync {
    async fn get_value(&self, key: &str) -> AppResult<Option<String>>;
}
