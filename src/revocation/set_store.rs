// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key → string-set storage used for the revocation list.

use std::time::Duration;

use async_trait::async_trait;

/// Errors talking to a backing store.
///
/// These are never interpreted as "not blocked"; callers must fail the request.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store call `{operation}` timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A collection of string sets addressed by key.
///
/// Each operation is a single atomic call against the backend. `add` and
/// `remove` are idempotent and report whether the set changed.
#[async_trait]
pub trait SetStore: Send + Sync {
    /// Add `member` to the set at `key`. Returns `false` if it was already present.
    async fn add(&self, key: &str, member: &str) -> StoreResult<bool>;

    /// All members of the set at `key` (empty when the key does not exist).
    async fn members(&self, key: &str) -> StoreResult<Vec<String>>;

    /// Remove `member` from the set at `key`. Returns `false` if it was absent.
    async fn remove(&self, key: &str, member: &str) -> StoreResult<bool>;

    /// Round-trip to the backend without touching any key.
    async fn ping(&self) -> StoreResult<()>;
}
