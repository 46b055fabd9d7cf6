// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Token Revocation
//!
//! Blocked tokens are kept as raw strings in one set per identity (the
//! token's `nameid`). The key prefix keeps identity sets apart from the
//! index set. Entries carry no TTL; [`RevocationStore::sweep_expired`]
//! is the only eviction path and must be driven by the caller or by the
//! [`RevocationSweeper`].
//!
//! ## Key Layout
//!
//! ```text
//! {prefix}{identity}      SET of blocked token strings
//! {index_key}             SET of identities that may have blocked tokens
//! ```
//!
//! Every store call is bounded by a timeout. Store failures are returned to
//! the caller and must never be read as "not blocked".

pub mod memory;
pub mod redis_store;
pub mod set_store;
pub mod sweeper;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::auth::TokenCodec;
use crate::config::{
    RevocationSettings, DEFAULT_INDEX_KEY, DEFAULT_KEY_PREFIX, DEFAULT_REVOCATION_TIMEOUT,
};

pub use memory::InMemorySetStore;
pub use redis_store::RedisSetStore;
pub use set_store::{SetStore, StoreError, StoreResult};
pub use sweeper::{RevocationSweeper, SweepReport};

/// Per-identity blocklist of token strings.
pub struct RevocationStore {
    sets: Arc<dyn SetStore>,
    codec: Arc<TokenCodec>,
    timeout: Duration,
    key_prefix: String,
    index_key: String,
}

impl RevocationStore {
    /// Create a store with default key layout and timeout.
    pub fn new(sets: Arc<dyn SetStore>, codec: Arc<TokenCodec>) -> Self {
        Self {
            sets,
            codec,
            timeout: DEFAULT_REVOCATION_TIMEOUT,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            index_key: DEFAULT_INDEX_KEY.to_string(),
        }
    }

    /// Apply timeout and key layout from configuration.
    pub fn with_settings(mut self, settings: &RevocationSettings) -> Self {
        self.timeout = settings.timeout;
        self.key_prefix = settings.key_prefix.clone();
        self.index_key = settings.index_key.clone();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Block `token` for `identity`. Blocking an already blocked token is a no-op.
    pub async fn block(&self, identity: &str, token: &str) -> StoreResult<()> {
        let key = self.key(identity);
        let added = self.bounded("add", self.sets.add(&key, token)).await?;
        self.bounded("add", self.sets.add(&self.index_key, identity))
            .await?;
        debug!(identity, newly_blocked = added, "Token blocked");
        Ok(())
    }

    /// Exact-match membership test against the identity's full set.
    pub async fn is_blocked(&self, identity: &str, token: &str) -> StoreResult<bool> {
        let members = self
            .bounded("members", self.sets.members(&self.key(identity)))
            .await?;
        Ok(members.iter().any(|member| member == token))
    }

    /// Remove a single entry. Returns whether it was present.
    pub async fn unblock(&self, identity: &str, token: &str) -> StoreResult<bool> {
        self.bounded("remove", self.sets.remove(&self.key(identity), token))
            .await
    }

    /// Drop every entry for `identity` whose token no longer validates.
    ///
    /// With the default expiry policy validation is signature-only, so only
    /// broken entries are removed; tokens past `exp` with an intact signature
    /// stay until the `enforce` policy is configured.
    pub async fn sweep_expired(&self, identity: &str) -> StoreResult<usize> {
        let key = self.key(identity);
        let members = self.bounded("members", self.sets.members(&key)).await?;

        let mut removed = 0;
        for token in members.iter().filter(|token| !self.codec.validate(token)) {
            if self.bounded("remove", self.sets.remove(&key, token)).await? {
                removed += 1;
            }
        }

        if removed > 0 {
            info!(identity, removed, remaining = members.len() - removed, "Swept blocked tokens");
        }
        Ok(removed)
    }

    /// Identities that have (or recently had) blocked tokens.
    pub async fn blocked_identities(&self) -> StoreResult<Vec<String>> {
        self.bounded("members", self.sets.members(&self.index_key))
            .await
    }

    /// Number of blocked entries currently held for `identity`.
    pub async fn blocked_count(&self, identity: &str) -> StoreResult<usize> {
        let members = self
            .bounded("members", self.sets.members(&self.key(identity)))
            .await?;
        Ok(members.len())
    }

    /// Drop `identity` from the index if its set is empty.
    ///
    /// The index entry is removed before the set is re-read, so a `block`
    /// racing with this call either sees the removal and re-adds the
    /// identity itself, or leaves an entry that puts the identity back.
    /// Returns whether the identity stayed out of the index.
    pub async fn forget_identity(&self, identity: &str) -> StoreResult<bool> {
        self.bounded("remove", self.sets.remove(&self.index_key, identity))
            .await?;
        if self.blocked_count(identity).await? == 0 {
            return Ok(true);
        }
        self.bounded("add", self.sets.add(&self.index_key, identity))
            .await?;
        debug!(identity, "Identity regained entries during sweep, kept in index");
        Ok(false)
    }

    /// Cheap reachability check against the backing store.
    pub async fn ping(&self) -> StoreResult<()> {
        self.bounded("ping", self.sets.ping()).await
    }

    fn key(&self, identity: &str) -> String {
        format!("{}{}", self.key_prefix, identity)
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = StoreResult<T>>,
    ) -> StoreResult<T> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StoreError::Timeout {
                operation,
                after: self.timeout,
            })?
    }
}
