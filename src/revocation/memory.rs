// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process set store for tests and single-node development.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::set_store::{SetStore, StoreError, StoreResult};

#[derive(Default)]
pub struct InMemorySetStore {
    sets: RwLock<HashMap<String, HashSet<String>>>,
    offline: AtomicBool,
}

impl InMemorySetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a lost connection: every call fails until switched back on.
    pub fn set_available(&self, available: bool) {
        self.offline.store(!available, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("in-memory store is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SetStore for InMemorySetStore {
    async fn add(&self, key: &str, member: &str) -> StoreResult<bool> {
        self.check_available()?;
        let mut sets = self.sets.write().await;
        Ok(sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    async fn members(&self, key: &str) -> StoreResult<Vec<String>> {
        self.check_available()?;
        let sets = self.sets.read().await;
        Ok(sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn remove(&self, key: &str, member: &str) -> StoreResult<bool> {
        self.check_available()?;
        let mut sets = self.sets.write().await;
        let Some(set) = sets.get_mut(key) else {
            return Ok(false);
        };
        let removed = set.remove(member);
        // Redis drops empty sets; mirror that.
        if set.is_empty() {
            sets.remove(key);
        }
        Ok(removed)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }
}
