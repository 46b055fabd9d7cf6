// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity and role lookups consumed by the resolver.
//!
//! The user directory and event role assignments belong to other services;
//! this crate only reads them through [`IdentityStore`] and [`RoleStore`].
//! [`InMemoryDirectory`] implements both for tests and for seeding a
//! standalone deployment from a JSON file.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::auth::{AssignmentStatus, EventId, Principal, Role, RoleAssignment};
use crate::revocation::StoreResult;

/// Looks up users by e-mail (the token's `nameid`).
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Principal>>;
}

/// Looks up accepted role assignments.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Role of `user_id` on `event_id`, considering only accepted assignments.
    async fn find_accepted(&self, user_id: &str, event_id: EventId) -> StoreResult<Option<Role>>;
}

/// Errors loading a directory seed file.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read directory seed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid directory seed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Seed file layout.
#[derive(Debug, Default, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub users: Vec<Principal>,
    #[serde(default)]
    pub assignments: Vec<RoleAssignment>,
}

#[derive(Default)]
struct DirectoryData {
    users: HashMap<String, Principal>,
    assignments: Vec<RoleAssignment>,
}

/// In-memory users and role assignments.
#[derive(Default)]
pub struct InMemoryDirectory {
    data: RwLock<DirectoryData>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: DirectorySeed) -> Self {
        let users = seed
            .users
            .into_iter()
            .map(|user| (user.user_name.clone(), user))
            .collect();
        Self {
            data: RwLock::new(DirectoryData {
                users,
                assignments: seed.assignments,
            }),
        }
    }

    /// Load a seed file: `{"users": [...], "assignments": [...]}`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        let seed: DirectorySeed = serde_json::from_str(&raw)?;
        Ok(Self::from_seed(seed))
    }

    pub async fn insert_user(&self, principal: Principal) {
        let mut data = self.data.write().await;
        data.users.insert(principal.user_name.clone(), principal);
    }

    pub async fn insert_assignment(&self, assignment: RoleAssignment) {
        self.data.write().await.assignments.push(assignment);
    }

    pub async fn user_count(&self) -> usize {
        self.data.read().await.users.len()
    }
}

#[async_trait]
impl IdentityStore for InMemoryDirectory {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Principal>> {
        Ok(self.data.read().await.users.get(email).cloned())
    }
}

#[async_trait]
impl RoleStore for InMemoryDirectory {
    async fn find_accepted(&self, user_id: &str, event_id: EventId) -> StoreResult<Option<Role>> {
        let data = self.data.read().await;
        Ok(data
            .assignments
            .iter()
            .find(|a| {
                a.user_id == user_id
                    && a.event_id == event_id
                    && a.status == AssignmentStatus::Accepted
            })
            .map(|a| a.role))
    }
}
