// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::AuthResolver;
use crate::store::{IdentityStore, RoleStore};

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<AuthResolver>,
    pub identities: Arc<dyn IdentityStore>,
    pub roles: Arc<dyn RoleStore>,
}

impl AppState {
    pub fn new(
        resolver: Arc<AuthResolver>,
        identities: Arc<dyn IdentityStore>,
        roles: Arc<dyn RoleStore>,
    ) -> Self {
        Self {
            resolver,
            identities,
            roles,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::resolver::tests::test_resolver;
    use crate::revocation::InMemorySetStore;
    use crate::store::InMemoryDirectory;

    /// State over in-memory stores. The set store is returned for fault injection.
    pub(crate) fn test_state() -> (AppState, Arc<InMemorySetStore>) {
        let (state, sets, _) = test_state_with_directory();
        (state, sets)
    }

    pub(crate) fn test_state_with_directory(
    ) -> (AppState, Arc<InMemorySetStore>, Arc<InMemoryDirectory>) {
        let (resolver, sets) = test_resolver();
        let directory = Arc::new(InMemoryDirectory::new());
        let state = AppState::new(Arc::new(resolver), directory.clone(), directory.clone());
        (state, sets, directory)
    }
}
