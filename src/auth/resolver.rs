// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request-scoped identity and role resolution.
//!
//! Two kinds of lookups live here:
//!
//! - **Association** (`resolve_user`, `resolve_role`): decode the token
//!   without verification and look the identity up. Cheap, never consults
//!   the revocation list, not fit for authorization on its own.
//! - **Authorization** (`authenticate`): verify the signature (and expiry,
//!   depending on policy) and reject revoked tokens. Store failures are
//!   returned as errors so callers fail closed.

use std::sync::Arc;

use tracing::{debug, warn};

use super::claims::{AuthenticatedSession, Principal};
use super::roles::{EventId, Role};
use super::{AuthError, TokenCodec};
use crate::revocation::RevocationStore;
use crate::store::{IdentityStore, RoleStore};

/// Extract the credential from a `<scheme> <token>` header value.
///
/// The scheme is not checked. Returns `None` for a missing or empty header,
/// a scheme without a token, or extra whitespace-separated parts.
pub fn token_from_header(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let (scheme, rest) = value.split_once(char::is_whitespace)?;
    let token = rest.trim();
    if scheme.is_empty() || token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}

/// Orchestrates token decoding, revocation checks and directory lookups.
pub struct AuthResolver {
    codec: Arc<TokenCodec>,
    revocation: Arc<RevocationStore>,
}

impl AuthResolver {
    pub fn new(codec: Arc<TokenCodec>, revocation: Arc<RevocationStore>) -> Self {
        Self { codec, revocation }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn revocation(&self) -> &RevocationStore {
        &self.revocation
    }

    /// Best-effort identity lookup for the header's token.
    ///
    /// `Ok(None)` when the header or token is unusable or the user is unknown.
    pub async fn resolve_user(
        &self,
        header: Option<&str>,
        identities: &dyn IdentityStore,
    ) -> Result<Option<Principal>, AuthError> {
        let Some(claims) = token_from_header(header).and_then(TokenCodec::decode_unchecked) else {
            return Ok(None);
        };
        Ok(identities.find_by_email(&claims.subject).await?)
    }

    /// Accepted role of the header's user on `event_id`.
    pub async fn resolve_role(
        &self,
        header: Option<&str>,
        event_id: EventId,
        roles: &dyn RoleStore,
    ) -> Result<Option<Role>, AuthError> {
        let Some(claims) = token_from_header(header).and_then(TokenCodec::decode_unchecked) else {
            return Ok(None);
        };
        Ok(roles.find_accepted(&claims.user_id, event_id).await?)
    }

    /// Full check for authorization decisions: signature, expiry policy and
    /// revocation. A store failure is an error, never a pass.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<AuthenticatedSession, AuthError> {
        let header = header
            .filter(|value| !value.trim().is_empty())
            .ok_or(AuthError::MissingAuthHeader)?;
        let token = token_from_header(Some(header)).ok_or(AuthError::InvalidAuthHeader)?;

        let claims = self.codec.verify(token)?;

        match self.revocation.is_blocked(&claims.subject, token).await {
            Ok(false) => {}
            Ok(true) => {
                debug!(identity = %claims.subject, "Rejected revoked token");
                return Err(AuthError::TokenRevoked);
            }
            Err(e) => {
                warn!(identity = %claims.subject, error = %e, "Revocation check failed, rejecting request");
                return Err(e.into());
            }
        }

        Ok(AuthenticatedSession {
            token: token.to_string(),
            claims,
        })
    }

    /// Block the session's token, then opportunistically sweep its identity.
    ///
    /// Sweep failures are logged; the block itself must succeed.
    pub async fn revoke(&self, session: &AuthenticatedSession) -> Result<(), AuthError> {
        self.revocation
            .block(session.subject(), &session.token)
            .await?;

        if let Err(e) = self.revocation.sweep_expired(session.subject()).await {
            warn!(identity = %session.subject(), error = %e, "Post-logout sweep failed");
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::codec::tests::test_codec;
    use crate::auth::{AssignmentStatus, RoleAssignment};
    use crate::config::ExpiryPolicy;
    use crate::revocation::InMemorySetStore;
    use crate::store::InMemoryDirectory;

    pub(crate) fn test_resolver() -> (AuthResolver, Arc<InMemorySetStore>) {
        let sets = Arc::new(InMemorySetStore::new());
        let codec = Arc::new(test_codec(ExpiryPolicy::Ignore));
        let revocation = Arc::new(RevocationStore::new(sets.clone(), codec.clone()));
        (AuthResolver::new(codec, revocation), sets)
    }

    fn ada() -> Principal {
        Principal::new("u-42", "ada@example.com")
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[test]
    fn token_from_header_handles_missing_and_empty() {
        assert_eq!(token_from_header(None), None);
        assert_eq!(token_from_header(Some("")), None);
        assert_eq!(token_from_header(Some("   ")), None);
        assert_eq!(token_from_header(Some("Bearer")), None);
        assert_eq!(token_from_header(Some("Bearer   ")), None);
        assert_eq!(token_from_header(Some("Bearer a b")), None);
    }

    #[test]
    fn token_from_header_extracts_token_and_ignores_scheme() {
        assert_eq!(token_from_header(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(token_from_header(Some("Token abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(token_from_header(Some("  bearer   abc.def.ghi ")), Some("abc.def.ghi"));
    }

    #[tokio::test]
    async fn resolve_user_finds_directory_entry() {
        let (resolver, _) = test_resolver();
        let directory = InMemoryDirectory::new();
        directory.insert_user(ada()).await;

        let token = resolver.codec().issue(&ada()).unwrap();
        let user = resolver
            .resolve_user(Some(bearer(&token).as_str()), &directory)
            .await
            .unwrap();
        assert_eq!(user, Some(ada()));
    }

    #[tokio::test]
    async fn resolve_user_returns_none_for_unusable_input() {
        let (resolver, _) = test_resolver();
        let directory = InMemoryDirectory::new();

        assert!(resolver.resolve_user(None, &directory).await.unwrap().is_none());
        assert!(resolver.resolve_user(Some(""), &directory).await.unwrap().is_none());
        assert!(resolver
            .resolve_user(Some("Bearer garbage"), &directory)
            .await
            .unwrap()
            .is_none());

        let token = resolver.codec().issue(&ada()).unwrap();
        assert!(resolver
            .resolve_user(Some(bearer(&token).as_str()), &directory)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn resolve_user_skips_revocation() {
        let (resolver, _) = test_resolver();
        let directory = InMemoryDirectory::new();
        directory.insert_user(ada()).await;

        let token = resolver.codec().issue(&ada()).unwrap();
        resolver
            .revocation()
            .block("ada@example.com", &token)
            .await
            .unwrap();

        let user = resolver
            .resolve_user(Some(bearer(&token).as_str()), &directory)
            .await
            .unwrap();
        assert!(user.is_some());
    }

    #[tokio::test]
    async fn resolve_role_returns_accepted_role_for_event() {
        let (resolver, _) = test_resolver();
        let directory = InMemoryDirectory::new();
        directory
            .insert_assignment(RoleAssignment {
                user_id: "u-42".to_string(),
                event_id: 5,
                role: Role::Organizer,
                status: AssignmentStatus::Accepted,
            })
            .await;

        let header = bearer(&resolver.codec().issue(&ada()).unwrap());

        assert_eq!(
            resolver.resolve_role(Some(header.as_str()), 5, &directory).await.unwrap(),
            Some(Role::Organizer)
        );
        assert_eq!(resolver.resolve_role(Some(header.as_str()), 6, &directory).await.unwrap(), None);
        assert_eq!(resolver.resolve_role(None, 5, &directory).await.unwrap(), None);
    }

    #[tokio::test]
    async fn authenticate_accepts_valid_token() {
        let (resolver, _) = test_resolver();
        let token = resolver.codec().issue(&ada()).unwrap();

        let session = resolver.authenticate(Some(bearer(&token).as_str())).await.unwrap();
        assert_eq!(session.subject(), "ada@example.com");
        assert_eq!(session.user_id(), "u-42");
        assert_eq!(session.token, token);
    }

    #[tokio::test]
    async fn authenticate_rejects_bad_headers_and_tokens() {
        let (resolver, _) = test_resolver();

        assert!(matches!(resolver.authenticate(None).await, Err(AuthError::MissingAuthHeader)));
        assert!(matches!(resolver.authenticate(Some(" ")).await, Err(AuthError::MissingAuthHeader)));
        assert!(matches!(
            resolver.authenticate(Some("Bearer")).await,
            Err(AuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            resolver.authenticate(Some("Bearer abc.def.ghi")).await,
            Err(AuthError::MalformedToken)
        ));
    }

    #[tokio::test]
    async fn authenticate_rejects_revoked_token() {
        let (resolver, _) = test_resolver();
        let token = resolver.codec().issue(&ada()).unwrap();
        let session = resolver.authenticate(Some(bearer(&token).as_str())).await.unwrap();

        resolver.revoke(&session).await.unwrap();

        assert!(matches!(
            resolver.authenticate(Some(bearer(&token).as_str())).await,
            Err(AuthError::TokenRevoked)
        ));

        let fresh = resolver.codec().issue(&ada()).unwrap();
        assert!(resolver.authenticate(Some(bearer(&fresh).as_str())).await.is_ok());
    }

    #[tokio::test]
    async fn authenticate_fails_closed_when_store_is_down() {
        let (resolver, sets) = test_resolver();
        let token = resolver.codec().issue(&ada()).unwrap();
        sets.set_available(false);

        assert!(matches!(
            resolver.authenticate(Some(bearer(&token).as_str())).await,
            Err(AuthError::StoreUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn revoke_surfaces_store_failure() {
        let (resolver, sets) = test_resolver();
        let token = resolver.codec().issue(&ada()).unwrap();
        let session = resolver.authenticate(Some(bearer(&token).as_str())).await.unwrap();
        sets.set_available(false);

        assert!(matches!(
            resolver.revoke(&session).await,
            Err(AuthError::StoreUnavailable(_))
        ));
    }
}
