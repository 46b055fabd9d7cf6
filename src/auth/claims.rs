// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token claims and the identities they are issued for.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claim carrying the principal's user name (also its e-mail).
pub const CLAIM_SUBJECT: &str = "nameid";

/// Claim carrying the principal's user id.
pub const CLAIM_USER_ID: &str = "UserId";

/// Identity a session token is issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Principal {
    /// Opaque user identifier
    pub user_id: String,
    /// User name; doubles as the e-mail used for directory lookups
    pub user_name: String,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
        }
    }
}

/// Claims carried by every session token.
///
/// Both identity claims are required; a token missing either one is treated
/// as malformed. Roles are never part of the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User name (`nameid`)
    #[serde(rename = "nameid")]
    pub subject: String,

    /// User id (`UserId`)
    #[serde(rename = "UserId")]
    pub user_id: String,

    /// Expiration timestamp
    #[serde(default)]
    pub exp: i64,

    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Not before timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Token id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// A request whose token passed signature, expiry-policy and revocation checks.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    /// Raw token as presented; the revocation key.
    pub token: String,
    pub claims: SessionClaims,
}

impl AuthenticatedSession {
    /// User name the token was issued to.
    pub fn subject(&self) -> &str {
        &self.claims.subject
    }

    pub fn user_id(&self) -> &str {
        &self.claims.user_id
    }
}
