// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Session tokens issued and verified by this service.
//!
//! ## Auth Flow
//!
//! 1. A trusted caller issues a token for a principal with [`TokenCodec::issue`]
//! 2. Clients send `Authorization: Bearer <token>`
//! 3. The server:
//!    - Verifies the HMAC signature (expiry only under the `enforce` policy)
//!    - Rejects tokens on the revocation list for the token's `nameid`
//!    - Resolves per-event roles from the role store by `UserId`
//!
//! ## Security
//!
//! - One symmetric secret, loaded at startup and never rotated
//! - Revocation store failures reject the request
//! - Roles are looked up per request, never read from the token

pub mod claims;
pub mod codec;
pub mod error;
pub mod extractor;
pub mod resolver;
pub mod roles;

pub use claims::{AuthenticatedSession, Principal, SessionClaims, CLAIM_SUBJECT, CLAIM_USER_ID};
pub use codec::TokenCodec;
pub use error::AuthError;
pub use extractor::Auth;
pub use resolver::{token_from_header, AuthResolver};
pub use roles::{AssignmentStatus, EventId, Role, RoleAssignment};
