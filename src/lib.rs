// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Event Auth Server - Session Token Service
//!
//! Issues HMAC-signed session tokens, resolves identities and per-event
//! roles from them, and keeps a revocation list of blocked tokens.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token codec, resolver and request extractor
//! - `revocation` - Blocklist on Redis sets, background sweeper
//! - `store` - Identity and role lookups (external collaborators)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod revocation;
pub mod state;
pub mod store;
