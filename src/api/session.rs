// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session endpoints.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{extractor::authorization_header, Auth};
use crate::error::ApiError;
use crate::state::AppState;

/// Response for GET /v1/auth/me
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    /// User id from the directory
    pub user_id: String,
    /// User name (e-mail)
    pub user_name: String,
    /// Token expiry (Unix timestamp)
    pub expires_at: i64,
}

/// Get the current user's directory entry.
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    tag = "Session",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User information", body = MeResponse),
        (status = 401, description = "Unauthorized - invalid, revoked or missing token"),
        (status = 404, description = "Token subject is not in the directory"),
        (status = 503, description = "Revocation or directory store unavailable"),
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    Auth(session): Auth,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, ApiError> {
    let principal = state
        .resolver
        .resolve_user(authorization_header(&headers)?, state.identities.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(MeResponse {
        user_id: principal.user_id,
        user_name: principal.user_name,
        expires_at: session.claims.exp,
    }))
}

/// Revoke the presented token.
///
/// The token is added to its owner's blocklist; later requests with it get 401.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "Session",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Unauthorized - invalid, revoked or missing token"),
        (status = 503, description = "Revocation store unavailable"),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Auth(session): Auth,
) -> Result<StatusCode, ApiError> {
    state.resolver.revoke(&session).await?;
    tracing::info!(identity = %session.subject(), "Session token revoked");
    Ok(StatusCode::NO_CONTENT)
}
