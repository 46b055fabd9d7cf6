// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-event role lookup.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{extractor::authorization_header, Auth, EventId, Role};
use crate::error::ApiError;
use crate::state::AppState;

/// Response for GET /v1/events/{event_id}/role
#[derive(Debug, Serialize, ToSchema)]
pub struct EventRoleResponse {
    pub event_id: EventId,
    /// Accepted role, or null when the user has none on this event
    pub role: Option<Role>,
}

/// Get the caller's accepted role on an event.
#[utoipa::path(
    get,
    path = "/v1/events/{event_id}/role",
    tag = "Events",
    security(("bearer" = [])),
    params(("event_id" = i64, Path, description = "Event identifier")),
    responses(
        (status = 200, description = "Role on the event", body = EventRoleResponse),
        (status = 401, description = "Unauthorized - invalid, revoked or missing token"),
        (status = 503, description = "Revocation or role store unavailable"),
    )
)]
pub async fn get_event_role(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
    Auth(_session): Auth,
    headers: HeaderMap,
) -> Result<Json<EventRoleResponse>, ApiError> {
    let role = state
        .resolver
        .resolve_role(authorization_header(&headers)?, event_id, state.roles.as_ref())
        .await?;

    Ok(Json(EventRoleResponse { event_id, role }))
}
