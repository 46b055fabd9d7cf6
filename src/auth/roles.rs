// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-event roles.
//!
//! Roles are never embedded in session tokens. They are looked up per request
//! from the role store, keyed by the token's user id and the event id.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifier of an event a role is granted on.
pub type EventId = i64;

/// A user's role on a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Event organizer
    Organizer,
    /// Regular participant
    Member,
}

/// Lifecycle of a role assignment. Only `Accepted` assignments grant a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Accepted,
    Rejected,
}

/// A role granted to a user on an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RoleAssignment {
    pub user_id: String,
    pub event_id: EventId,
    pub role: Role,
    pub status: AssignmentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_round_trips_through_json() {
        let json = r#"{"user_id":"u1","event_id":5,"role":"organizer","status":"accepted"}"#;
        let assignment: RoleAssignment = serde_json::from_str(json).unwrap();
        assert_eq!(assignment.role, Role::Organizer);
        assert_eq!(assignment.status, AssignmentStatus::Accepted);
        assert_eq!(serde_json::to_string(&Role::Member).unwrap(), r#""member""#);
    }
}
