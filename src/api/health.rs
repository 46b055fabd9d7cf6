// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Revocation store reachability ("ok" or "unavailable").
    pub revocation_store: String,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
///
/// Returns 200 only if the revocation store answers within its timeout.
/// Without it every authenticated request would be rejected.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let store_ok = match state.resolver.revocation().ping().await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check: revocation store unavailable");
            false
        }
    };

    let response = ReadyResponse {
        status: if store_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            revocation_store: if store_ok { "ok" } else { "unavailable" }.to_string(),
        },
    };

    let status = if store_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::codec::tests::test_codec;
    use crate::auth::AuthResolver;
    use crate::config::ExpiryPolicy;
    use crate::revocation::{RevocationStore, SetStore, StoreResult};
    use crate::state::tests::test_state;
    use crate::store::InMemoryDirectory;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    /// Reachable store whose set reads never finish, like a huge index.
    struct SlowReads;

    #[async_trait]
    impl SetStore for SlowReads {
        async fn add(&self, _key: &str, _member: &str) -> StoreResult<bool> {
            Ok(true)
        }

        async fn members(&self, _key: &str) -> StoreResult<Vec<String>> {
            std::future::pending().await
        }

        async fn remove(&self, _key: &str, _member: &str) -> StoreResult<bool> {
            Ok(false)
        }

        async fn ping(&self) -> StoreResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn readiness_reports_store_outage() {
        let (state, sets) = test_state();

        let (status, Json(body)) = readiness(State(state.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.checks.revocation_store, "ok");

        sets.set_available(false);
        let (status, Json(body)) = readiness(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
    }

    #[tokio::test]
    async fn readiness_does_not_read_the_index() {
        let codec = Arc::new(test_codec(ExpiryPolicy::Ignore));
        let revocation = Arc::new(
            RevocationStore::new(Arc::new(SlowReads), codec.clone())
                .with_timeout(Duration::from_millis(20)),
        );
        let directory = Arc::new(InMemoryDirectory::new());
        let state = AppState::new(
            Arc::new(AuthResolver::new(codec, revocation)),
            directory.clone(),
            directory,
        );

        let (status, Json(body)) = readiness(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
    }
}
