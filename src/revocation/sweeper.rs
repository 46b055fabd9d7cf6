// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Revocation Sweeper
//!
//! Background task that bounds blocklist growth. Every `interval` it:
//! 1. Lists identities from the revocation index.
//! 2. Runs `sweep_expired` for each identity.
//! 3. Drops identities whose set is empty from the index, re-adding any
//!    that gained an entry while being dropped.
//!
//! A failing identity is logged and skipped; the next pass retries it.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{RevocationStore, StoreResult};

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub identities: usize,
    pub removed: usize,
    pub forgotten: usize,
    pub failed: usize,
}

/// Periodically evicts stale blocklist entries.
pub struct RevocationSweeper {
    store: Arc<RevocationStore>,
    interval: Duration,
}

impl RevocationSweeper {
    pub fn new(store: Arc<RevocationStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Run until the cancellation token is triggered.
    ///
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(interval_secs = self.interval.as_secs(), "Revocation sweeper starting");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Revocation sweeper shutting down");
                    return;
                }
            }

            match self.sweep_once().await {
                Ok(report) if report.identities > 0 => {
                    info!(
                        identities = report.identities,
                        removed = report.removed,
                        forgotten = report.forgotten,
                        failed = report.failed,
                        "Revocation sweep finished"
                    );
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Revocation sweep could not list identities"),
            }
        }
    }

    /// Execute one pass over every indexed identity.
    pub async fn sweep_once(&self) -> StoreResult<SweepReport> {
        let identities = self.store.blocked_identities().await?;
        let mut report = SweepReport {
            identities: identities.len(),
            ..SweepReport::default()
        };

        for identity in &identities {
            match self.sweep_identity(identity).await {
                Ok((removed, forgotten)) => {
                    report.removed += removed;
                    if forgotten {
                        report.forgotten += 1;
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(identity = %identity, error = %e, "Revocation sweep failed for identity");
                }
            }
        }

        Ok(report)
    }

    async fn sweep_identity(&self, identity: &str) -> StoreResult<(usize, bool)> {
        let removed = self.store.sweep_expired(identity).await?;
        if self.store.blocked_count(identity).await? > 0 {
            return Ok((removed, false));
        }
        let forgotten = self.store.forget_identity(identity).await?;
        Ok((removed, forgotten))
    }
}
