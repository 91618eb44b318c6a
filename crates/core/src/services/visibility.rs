//! Visibility filter.
//!
//! Every public listing and search query passes through here first: the
//! viewer's block list becomes an owner-exclusion set, and violated
//! entities are always excluded. A viewer that cannot be resolved (absent,
//! unknown or malformed id) degrades to guest visibility instead of
//! failing the request.

use makaan_db::repositories::UserBlockRepository;

/// Computed exclusion criteria for one request.
#[derive(Debug, Clone, Default)]
pub struct Visibility {
    /// Entity owners the viewer must never see.
    pub excluded_owner_ids: Vec<String>,
    /// Whether violated entities are excluded. Always true on public paths.
    pub exclude_violated: bool,
}

impl Visibility {
    /// Guest visibility: nothing blocked, violated entities hidden.
    #[must_use]
    pub const fn guest() -> Self {
        Self {
            excluded_owner_ids: Vec::new(),
            exclude_violated: true,
        }
    }
}

/// Visibility service for computing per-request exclusion sets.
#[derive(Clone)]
pub struct VisibilityService {
    block_repo: UserBlockRepository,
}

impl VisibilityService {
    /// Create a new visibility service.
    #[must_use]
    pub const fn new(block_repo: UserBlockRepository) -> Self {
        Self { block_repo }
    }

    /// Compute the exclusion criteria for a viewer.
    ///
    /// This is deliberately infallible: a failed block-list lookup logs and
    /// falls back to guest visibility rather than failing a public listing.
    pub async fn compute(&self, viewer_id: Option<&str>) -> Visibility {
        let Some(viewer_id) = viewer_id else {
            return Visibility::guest();
        };

        match self.block_repo.blocked_ids(viewer_id).await {
            Ok(excluded_owner_ids) => Visibility {
                excluded_owner_ids,
                exclude_violated: true,
            },
            Err(e) => {
                tracing::debug!(viewer_id, error = %e, "Block-list lookup failed, using guest visibility");
                Visibility::guest()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_guest_has_empty_exclusions() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = VisibilityService::new(UserBlockRepository::new(db));

        let vis = service.compute(None).await;
        assert!(vis.excluded_owner_ids.is_empty());
        assert!(vis.exclude_violated);
    }

    #[tokio::test]
    async fn test_viewer_without_blocks_matches_guest() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<
                    std::collections::BTreeMap<&'static str, sea_orm::Value>,
                >::new()])
                .into_connection(),
        );
        let service = VisibilityService::new(UserBlockRepository::new(db));

        let vis = service.compute(Some("u1")).await;
        assert!(vis.excluded_owner_ids.is_empty());
        assert!(vis.exclude_violated);
    }

    #[tokio::test]
    async fn test_lookup_failure_degrades_to_guest() {
        // No mocked results queued: the lookup errors and must not propagate.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = VisibilityService::new(UserBlockRepository::new(db));

        let vis = service.compute(Some("not-a-valid-id")).await;
        assert!(vis.excluded_owner_ids.is_empty());
        assert!(vis.exclude_violated);
    }
}
