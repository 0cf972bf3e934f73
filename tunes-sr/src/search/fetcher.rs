//! Per-kind candidate fetching
//!
//! Ids come from the candidate index, entities from the repository. Index
//! order is kept so equally scored candidates stay in the index's order.

use std::sync::Arc;
use tunes_common::{Entity, EntityKind};
use uuid::Uuid;

use crate::catalog::{CandidateIndex, EntityRepository};
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct CandidateFetcher {
    index: Arc<dyn CandidateIndex>,
    repository: Arc<dyn EntityRepository>,
}

impl CandidateFetcher {
    pub fn new(index: Arc<dyn CandidateIndex>, repository: Arc<dyn EntityRepository>) -> Self {
        Self { index, repository }
    }

    /// Entities of `kind` matching `query`, at most `limit`
    ///
    /// Index failures are reported as [`Error::IndexUnavailable`] so the
    /// caller can drop just this kind.
    pub async fn fetch(
        &self,
        query: &str,
        kind: EntityKind,
        viewer: Option<Uuid>,
        limit: usize,
    ) -> Result<Vec<Entity>> {
        let ids = self
            .index
            .search(query, kind, viewer, limit)
            .await
            .map_err(|e| Error::IndexUnavailable {
                kind,
                reason: e.to_string(),
            })?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.repository.find_by_ids(&ids, kind).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SqliteCatalog;
    use crate::test_support::{FailingIndex, Seeder};
    use tunes_common::CollectionKind;

    #[tokio::test]
    async fn test_fetch_hydrates_matching_kind() {
        let seed = Seeder::new().await;
        seed.person("Alice").await;
        seed.song("Alice's Song", &[], &[]).await;
        seed.collection(CollectionKind::Album, "Alice Live", None, &[], &[]).await;

        let catalog = Arc::new(SqliteCatalog::new(seed.pool.clone()));
        let fetcher = CandidateFetcher::new(catalog.clone(), catalog);

        let people = fetcher.fetch("alice", EntityKind::Person, None, 10).await.unwrap();
        let albums = fetcher.fetch("alice", EntityKind::Album, None, 10).await.unwrap();
        let eps = fetcher.fetch("alice", EntityKind::Ep, None, 10).await.unwrap();

        assert_eq!(people.len(), 1);
        assert!(matches!(people[0], Entity::Person(_)));
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].kind(), EntityKind::Album);
        assert!(eps.is_empty());
    }

    #[tokio::test]
    async fn test_index_failure_maps_to_index_unavailable() {
        let seed = Seeder::new().await;
        let catalog = Arc::new(SqliteCatalog::new(seed.pool.clone()));
        let fetcher = CandidateFetcher::new(Arc::new(FailingIndex), catalog);

        let err = fetcher
            .fetch("x", EntityKind::Song, None, 10)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::IndexUnavailable {
                kind: EntityKind::Song,
                ..
            }
        ));
    }
}
