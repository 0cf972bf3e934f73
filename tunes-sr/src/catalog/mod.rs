//! Catalog access
//!
//! The search pipeline only talks to the catalog through these traits:
//! - [`CandidateIndex`]: query + kind → bounded identifier list
//! - [`EntityRepository`]: identifiers and associations → hydrated entities
//! - [`SessionStore`]: session token → current user
//! - [`MembershipStore`]: user → bookmarked song identifiers
//!
//! [`SqliteCatalog`] implements all four against the catalog database.
//! Methods taking a `viewer` hide non-public rows unless the viewer owns them.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use sqlx::SqlitePool;
use tunes_common::{Collection, CollectionKind, Entity, EntityKind, Genre, Person, Song};
use uuid::Uuid;

use crate::error::Result;

mod sqlite;

pub use sqlite::SqliteCatalog;

#[async_trait]
pub trait CandidateIndex: Send + Sync {
    /// Identifiers of `kind` matching `query`, at most `limit`, best match first
    async fn search(
        &self,
        query: &str,
        kind: EntityKind,
        viewer: Option<Uuid>,
        limit: usize,
    ) -> Result<Vec<Uuid>>;
}

#[async_trait]
pub trait EntityRepository: Send + Sync {
    /// Songs for `ids`, in `ids` order; unknown ids are skipped
    async fn find_songs(&self, ids: &[Uuid]) -> Result<Vec<Song>>;

    async fn find_people(&self, ids: &[Uuid]) -> Result<Vec<Person>>;

    async fn find_collections(&self, ids: &[Uuid], kind: CollectionKind)
        -> Result<Vec<Collection>>;

    /// Hydrate `ids` as entities of `kind`
    async fn find_by_ids(&self, ids: &[Uuid], kind: EntityKind) -> Result<Vec<Entity>> {
        let entities = match kind {
            EntityKind::Song => self
                .find_songs(ids)
                .await?
                .into_iter()
                .map(Entity::Song)
                .collect(),
            EntityKind::Person => self
                .find_people(ids)
                .await?
                .into_iter()
                .map(Entity::Person)
                .collect(),
            EntityKind::Playlist | EntityKind::Album | EntityKind::Ep | EntityKind::Single => {
                match kind.collection_kind() {
                    Some(collection_kind) => self
                        .find_collections(ids, collection_kind)
                        .await?
                        .into_iter()
                        .map(Entity::Collection)
                        .collect(),
                    None => Vec::new(),
                }
            }
        };
        Ok(entities)
    }

    /// Songs credited to `person_id`
    async fn person_songs(&self, person_id: Uuid, viewer: Option<Uuid>) -> Result<Vec<Song>>;

    /// Collections of `kind` owned by or credited to `person_id`
    async fn person_collections(
        &self,
        person_id: Uuid,
        kind: CollectionKind,
        viewer: Option<Uuid>,
    ) -> Result<Vec<Collection>>;

    /// Member songs of a collection, in collection order
    async fn collection_songs(&self, collection_id: Uuid, viewer: Option<Uuid>)
        -> Result<Vec<Song>>;

    /// People credited on a collection
    async fn collection_people(&self, collection_id: Uuid) -> Result<Vec<Person>>;

    /// People credited on a song
    async fn song_people(&self, song_id: Uuid) -> Result<Vec<Person>>;

    async fn song_genres(&self, song_id: Uuid) -> Result<Vec<Genre>>;

    /// Ids of public songs tagged with any of `genre_ids`, without `exclude`
    ///
    /// Pools are returned as ids so callers can sample before hydrating.
    async fn public_song_ids_by_genres(
        &self,
        genre_ids: &[Uuid],
        exclude: Option<Uuid>,
    ) -> Result<Vec<Uuid>>;

    /// Ids of every public song, without `exclude`
    async fn public_song_ids(&self, exclude: Option<Uuid>) -> Result<Vec<Uuid>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// User behind a session token; `None` for unknown or expired tokens
    async fn current_user(&self, token: &str) -> Result<Option<Person>>;
}

#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn membership_song_ids(&self, person_id: Uuid) -> Result<HashSet<Uuid>>;
}

/// Handles to the catalog collaborators shared by all requests
#[derive(Clone)]
pub struct Catalog {
    pub index: Arc<dyn CandidateIndex>,
    pub repository: Arc<dyn EntityRepository>,
    pub sessions: Arc<dyn SessionStore>,
    pub memberships: Arc<dyn MembershipStore>,
}

impl Catalog {
    /// All collaborators backed by one SQLite catalog
    pub fn sqlite(pool: SqlitePool) -> Self {
        let catalog = Arc::new(SqliteCatalog::new(pool));
        Self {
            index: catalog.clone(),
            repository: catalog.clone(),
            sessions: catalog.clone(),
            memberships: catalog,
        }
    }

    /// Replace the candidate index, keeping the other collaborators
    pub fn with_index(mut self, index: Arc<dyn CandidateIndex>) -> Self {
        self.index = index;
        self
    }
}
