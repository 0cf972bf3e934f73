//! Related content expansion
//!
//! Builds the secondary result groups shown next to the principal. The set
//! of groups depends on the principal's kind:
//!
//! | Principal | Groups |
//! |---|---|
//! | person | `songs`, `playlists_of_artist`, `albums_of_artist` |
//! | playlist / album / ep / single | `songs`, `related_artists` |
//! | song | `artists_of_song`, `songs` (genre siblings, only if the song has genres) |
//!
//! Each group is scored against the query, sorted best-first and capped:
//! `songs` at the song limit, everything else at the other limit. Expansion
//! never fails; a lookup error drops that one group.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};
use tunes_common::{Collection, CollectionKind, Entity, EntityKind, Person, Song};
use uuid::Uuid;

use super::principal::Principal;
use super::scored::{self, Scored, Searchable};
use crate::catalog::EntityRepository;
use crate::error::Result;

pub const SONGS: &str = "songs";
pub const PLAYLISTS_OF_ARTIST: &str = "playlists_of_artist";
pub const ALBUMS_OF_ARTIST: &str = "albums_of_artist";
pub const RELATED_ARTISTS: &str = "related_artists";
pub const ARTISTS_OF_SONG: &str = "artists_of_song";

/// One labelled group of related entities
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RelatedGroup {
    Songs(Vec<Scored<Song>>),
    People(Vec<Scored<Person>>),
    Collections(Vec<Scored<Collection>>),
}

impl RelatedGroup {
    pub fn len(&self) -> usize {
        match self {
            RelatedGroup::Songs(items) => items.len(),
            RelatedGroup::People(items) => items.len(),
            RelatedGroup::Collections(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Vec<Uuid> {
        match self {
            RelatedGroup::Songs(items) => items.iter().map(|s| s.entity.id).collect(),
            RelatedGroup::People(items) => items.iter().map(|s| s.entity.id).collect(),
            RelatedGroup::Collections(items) => items.iter().map(|s| s.entity.id).collect(),
        }
    }
}

/// Related groups keyed by label
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RelatedBundle(BTreeMap<String, RelatedGroup>);

impl RelatedBundle {
    pub fn get(&self, label: &str) -> Option<&RelatedGroup> {
        self.0.get(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn groups_mut(&mut self) -> impl Iterator<Item = &mut RelatedGroup> {
        self.0.values_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, label: &str, group: RelatedGroup) {
        self.0.insert(label.to_string(), group);
    }
}

/// Caps applied to result lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLimits {
    pub songs: usize,
    pub others: usize,
}

impl ListLimits {
    /// Cap for a related group label
    pub fn for_label(&self, label: &str) -> usize {
        if label == SONGS {
            self.songs
        } else {
            self.others
        }
    }
}

impl Default for ListLimits {
    fn default() -> Self {
        Self {
            songs: 10,
            others: 6,
        }
    }
}

#[derive(Clone)]
pub struct RelatedContentExpander {
    repository: Arc<dyn EntityRepository>,
    limits: ListLimits,
}

impl RelatedContentExpander {
    pub fn new(repository: Arc<dyn EntityRepository>, limits: ListLimits) -> Self {
        Self { repository, limits }
    }

    pub async fn expand(
        &self,
        principal: &Principal,
        query: &str,
        viewer: Option<Uuid>,
        rng: &mut StdRng,
    ) -> RelatedBundle {
        let mut bundle = RelatedBundle::default();

        match (principal.kind, &principal.entity) {
            (EntityKind::Person, Entity::Person(person)) => {
                let songs = self.repository.person_songs(person.id, viewer).await;
                self.put(&mut bundle, SONGS, songs, query, RelatedGroup::Songs);

                let playlists = self
                    .repository
                    .person_collections(person.id, CollectionKind::Playlist, viewer)
                    .await;
                self.put(
                    &mut bundle,
                    PLAYLISTS_OF_ARTIST,
                    playlists,
                    query,
                    RelatedGroup::Collections,
                );

                let albums = self
                    .repository
                    .person_collections(person.id, CollectionKind::Album, viewer)
                    .await;
                self.put(
                    &mut bundle,
                    ALBUMS_OF_ARTIST,
                    albums,
                    query,
                    RelatedGroup::Collections,
                );
            }
            (
                EntityKind::Playlist | EntityKind::Album | EntityKind::Ep | EntityKind::Single,
                Entity::Collection(collection),
            ) if principal.kind.collection_kind() == Some(collection.kind) => {
                let songs = self.repository.collection_songs(collection.id, viewer).await;
                self.put(&mut bundle, SONGS, songs, query, RelatedGroup::Songs);

                let people = self.repository.collection_people(collection.id).await;
                self.put(&mut bundle, RELATED_ARTISTS, people, query, RelatedGroup::People);
            }
            (EntityKind::Song, Entity::Song(song)) => {
                let people = self.repository.song_people(song.id).await;
                self.put(&mut bundle, ARTISTS_OF_SONG, people, query, RelatedGroup::People);

                match self.repository.song_genres(song.id).await {
                    Ok(genres) if genres.is_empty() => {
                        debug!(song_id = %song.id, "Song has no genres, no sibling songs");
                    }
                    Ok(genres) => {
                        let genre_ids: Vec<Uuid> = genres.iter().map(|g| g.id).collect();
                        let siblings = match self
                            .repository
                            .public_song_ids_by_genres(&genre_ids, Some(song.id))
                            .await
                        {
                            Ok(mut ids) => {
                                ids.shuffle(rng);
                                ids.truncate(self.limits.songs);
                                self.repository.find_songs(&ids).await
                            }
                            Err(e) => Err(e),
                        };
                        self.put(&mut bundle, SONGS, siblings, query, RelatedGroup::Songs);
                    }
                    Err(e) => {
                        warn!(song_id = %song.id, error = %e, "Genre lookup failed, skipping sibling songs");
                    }
                }
            }
            (kind, entity) => {
                debug!(
                    %kind,
                    entity_kind = %entity.kind(),
                    "Principal kind does not match its entity, no related content"
                );
            }
        }

        bundle
    }

    fn put<T: Searchable>(
        &self,
        bundle: &mut RelatedBundle,
        label: &str,
        fetched: Result<Vec<T>>,
        query: &str,
        wrap: fn(Vec<Scored<T>>) -> RelatedGroup,
    ) {
        match fetched {
            Ok(items) => {
                let mut scored = scored::build(items, query);
                scored.truncate(self.limits.for_label(label));
                bundle.insert(label, wrap(scored));
            }
            Err(e) => {
                warn!(label, error = %e, "Related content lookup failed, omitting group");
            }
        }
    }
}
