//! Scored result lists
//!
//! Attaches a match score to each candidate and orders lists best-first.
//! Sorting is stable so equally scored candidates keep the order the index
//! returned them in, which keeps principal selection deterministic.

use serde::Serialize;
use tunes_common::{Collection, CollectionKind, Entity, EntityKind, Person, Song};
use uuid::Uuid;

use super::scorer;

/// Anything with an identifier and a text field to match queries against
pub trait Searchable {
    fn id(&self) -> Uuid;
    fn display_text(&self) -> &str;
}

impl Searchable for Song {
    fn id(&self) -> Uuid {
        self.id
    }

    fn display_text(&self) -> &str {
        &self.title
    }
}

impl Searchable for Person {
    fn id(&self) -> Uuid {
        self.id
    }

    fn display_text(&self) -> &str {
        &self.name
    }
}

impl Searchable for Collection {
    fn id(&self) -> Uuid {
        self.id
    }

    fn display_text(&self) -> &str {
        &self.title
    }
}

impl Searchable for Entity {
    fn id(&self) -> Uuid {
        Entity::id(self)
    }

    fn display_text(&self) -> &str {
        Entity::display_text(self)
    }
}

/// Entity plus its score for the current query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scored<T> {
    #[serde(flatten)]
    pub entity: T,
    pub match_score: u8,
}

/// Score every entity against `query`, best first, ties in input order
pub fn build<T: Searchable>(entities: Vec<T>, query: &str) -> Vec<Scored<T>> {
    let mut scored: Vec<Scored<T>> = entities
        .into_iter()
        .map(|entity| {
            let match_score = scorer::score(entity.display_text(), query);
            Scored { entity, match_score }
        })
        .collect();

    // Vec::sort_by is stable
    scored.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    scored
}

/// One scored list per entity kind
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KindLists {
    pub songs: Vec<Scored<Song>>,
    pub people: Vec<Scored<Person>>,
    pub playlists: Vec<Scored<Collection>>,
    pub albums: Vec<Scored<Collection>>,
    pub eps: Vec<Scored<Collection>>,
    pub singles: Vec<Scored<Collection>>,
}

impl KindLists {
    /// Score fetched candidates of `kind` and store them
    ///
    /// Entities whose variant does not belong to `kind` are dropped.
    pub fn insert(&mut self, kind: EntityKind, entities: Vec<Entity>, query: &str) {
        match kind {
            EntityKind::Song => {
                let songs = entities
                    .into_iter()
                    .filter_map(|e| match e {
                        Entity::Song(song) => Some(song),
                        _ => None,
                    })
                    .collect();
                self.songs = build(songs, query);
            }
            EntityKind::Person => {
                let people = entities
                    .into_iter()
                    .filter_map(|e| match e {
                        Entity::Person(person) => Some(person),
                        _ => None,
                    })
                    .collect();
                self.people = build(people, query);
            }
            EntityKind::Playlist | EntityKind::Album | EntityKind::Ep | EntityKind::Single => {
                let Some(collection_kind) = kind.collection_kind() else {
                    return;
                };
                let collections = entities
                    .into_iter()
                    .filter_map(|e| match e {
                        Entity::Collection(c) if c.kind == collection_kind => Some(c),
                        _ => None,
                    })
                    .collect();
                *self.collections_mut(collection_kind) = build(collections, query);
            }
        }
    }

    pub fn collections(&self, kind: CollectionKind) -> &[Scored<Collection>] {
        match kind {
            CollectionKind::Playlist => &self.playlists,
            CollectionKind::Album => &self.albums,
            CollectionKind::Ep => &self.eps,
            CollectionKind::Single => &self.singles,
        }
    }

    fn collections_mut(&mut self, kind: CollectionKind) -> &mut Vec<Scored<Collection>> {
        match kind {
            CollectionKind::Playlist => &mut self.playlists,
            CollectionKind::Album => &mut self.albums,
            CollectionKind::Ep => &mut self.eps,
            CollectionKind::Single => &mut self.singles,
        }
    }

    /// Drop `id` from every list
    pub fn remove_id(&mut self, id: Uuid) {
        self.songs.retain(|s| s.entity.id != id);
        self.people.retain(|s| s.entity.id != id);
        for list in [
            &mut self.playlists,
            &mut self.albums,
            &mut self.eps,
            &mut self.singles,
        ] {
            list.retain(|s| s.entity.id != id);
        }
    }

    /// Cap songs at `song_limit` and every other kind at `other_limit`
    pub fn truncate(&mut self, song_limit: usize, other_limit: usize) {
        self.songs.truncate(song_limit);
        self.people.truncate(other_limit);
        self.playlists.truncate(other_limit);
        self.albums.truncate(other_limit);
        self.eps.truncate(other_limit);
        self.singles.truncate(other_limit);
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
            && self.people.is_empty()
            && self.playlists.is_empty()
            && self.albums.is_empty()
            && self.eps.is_empty()
            && self.singles.is_empty()
    }
}
