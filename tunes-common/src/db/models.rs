//! Catalog models
//!
//! Read projections of the catalog tables. Search and recommendation never
//! write these back; the only per-request mutation is the bookmark flag on
//! [`Song::is_in_collection`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::Error;

/// Searchable entity category
///
/// Closed set: adding a kind forces every `match` on it to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Person,
    Song,
    Playlist,
    Album,
    Ep,
    Single,
}

impl EntityKind {
    /// Fixed order used when picking the principal result
    pub const PRIORITY: [EntityKind; 6] = [
        EntityKind::Person,
        EntityKind::Song,
        EntityKind::Playlist,
        EntityKind::Album,
        EntityKind::Ep,
        EntityKind::Single,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Person => "person",
            EntityKind::Song => "song",
            EntityKind::Playlist => "playlist",
            EntityKind::Album => "album",
            EntityKind::Ep => "ep",
            EntityKind::Single => "single",
        }
    }

    /// Collection flavour of this kind, if it is one
    pub fn collection_kind(&self) -> Option<CollectionKind> {
        match self {
            EntityKind::Playlist => Some(CollectionKind::Playlist),
            EntityKind::Album => Some(CollectionKind::Album),
            EntityKind::Ep => Some(CollectionKind::Ep),
            EntityKind::Single => Some(CollectionKind::Single),
            EntityKind::Person | EntityKind::Song => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collection flavour stored in `collections.kind`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Playlist,
    Album,
    Ep,
    Single,
}

impl CollectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Playlist => "playlist",
            CollectionKind::Album => "album",
            CollectionKind::Ep => "ep",
            CollectionKind::Single => "single",
        }
    }

    pub fn entity_kind(&self) -> EntityKind {
        match self {
            CollectionKind::Playlist => EntityKind::Playlist,
            CollectionKind::Album => EntityKind::Album,
            CollectionKind::Ep => EntityKind::Ep,
            CollectionKind::Single => EntityKind::Single,
        }
    }
}

impl FromStr for CollectionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "playlist" => Ok(CollectionKind::Playlist),
            "album" => Ok(CollectionKind::Album),
            "ep" => Ok(CollectionKind::Ep),
            "single" => Ok(CollectionKind::Single),
            other => Err(Error::InvalidInput(format!("unknown collection kind '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
}

/// Person credited on a song or collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: Uuid,
    pub title: String,
    /// Opaque storage reference for the cover image
    pub cover: Option<String>,
    pub duration_secs: Option<i64>,
    pub is_public: bool,
    pub owner_id: Option<Uuid>,
    pub people: Vec<PersonRef>,
    pub genres: Vec<Genre>,
    /// Present in the requesting user's bookmark collection
    #[serde(default)]
    pub is_in_collection: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
}

/// Playlist, album, EP or single
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: Uuid,
    pub kind: CollectionKind,
    pub title: String,
    pub cover: Option<String>,
    pub is_public: bool,
    pub owner_id: Option<Uuid>,
    pub people: Vec<PersonRef>,
}

/// Any searchable entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entity {
    Song(Song),
    Person(Person),
    Collection(Collection),
}

impl Entity {
    pub fn id(&self) -> Uuid {
        match self {
            Entity::Song(song) => song.id,
            Entity::Person(person) => person.id,
            Entity::Collection(collection) => collection.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Song(_) => EntityKind::Song,
            Entity::Person(_) => EntityKind::Person,
            Entity::Collection(collection) => collection.kind.entity_kind(),
        }
    }

    /// Field matched against search queries (title, or name for people)
    pub fn display_text(&self) -> &str {
        match self {
            Entity::Song(song) => &song.title,
            Entity::Person(person) => &person.name,
            Entity::Collection(collection) => &collection.title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_serializes_lowercase() {
        let json = serde_json::to_string(&EntityKind::Ep).unwrap();
        assert_eq!(json, "\"ep\"");
        assert_eq!(EntityKind::Playlist.to_string(), "playlist");
    }

    #[test]
    fn test_song_credits_serialize_without_avatar() {
        let song = Song {
            id: Uuid::new_v4(),
            title: "Blue".to_string(),
            cover: None,
            duration_secs: None,
            is_public: true,
            owner_id: None,
            people: vec![PersonRef {
                id: Uuid::new_v4(),
                name: "Joni".to_string(),
            }],
            genres: vec![],
            is_in_collection: false,
        };

        let json = serde_json::to_value(&song).unwrap();
        let credit = json["people"][0].as_object().unwrap();
        assert_eq!(credit.len(), 2);
        assert_eq!(credit["name"], "Joni");
        assert!(!credit.contains_key("avatar"));
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(EntityKind::PRIORITY[0], EntityKind::Person);
        assert_eq!(EntityKind::PRIORITY[1], EntityKind::Song);
        assert_eq!(EntityKind::PRIORITY[5], EntityKind::Single);
    }

    #[test]
    fn test_collection_kind_round_trip_through_entity_kind() {
        for kind in EntityKind::PRIORITY {
            if let Some(ck) = kind.collection_kind() {
                assert_eq!(ck.entity_kind(), kind);
                assert_eq!(ck.as_str().parse::<CollectionKind>().unwrap(), ck);
            }
        }
        assert!("mixtape".parse::<CollectionKind>().is_err());
    }

    #[test]
    fn test_entity_display_text_and_kind() {
        let album = Entity::Collection(Collection {
            id: Uuid::new_v4(),
            kind: CollectionKind::Album,
            title: "Blue".to_string(),
            cover: None,
            is_public: true,
            owner_id: None,
            people: vec![],
        });
        assert_eq!(album.display_text(), "Blue");
        assert_eq!(album.kind(), EntityKind::Album);

        let person = Entity::Person(Person {
            id: Uuid::new_v4(),
            name: "Joni".to_string(),
            avatar: None,
        });
        assert_eq!(person.display_text(), "Joni");
        assert_eq!(person.kind(), EntityKind::Person);
    }
}
