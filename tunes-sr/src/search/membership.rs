//! Bookmark membership annotation
//!
//! Every song handed back to a client carries `is_in_collection`, true when
//! the song is in the requesting user's bookmark collection. The flag is set
//! through [`SongBearing`] so that one pass covers plain songs, scored songs,
//! related groups and a song principal alike. People and collections are
//! never flagged.

use std::collections::HashSet;
use tunes_common::{Entity, Song};
use uuid::Uuid;

use super::expander::RelatedGroup;
use super::principal::Principal;
use super::scored::Scored;

/// Song ids in one user's bookmark collection (empty when anonymous)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipSet(HashSet<Uuid>);

impl MembershipSet {
    pub fn new(ids: HashSet<Uuid>) -> Self {
        Self(ids)
    }

    pub fn contains(&self, song_id: &Uuid) -> bool {
        self.0.contains(song_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Uuid> for MembershipSet {
    fn from_iter<I: IntoIterator<Item = Uuid>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Something that may hold songs needing the bookmark flag
pub trait SongBearing {
    fn annotate_membership(&mut self, membership: &MembershipSet);
}

impl SongBearing for Song {
    fn annotate_membership(&mut self, membership: &MembershipSet) {
        self.is_in_collection = membership.contains(&self.id);
    }
}

impl SongBearing for Scored<Song> {
    fn annotate_membership(&mut self, membership: &MembershipSet) {
        self.entity.annotate_membership(membership);
    }
}

impl SongBearing for RelatedGroup {
    fn annotate_membership(&mut self, membership: &MembershipSet) {
        match self {
            RelatedGroup::Songs(songs) => annotate(songs, membership),
            RelatedGroup::People(_) | RelatedGroup::Collections(_) => {}
        }
    }
}

impl SongBearing for Principal {
    fn annotate_membership(&mut self, membership: &MembershipSet) {
        match &mut self.entity {
            Entity::Song(song) => song.annotate_membership(membership),
            Entity::Person(_) | Entity::Collection(_) => {}
        }
    }
}

/// Set the bookmark flag on every item
pub fn annotate<T: SongBearing>(items: &mut [T], membership: &MembershipSet) {
    for item in items.iter_mut() {
        item.annotate_membership(membership);
    }
}
