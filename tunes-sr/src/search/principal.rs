//! Principal result selection
//!
//! Picks the single anchor entity a search response is built around.
//!
//! Two passes over the kinds in [`EntityKind::PRIORITY`] order:
//! 1. The first entity whose display text equals the query exactly. This
//!    comparison is case-sensitive, unlike the scorer's equality rule.
//! 2. Otherwise the head of the first non-empty list. This is deliberately
//!    not a best-score search across kinds: a later kind never wins over an
//!    earlier non-empty one, whatever the scores.

use serde::Serialize;
use tunes_common::{Entity, EntityKind};

use super::scored::{KindLists, Scored, Searchable};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Principal {
    pub kind: EntityKind,
    pub entity: Entity,
}

/// Choose the principal for `query`, or `None` when every list is empty
pub fn select(lists: &KindLists, query: &str) -> Option<Principal> {
    EntityKind::PRIORITY
        .iter()
        .find_map(|&kind| first_in(lists, kind, |text| text == query))
        .or_else(|| {
            EntityKind::PRIORITY
                .iter()
                .find_map(|&kind| first_in(lists, kind, |_| true))
        })
}

fn first_in(
    lists: &KindLists,
    kind: EntityKind,
    accept: impl Fn(&str) -> bool,
) -> Option<Principal> {
    let entity = match kind {
        EntityKind::Person => first(&lists.people, &accept).map(Entity::Person),
        EntityKind::Song => first(&lists.songs, &accept).map(Entity::Song),
        EntityKind::Playlist | EntityKind::Album | EntityKind::Ep | EntityKind::Single => {
            let collection_kind = kind.collection_kind()?;
            first(lists.collections(collection_kind), &accept).map(Entity::Collection)
        }
    }?;

    Some(Principal { kind, entity })
}

fn first<T: Searchable + Clone>(list: &[Scored<T>], accept: &impl Fn(&str) -> bool) -> Option<T> {
    list.iter()
        .find(|scored| accept(scored.entity.display_text()))
        .map(|scored| scored.entity.clone())
}
