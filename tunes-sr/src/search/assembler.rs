//! Search response assembly

use serde::Serialize;
use tunes_common::{Entity, EntityKind};

use super::expander::{ListLimits, RelatedBundle};
use super::principal::Principal;
use super::scored::KindLists;

/// Body of `GET /api/search`
///
/// `principal` and `principal_kind` are always present, `null` when no
/// principal was chosen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub principal: Option<Entity>,
    pub principal_kind: Option<EntityKind>,
    pub results: KindLists,
    pub related: RelatedBundle,
}

impl SearchResponse {
    /// Response for a query that matched nothing or was blank
    pub fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            principal: None,
            principal_kind: None,
            results: KindLists::default(),
            related: RelatedBundle::default(),
        }
    }
}

/// Merge the pipeline outputs into the final response
///
/// The principal is removed from every per-kind list before the lists are
/// cut to `limits`, so a removed principal frees a slot. Related groups are
/// left as they are.
pub fn assemble(
    query: &str,
    principal: Option<Principal>,
    mut results: KindLists,
    related: RelatedBundle,
    limits: ListLimits,
) -> SearchResponse {
    if let Some(principal) = &principal {
        results.remove_id(principal.entity.id());
    }
    results.truncate(limits.songs, limits.others);

    let (principal, principal_kind) = match principal {
        Some(Principal { kind, entity }) => (Some(entity), Some(kind)),
        None => (None, None),
    };

    SearchResponse {
        query: query.to_string(),
        principal,
        principal_kind,
        results,
        related,
    }
}
