//! Search pipeline
//!
//! query → per-kind fetch (concurrent) → score and sort → principal →
//! related content → bookmark flags → assembled response
//!
//! A search never fails as a whole. A kind whose fetch fails contributes no
//! candidates, and a related group whose lookup fails is left out.

pub mod assembler;
pub mod expander;
pub mod fetcher;
pub mod membership;
pub mod principal;
pub mod scored;
pub mod scorer;

pub use assembler::SearchResponse;
pub use expander::{ListLimits, RelatedBundle, RelatedContentExpander, RelatedGroup};
pub use fetcher::CandidateFetcher;
pub use membership::{MembershipSet, SongBearing};
pub use principal::Principal;
pub use scored::{KindLists, Scored};

use futures::future::join_all;
use tracing::{debug, warn};
use tunes_common::config::{EmptyQueryPolicy, SearchConfig};
use tunes_common::EntityKind;

use crate::catalog::Catalog;
use crate::rng::RngFactory;
use crate::viewer::Viewer;

#[derive(Clone)]
pub struct SearchEngine {
    fetcher: CandidateFetcher,
    expander: RelatedContentExpander,
    limits: ListLimits,
    candidate_limit: usize,
    empty_query: EmptyQueryPolicy,
    rng: RngFactory,
}

impl SearchEngine {
    pub fn new(catalog: &Catalog, config: &SearchConfig, rng: RngFactory) -> Self {
        let limits = ListLimits {
            songs: config.song_limit,
            others: config.other_limit,
        };

        Self {
            fetcher: CandidateFetcher::new(catalog.index.clone(), catalog.repository.clone()),
            expander: RelatedContentExpander::new(catalog.repository.clone(), limits),
            limits,
            candidate_limit: config.candidate_limit,
            empty_query: config.empty_query,
            rng,
        }
    }

    pub async fn search(&self, raw_query: &str, viewer: &Viewer) -> SearchResponse {
        let query = raw_query.trim();

        if query.is_empty() && self.empty_query == EmptyQueryPolicy::Empty {
            debug!("Blank query, returning empty response");
            return SearchResponse::empty(query);
        }

        let viewer_id = viewer.user_id();
        let fetches = EntityKind::PRIORITY.iter().map(|&kind| async move {
            let outcome = self
                .fetcher
                .fetch(query, kind, viewer_id, self.candidate_limit)
                .await;
            (kind, outcome)
        });

        let mut results = KindLists::default();
        for (kind, outcome) in join_all(fetches).await {
            match outcome {
                Ok(entities) => {
                    debug!(%kind, count = entities.len(), "Fetched candidates");
                    results.insert(kind, entities, query);
                }
                Err(e) => {
                    warn!(%kind, error = %e, "Candidate fetch failed, treating kind as empty");
                }
            }
        }

        // Browsing lists entities without anchoring on one
        let mut principal = if query.is_empty() {
            None
        } else {
            principal::select(&results, query)
        };

        let mut related = match &principal {
            Some(principal) => {
                debug!(kind = %principal.kind, id = %principal.entity.id(), "Selected principal");
                let mut rng = self.rng.rng();
                self.expander
                    .expand(principal, query, viewer_id, &mut rng)
                    .await
            }
            None => RelatedBundle::default(),
        };

        membership::annotate(&mut results.songs, &viewer.membership);
        for group in related.groups_mut() {
            group.annotate_membership(&viewer.membership);
        }
        if let Some(principal) = principal.as_mut() {
            principal.annotate_membership(&viewer.membership);
        }

        assembler::assemble(query, principal, results, related, self.limits)
    }
}
