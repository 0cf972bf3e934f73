//! Song recommendations
//!
//! Seeded by a song's genres when a seed resolves, otherwise drawn from all
//! public songs. The response is only empty when there are no public songs
//! other than the seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use tunes_common::Song;
use uuid::Uuid;

use crate::catalog::EntityRepository;
use crate::error::Result;
use crate::rng::RngFactory;
use crate::search::membership;
use crate::viewer::Viewer;

/// Seed song and the genres it contributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationSeed {
    /// Set only when the requested id names an existing song
    pub song_id: Option<Uuid>,
    pub genre_ids: Vec<Uuid>,
}

/// Body of `GET /api/recommendations`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    pub seed: Option<Uuid>,
    pub songs: Vec<Song>,
}

#[derive(Clone)]
pub struct RecommendationEngine {
    repository: Arc<dyn EntityRepository>,
    rng: RngFactory,
}

impl RecommendationEngine {
    pub fn new(repository: Arc<dyn EntityRepository>, rng: RngFactory) -> Self {
        Self { repository, rng }
    }

    /// Resolve a requested seed id; an unknown id means no seed
    pub async fn resolve_seed(&self, song_id: Option<Uuid>) -> Result<RecommendationSeed> {
        let Some(song_id) = song_id else {
            return Ok(RecommendationSeed::default());
        };

        match self.repository.find_songs(&[song_id]).await?.into_iter().next() {
            Some(song) => Ok(RecommendationSeed {
                song_id: Some(song.id),
                genre_ids: song.genres.iter().map(|g| g.id).collect(),
            }),
            None => {
                debug!(%song_id, "Seed song not found, recommending without seed");
                Ok(RecommendationSeed::default())
            }
        }
    }

    /// Up to `count` songs, never including the seed
    pub async fn recommend(
        &self,
        song_id: Option<Uuid>,
        count: usize,
        viewer: &Viewer,
    ) -> Result<Recommendations> {
        let seed = self.resolve_seed(song_id).await?;
        let mut rng = self.rng.rng();

        let genre_filtered = !seed.genre_ids.is_empty();
        let pool = if genre_filtered {
            self.repository
                .public_song_ids_by_genres(&seed.genre_ids, seed.song_id)
                .await?
        } else {
            self.repository.public_song_ids(seed.song_id).await?
        };

        let mut picked = sample(pool, count, &mut rng);

        if picked.is_empty() && genre_filtered {
            debug!(seed = ?seed.song_id, "No genre siblings, falling back to all public songs");
            let pool = self.repository.public_song_ids(seed.song_id).await?;
            picked = sample(pool, count, &mut rng);
        }

        // Only the sampled ids are hydrated, in sampled order
        let mut songs = self.repository.find_songs(&picked).await?;

        membership::annotate(&mut songs, &viewer.membership);

        Ok(Recommendations {
            seed: seed.song_id,
            songs,
        })
    }
}

/// Up to `count` distinct pool entries in random order
fn sample<T>(mut pool: Vec<T>, count: usize, rng: &mut StdRng) -> Vec<T> {
    pool.shuffle(rng);
    pool.truncate(count);
    pool
}
