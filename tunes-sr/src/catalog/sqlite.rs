//! SQLite-backed catalog
//!
//! Identifiers are stored as hyphenated UUID text, as everywhere else in the
//! schema. The candidate index is a case-insensitive `LIKE` over the display
//! column, ranked exact → prefix → alphabetical so that the best candidates
//! survive the limit.
//!
//! SQLite's `LIKE` and `lower()` only fold ASCII letters. A query that
//! differs from a title only in the case of non-ASCII letters (`ÉTÉ` against
//! `été`) is not a candidate, even though the scorer would rank it as exact.
//! Session expiries are compared through `datetime()` so that both SQLite's
//! `YYYY-MM-DD HH:MM:SS` text and RFC 3339 values order correctly.

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::{HashMap, HashSet};
use tunes_common::{
    Collection, CollectionKind, EntityKind, Genre, Person, PersonRef, Song,
};
use uuid::Uuid;

use super::{CandidateIndex, EntityRepository, MembershipStore, SessionStore};
use crate::error::{Error, Result};

/// Catalog database adapter implementing every catalog trait
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn people_by_song(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<PersonRef>>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT sp.song_id, p.guid, p.name
             FROM song_people sp
             JOIN people p ON p.guid = sp.person_id
             WHERE sp.song_id IN (",
        );
        push_guid_list(&mut qb, ids);
        qb.push(" ORDER BY sp.position, p.name");

        let rows = qb.build().fetch_all(&self.pool).await?;
        group_person_refs(&rows)
    }

    async fn people_by_collection(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<PersonRef>>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT cp.collection_id, p.guid, p.name
             FROM collection_people cp
             JOIN people p ON p.guid = cp.person_id
             WHERE cp.collection_id IN (",
        );
        push_guid_list(&mut qb, ids);
        qb.push(" ORDER BY cp.position, p.name");

        let rows = qb.build().fetch_all(&self.pool).await?;
        group_person_refs(&rows)
    }

    async fn genres_by_song(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Genre>>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT sg.song_id, g.guid, g.name
             FROM song_genres sg
             JOIN genres g ON g.guid = sg.genre_id
             WHERE sg.song_id IN (",
        );
        push_guid_list(&mut qb, ids);
        qb.push(" ORDER BY g.name");

        let rows = qb.build().fetch_all(&self.pool).await?;

        let mut grouped: HashMap<Uuid, Vec<Genre>> = HashMap::new();
        for row in &rows {
            let song_id = guid_at(row, 0)?;
            grouped.entry(song_id).or_default().push(Genre {
                id: guid_at(row, 1)?,
                name: row.try_get(2)?,
            });
        }
        Ok(grouped)
    }
}

#[async_trait]
impl CandidateIndex for SqliteCatalog {
    async fn search(
        &self,
        query: &str,
        kind: EntityKind,
        viewer: Option<Uuid>,
        limit: usize,
    ) -> Result<Vec<Uuid>> {
        let contains = like_pattern(query, true);
        let prefix = like_pattern(query, false);
        let viewer = viewer.map(|v| v.to_string());
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = match kind {
            EntityKind::Person => {
                sqlx::query(
                    r"SELECT guid FROM people
                      WHERE name LIKE ? ESCAPE '\'
                      ORDER BY lower(name) = lower(?) DESC, name LIKE ? ESCAPE '\' DESC, name
                      LIMIT ?",
                )
                .bind(&contains)
                .bind(query)
                .bind(&prefix)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            EntityKind::Song => {
                sqlx::query(
                    r"SELECT guid FROM songs
                      WHERE title LIKE ? ESCAPE '\' AND (is_public = 1 OR owner_id = ?)
                      ORDER BY lower(title) = lower(?) DESC, title LIKE ? ESCAPE '\' DESC, title
                      LIMIT ?",
                )
                .bind(&contains)
                .bind(&viewer)
                .bind(query)
                .bind(&prefix)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            EntityKind::Playlist | EntityKind::Album | EntityKind::Ep | EntityKind::Single => {
                let Some(collection_kind) = kind.collection_kind() else {
                    return Ok(Vec::new());
                };
                sqlx::query(
                    r"SELECT guid FROM collections
                      WHERE kind = ? AND title LIKE ? ESCAPE '\'
                        AND (is_public = 1 OR owner_id = ?)
                      ORDER BY lower(title) = lower(?) DESC, title LIKE ? ESCAPE '\' DESC, title
                      LIMIT ?",
                )
                .bind(collection_kind.as_str())
                .bind(&contains)
                .bind(&viewer)
                .bind(query)
                .bind(&prefix)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        first_column_guids(&rows)
    }
}

#[async_trait]
impl EntityRepository for SqliteCatalog {
    async fn find_songs(&self, ids: &[Uuid]) -> Result<Vec<Song>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT guid, title, cover, duration_secs, is_public, owner_id
             FROM songs WHERE guid IN (",
        );
        push_guid_list(&mut qb, ids);
        let rows = qb.build().fetch_all(&self.pool).await?;

        let mut people = self.people_by_song(ids).await?;
        let mut genres = self.genres_by_song(ids).await?;

        let mut by_id = HashMap::with_capacity(rows.len());
        for row in &rows {
            let id = guid_at(row, 0)?;
            let song = Song {
                id,
                title: row.try_get(1)?,
                cover: row.try_get(2)?,
                duration_secs: row.try_get(3)?,
                is_public: row.try_get::<i64, _>(4)? != 0,
                owner_id: optional_guid_at(row, 5)?,
                people: people.remove(&id).unwrap_or_default(),
                genres: genres.remove(&id).unwrap_or_default(),
                is_in_collection: false,
            };
            by_id.insert(id, song);
        }

        Ok(in_request_order(ids, by_id))
    }

    async fn find_people(&self, ids: &[Uuid]) -> Result<Vec<Person>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT guid, name, avatar FROM people WHERE guid IN (");
        push_guid_list(&mut qb, ids);
        let rows = qb.build().fetch_all(&self.pool).await?;

        let mut by_id = HashMap::with_capacity(rows.len());
        for row in &rows {
            let person = person_from_row(row)?;
            by_id.insert(person.id, person);
        }

        Ok(in_request_order(ids, by_id))
    }

    async fn find_collections(
        &self,
        ids: &[Uuid],
        kind: CollectionKind,
    ) -> Result<Vec<Collection>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT guid, kind, title, cover, is_public, owner_id FROM collections WHERE kind = ",
        );
        qb.push_bind(kind.as_str());
        qb.push(" AND guid IN (");
        push_guid_list(&mut qb, ids);
        let rows = qb.build().fetch_all(&self.pool).await?;

        let mut people = self.people_by_collection(ids).await?;

        let mut by_id = HashMap::with_capacity(rows.len());
        for row in &rows {
            let id = guid_at(row, 0)?;
            let kind: CollectionKind = row.try_get::<String, _>(1)?.parse()?;
            let collection = Collection {
                id,
                kind,
                title: row.try_get(2)?,
                cover: row.try_get(3)?,
                is_public: row.try_get::<i64, _>(4)? != 0,
                owner_id: optional_guid_at(row, 5)?,
                people: people.remove(&id).unwrap_or_default(),
            };
            by_id.insert(id, collection);
        }

        Ok(in_request_order(ids, by_id))
    }

    async fn person_songs(&self, person_id: Uuid, viewer: Option<Uuid>) -> Result<Vec<Song>> {
        let rows = sqlx::query(
            "SELECT s.guid FROM songs s
             JOIN song_people sp ON sp.song_id = s.guid
             WHERE sp.person_id = ? AND (s.is_public = 1 OR s.owner_id = ?)
             ORDER BY s.title",
        )
        .bind(person_id.to_string())
        .bind(viewer.map(|v| v.to_string()))
        .fetch_all(&self.pool)
        .await?;

        self.find_songs(&first_column_guids(&rows)?).await
    }

    async fn person_collections(
        &self,
        person_id: Uuid,
        kind: CollectionKind,
        viewer: Option<Uuid>,
    ) -> Result<Vec<Collection>> {
        let person = person_id.to_string();
        let rows = sqlx::query(
            "SELECT c.guid FROM collections c
             WHERE c.kind = ?
               AND (c.owner_id = ? OR EXISTS (
                   SELECT 1 FROM collection_people cp
                   WHERE cp.collection_id = c.guid AND cp.person_id = ?))
               AND (c.is_public = 1 OR c.owner_id = ?)
             ORDER BY c.title",
        )
        .bind(kind.as_str())
        .bind(&person)
        .bind(&person)
        .bind(viewer.map(|v| v.to_string()))
        .fetch_all(&self.pool)
        .await?;

        self.find_collections(&first_column_guids(&rows)?, kind).await
    }

    async fn collection_songs(
        &self,
        collection_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<Vec<Song>> {
        let rows = sqlx::query(
            "SELECT s.guid FROM collection_songs cs
             JOIN songs s ON s.guid = cs.song_id
             WHERE cs.collection_id = ? AND (s.is_public = 1 OR s.owner_id = ?)
             ORDER BY cs.position",
        )
        .bind(collection_id.to_string())
        .bind(viewer.map(|v| v.to_string()))
        .fetch_all(&self.pool)
        .await?;

        self.find_songs(&first_column_guids(&rows)?).await
    }

    async fn collection_people(&self, collection_id: Uuid) -> Result<Vec<Person>> {
        let rows = sqlx::query(
            "SELECT person_id FROM collection_people
             WHERE collection_id = ?
             ORDER BY position",
        )
        .bind(collection_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        self.find_people(&first_column_guids(&rows)?).await
    }

    async fn song_people(&self, song_id: Uuid) -> Result<Vec<Person>> {
        let rows = sqlx::query(
            "SELECT person_id FROM song_people
             WHERE song_id = ?
             ORDER BY position",
        )
        .bind(song_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        self.find_people(&first_column_guids(&rows)?).await
    }

    async fn song_genres(&self, song_id: Uuid) -> Result<Vec<Genre>> {
        let rows = sqlx::query(
            "SELECT g.guid, g.name FROM song_genres sg
             JOIN genres g ON g.guid = sg.genre_id
             WHERE sg.song_id = ?
             ORDER BY g.name",
        )
        .bind(song_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Genre> {
                Ok(Genre {
                    id: guid_at(row, 0)?,
                    name: row.try_get(1)?,
                })
            })
            .collect()
    }

    async fn public_song_ids_by_genres(
        &self,
        genre_ids: &[Uuid],
        exclude: Option<Uuid>,
    ) -> Result<Vec<Uuid>> {
        if genre_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT DISTINCT s.guid, s.title FROM songs s
             JOIN song_genres sg ON sg.song_id = s.guid
             WHERE s.is_public = 1 AND sg.genre_id IN (",
        );
        push_guid_list(&mut qb, genre_ids);
        if let Some(exclude) = exclude {
            qb.push(" AND s.guid <> ");
            qb.push_bind(exclude.to_string());
        }
        qb.push(" ORDER BY s.title");

        let rows = qb.build().fetch_all(&self.pool).await?;
        first_column_guids(&rows)
    }

    async fn public_song_ids(&self, exclude: Option<Uuid>) -> Result<Vec<Uuid>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT guid FROM songs WHERE is_public = 1");
        if let Some(exclude) = exclude {
            qb.push(" AND guid <> ");
            qb.push_bind(exclude.to_string());
        }
        qb.push(" ORDER BY title");

        let rows = qb.build().fetch_all(&self.pool).await?;
        first_column_guids(&rows)
    }
}

#[async_trait]
impl SessionStore for SqliteCatalog {
    async fn current_user(&self, token: &str) -> Result<Option<Person>> {
        let row = sqlx::query(
            "SELECT p.guid, p.name, p.avatar FROM sessions s
             JOIN people p ON p.guid = s.person_id
             WHERE s.token = ?
               AND (s.expires_at IS NULL OR datetime(s.expires_at) > datetime('now'))",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(person_from_row).transpose()
    }
}

#[async_trait]
impl MembershipStore for SqliteCatalog {
    async fn membership_song_ids(&self, person_id: Uuid) -> Result<HashSet<Uuid>> {
        let rows = sqlx::query("SELECT song_id FROM bookmarks WHERE person_id = ?")
            .bind(person_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(|row| guid_at(row, 0)).collect()
    }
}

/// `%query%` (or `query%`) with LIKE wildcards in the query escaped
fn like_pattern(query: &str, leading_wildcard: bool) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    if leading_wildcard {
        pattern.push('%');
    }
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Push `id1, id2, ...)` as bound parameters
fn push_guid_list(qb: &mut QueryBuilder<'_, Sqlite>, ids: &[Uuid]) {
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(id.to_string());
    }
    separated.push_unseparated(")");
}

fn parse_guid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::InvalidData(format!("bad guid '{}': {}", value, e)))
}

fn guid_at(row: &SqliteRow, index: usize) -> Result<Uuid> {
    parse_guid(&row.try_get::<String, _>(index)?)
}

fn optional_guid_at(row: &SqliteRow, index: usize) -> Result<Option<Uuid>> {
    row.try_get::<Option<String>, _>(index)?
        .as_deref()
        .map(parse_guid)
        .transpose()
}

fn first_column_guids(rows: &[SqliteRow]) -> Result<Vec<Uuid>> {
    rows.iter().map(|row| guid_at(row, 0)).collect()
}

fn person_from_row(row: &SqliteRow) -> Result<Person> {
    Ok(Person {
        id: guid_at(row, 0)?,
        name: row.try_get(1)?,
        avatar: row.try_get(2)?,
    })
}

fn group_person_refs(rows: &[SqliteRow]) -> Result<HashMap<Uuid, Vec<PersonRef>>> {
    let mut grouped: HashMap<Uuid, Vec<PersonRef>> = HashMap::new();
    for row in rows {
        let owner = guid_at(row, 0)?;
        grouped.entry(owner).or_default().push(PersonRef {
            id: guid_at(row, 1)?,
            name: row.try_get(2)?,
        });
    }
    Ok(grouped)
}

/// Reorder hydrated rows to follow `ids`, skipping unknown and repeated ids
fn in_request_order<T>(ids: &[Uuid], mut by_id: HashMap<Uuid, T>) -> Vec<T> {
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}
