//! Database initialization
//!
//! Creates the catalog schema on first run and opens existing databases
//! without touching their contents. Every `CREATE` is idempotent.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open (creating if needed) the catalog database at `db_path`
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// In-memory database with the full schema
///
/// Single connection: every `sqlite::memory:` connection is its own database.
pub async fn connect_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all catalog tables and indexes
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await?;

    create_people_table(pool).await?;
    create_songs_table(pool).await?;
    create_genres_table(pool).await?;
    create_collections_table(pool).await?;

    // Linking tables
    create_song_genres_table(pool).await?;
    create_song_people_table(pool).await?;
    create_collection_songs_table(pool).await?;
    create_collection_people_table(pool).await?;

    // Per-user state
    create_bookmarks_table(pool).await?;
    create_sessions_table(pool).await?;

    Ok(())
}

async fn create_people_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS people (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            avatar TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_people_name ON people(name)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the songs table
///
/// `is_public = 0` songs are only visible to their owner.
async fn create_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            guid TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            cover TEXT,
            duration_secs INTEGER,
            is_public INTEGER NOT NULL DEFAULT 1,
            owner_id TEXT REFERENCES people(guid) ON DELETE SET NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (duration_secs IS NULL OR duration_secs >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_songs_title ON songs(title)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_songs_public ON songs(is_public)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_genres_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS genres (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the collections table
///
/// Playlists, albums, EPs and singles share one table keyed by `kind`.
async fn create_collections_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            guid TEXT PRIMARY KEY,
            kind TEXT NOT NULL CHECK (kind IN ('playlist', 'album', 'ep', 'single')),
            title TEXT NOT NULL,
            cover TEXT,
            is_public INTEGER NOT NULL DEFAULT 1,
            owner_id TEXT REFERENCES people(guid) ON DELETE SET NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_collections_kind ON collections(kind, title)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_song_genres_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS song_genres (
            song_id TEXT NOT NULL REFERENCES songs(guid) ON DELETE CASCADE,
            genre_id TEXT NOT NULL REFERENCES genres(guid) ON DELETE CASCADE,
            PRIMARY KEY (song_id, genre_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_song_genres_genre ON song_genres(genre_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the song_people table
///
/// Links songs to the people credited on them; `position` keeps credit order.
async fn create_song_people_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS song_people (
            song_id TEXT NOT NULL REFERENCES songs(guid) ON DELETE CASCADE,
            person_id TEXT NOT NULL REFERENCES people(guid) ON DELETE CASCADE,
            position INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (song_id, person_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_song_people_person ON song_people(person_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_collection_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collection_songs (
            collection_id TEXT NOT NULL REFERENCES collections(guid) ON DELETE CASCADE,
            song_id TEXT NOT NULL REFERENCES songs(guid) ON DELETE CASCADE,
            position INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (collection_id, song_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_collection_people_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collection_people (
            collection_id TEXT NOT NULL REFERENCES collections(guid) ON DELETE CASCADE,
            person_id TEXT NOT NULL REFERENCES people(guid) ON DELETE CASCADE,
            position INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (collection_id, person_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_collection_people_person ON collection_people(person_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the bookmarks table (a user's personal song collection)
async fn create_bookmarks_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookmarks (
            person_id TEXT NOT NULL REFERENCES people(guid) ON DELETE CASCADE,
            song_id TEXT NOT NULL REFERENCES songs(guid) ON DELETE CASCADE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (person_id, song_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the sessions table
///
/// `expires_at` NULL means the session never expires.
async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            person_id TEXT NOT NULL REFERENCES people(guid) ON DELETE CASCADE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            expires_at TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_schema_has_catalog_tables() {
        let pool = connect_memory().await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        for expected in [
            "bookmarks",
            "collection_people",
            "collection_songs",
            "collections",
            "genres",
            "people",
            "sessions",
            "song_genres",
            "song_people",
            "songs",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing table {}", expected);
        }
    }

    #[tokio::test]
    async fn test_create_schema_is_idempotent() {
        let pool = connect_memory().await.unwrap();
        create_schema(&pool).await.unwrap();
        create_schema(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_collection_kind_check_constraint() {
        let pool = connect_memory().await.unwrap();

        let result = sqlx::query(
            "INSERT INTO collections (guid, kind, title) VALUES ('c1', 'mixtape', 'Nope')",
        )
        .execute(&pool)
        .await;

        assert!(result.is_err(), "unknown collection kind should be rejected");
    }
}
