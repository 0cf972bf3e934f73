//! Shared fixtures for tunes-sr API tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Request},
};
use serde_json::Value;
use sqlx::SqlitePool;
use tunes_common::config::TomlConfig;
use tunes_common::db::connect_memory;
use tunes_sr::{build_router, AppState, Catalog};
use uuid::Uuid;

/// Fresh in-memory catalog
pub async fn setup_test_db() -> SqlitePool {
    connect_memory().await.expect("Should create in-memory database")
}

/// Router over `catalog` with deterministic sampling
pub fn setup_app(catalog: Catalog) -> axum::Router {
    let config = TomlConfig {
        rng_seed: Some(17),
        ..TomlConfig::default()
    };
    build_router(AppState::new(catalog, &config))
}

pub fn test_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn authed_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

pub async fn insert_person(pool: &SqlitePool, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO people (guid, name) VALUES (?, ?)")
        .bind(id.to_string())
        .bind(name)
        .execute(pool)
        .await
        .unwrap();
    id
}

pub async fn insert_genre(pool: &SqlitePool, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO genres (guid, name) VALUES (?, ?)")
        .bind(id.to_string())
        .bind(name)
        .execute(pool)
        .await
        .unwrap();
    id
}

/// Public song credited to `artist` (if any) and tagged with `genres`
pub async fn insert_song(
    pool: &SqlitePool,
    title: &str,
    artist: Option<Uuid>,
    genres: &[Uuid],
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO songs (guid, title) VALUES (?, ?)")
        .bind(id.to_string())
        .bind(title)
        .execute(pool)
        .await
        .unwrap();

    if let Some(artist) = artist {
        sqlx::query("INSERT INTO song_people (song_id, person_id) VALUES (?, ?)")
            .bind(id.to_string())
            .bind(artist.to_string())
            .execute(pool)
            .await
            .unwrap();
    }

    for genre in genres {
        sqlx::query("INSERT INTO song_genres (song_id, genre_id) VALUES (?, ?)")
            .bind(id.to_string())
            .bind(genre.to_string())
            .execute(pool)
            .await
            .unwrap();
    }
    id
}

pub async fn insert_session(pool: &SqlitePool, token: &str, person: Uuid) {
    sqlx::query("INSERT INTO sessions (token, person_id) VALUES (?, ?)")
        .bind(token)
        .bind(person.to_string())
        .execute(pool)
        .await
        .unwrap();
}

pub async fn insert_bookmark(pool: &SqlitePool, person: Uuid, song: Uuid) {
    sqlx::query("INSERT INTO bookmarks (person_id, song_id) VALUES (?, ?)")
        .bind(person.to_string())
        .bind(song.to_string())
        .execute(pool)
        .await
        .unwrap();
}

/// Ids of every object in a JSON array
pub fn ids_of(list: &Value) -> Vec<String> {
    list.as_array()
        .expect("Should be an array")
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}
