//! Integration tests for GET /api/search

mod helpers;

use async_trait::async_trait;
use axum::http::StatusCode;
use helpers::*;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method
use tunes_common::EntityKind;
use tunes_sr::catalog::{CandidateIndex, SqliteCatalog};
use tunes_sr::{Catalog, Error};
use uuid::Uuid;

/// Index whose song kind is down; other kinds go to the SQLite index
struct SongIndexDown {
    inner: SqliteCatalog,
}

#[async_trait]
impl CandidateIndex for SongIndexDown {
    async fn search(
        &self,
        query: &str,
        kind: EntityKind,
        viewer: Option<Uuid>,
        limit: usize,
    ) -> tunes_sr::Result<Vec<Uuid>> {
        match kind {
            EntityKind::Song => Err(Error::InvalidData("song index offline".to_string())),
            _ => self.inner.search(query, kind, viewer, limit).await,
        }
    }
}

// =============================================================================
// Health and build info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app(Catalog::sqlite(setup_test_db().await));

    let response = app.oneshot(test_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "tunes-sr");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let app = setup_app(Catalog::sqlite(setup_test_db().await));

    let response = app.oneshot(test_request("/api/buildinfo")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_alice_person_is_principal() {
    let pool = setup_test_db().await;
    let alice = insert_person(&pool, "Alice").await;
    let own_song = insert_song(&pool, "Down the Rabbit Hole", Some(alice), &[]).await;
    let titled = insert_song(&pool, "Alice's Song", None, &[]).await;
    let app = setup_app(Catalog::sqlite(pool));

    let response = app.oneshot(test_request("/api/search?q=Alice")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["principal_kind"], "person");
    assert_eq!(body["principal"]["name"], "Alice");
    assert_eq!(body["principal"]["id"], alice.to_string());

    // Only the principal itself is dropped from the lists
    assert_eq!(ids_of(&body["results"]["people"]), Vec::<String>::new());
    assert_eq!(ids_of(&body["results"]["songs"]), vec![titled.to_string()]);
    assert_eq!(body["results"]["songs"][0]["match_score"], 80);
    assert_eq!(body["results"]["songs"][0]["is_in_collection"], false);

    assert_eq!(ids_of(&body["related"]["songs"]), vec![own_song.to_string()]);
    assert!(body["related"]["playlists_of_artist"].is_array());
    assert!(body["related"]["albums_of_artist"].is_array());
}

#[tokio::test]
async fn test_blank_query_returns_empty_shape() {
    let pool = setup_test_db().await;
    insert_person(&pool, "Alice").await;
    let app = setup_app(Catalog::sqlite(pool));

    let response = app.oneshot(test_request("/api/search?q=%20%20")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body["principal"].is_null());
    assert!(body["principal_kind"].is_null());
    for key in ["songs", "people", "playlists", "albums", "eps", "singles"] {
        assert_eq!(body["results"][key], serde_json::json!([]), "{key}");
    }
}

#[tokio::test]
async fn test_missing_query_param_is_blank() {
    let app = setup_app(Catalog::sqlite(setup_test_db().await));

    let response = app.oneshot(test_request("/api/search")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body["principal"].is_null());
}

#[tokio::test]
async fn test_no_matches_gives_null_principal() {
    let pool = setup_test_db().await;
    insert_song(&pool, "Something", None, &[]).await;
    let app = setup_app(Catalog::sqlite(pool));

    let response = app.oneshot(test_request("/api/search?q=zzz")).await.unwrap();
    let body = extract_json(response.into_body()).await;

    assert!(body["principal"].is_null());
    assert!(body["principal_kind"].is_null());
    assert_eq!(body["related"], serde_json::json!({}));
}

#[tokio::test]
async fn test_bookmarked_songs_flagged_for_session() {
    let pool = setup_test_db().await;
    let listener = insert_person(&pool, "Listener").await;
    let saved = insert_song(&pool, "Blue Monday", None, &[]).await;
    insert_song(&pool, "Blue Velvet", None, &[]).await;
    insert_session(&pool, "token-1", listener).await;
    insert_bookmark(&pool, listener, saved).await;
    let app = setup_app(Catalog::sqlite(pool));

    let response = app
        .oneshot(authed_request("/api/search?q=blue", "token-1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    // Principal is the first song, the other stays listed
    let mut songs: Vec<&serde_json::Value> = body["results"]["songs"].as_array().unwrap().iter().collect();
    songs.push(&body["principal"]);
    for song in songs {
        let expected = song["id"] == saved.to_string();
        assert_eq!(song["is_in_collection"], expected);
    }
}

#[tokio::test]
async fn test_unknown_token_served_anonymously() {
    let pool = setup_test_db().await;
    insert_song(&pool, "Anything", None, &[]).await;
    let app = setup_app(Catalog::sqlite(pool));

    let response = app
        .oneshot(authed_request("/api/search?q=Anything", "nope"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["principal_kind"], "song");
    assert_eq!(body["principal"]["is_in_collection"], false);
}

#[tokio::test]
async fn test_failing_kind_does_not_abort_search() {
    let pool = setup_test_db().await;
    let alice = insert_person(&pool, "Alice").await;
    let song = insert_song(&pool, "Alice's Song", Some(alice), &[]).await;
    let index = SongIndexDown {
        inner: SqliteCatalog::new(pool.clone()),
    };
    let catalog = Catalog::sqlite(pool).with_index(Arc::new(index));
    let app = setup_app(catalog);

    let response = app.oneshot(test_request("/api/search?q=Alice")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["principal_kind"], "person");
    assert_eq!(body["principal"]["id"], alice.to_string());
    assert_eq!(body["principal"]["name"], "Alice");
    assert_eq!(body["results"]["songs"], serde_json::json!([]));
    // Related content comes from the repository, not the index
    assert_eq!(ids_of(&body["related"]["songs"]), vec![song.to_string()]);
}

#[tokio::test]
async fn test_song_principal_related_groups() {
    let pool = setup_test_db().await;
    let singer = insert_person(&pool, "Singer").await;
    let rock = insert_genre(&pool, "rock").await;
    let anchor = insert_song(&pool, "Thunder", Some(singer), &[rock]).await;
    let sibling = insert_song(&pool, "Lightning", None, &[rock]).await;
    let app = setup_app(Catalog::sqlite(pool));

    let response = app.oneshot(test_request("/api/search?q=Thunder")).await.unwrap();
    let body = extract_json(response.into_body()).await;

    assert_eq!(body["principal_kind"], "song");
    assert_eq!(body["principal"]["id"], anchor.to_string());
    assert_eq!(ids_of(&body["related"]["artists_of_song"]), vec![singer.to_string()]);
    assert_eq!(ids_of(&body["related"]["songs"]), vec![sibling.to_string()]);
}
