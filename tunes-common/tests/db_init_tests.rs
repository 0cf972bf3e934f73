//! Database bootstrap on first run and on reopen

use tunes_common::db::init::init_database;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("tunes.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing_without_losing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tunes.db");

    let pool = init_database(&db_path).await.unwrap();
    sqlx::query("INSERT INTO people (guid, name) VALUES ('p1', 'Alice')")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let pool = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM people")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(count, 1);
}
