use pastel_core::db::schema::{stored_version, SCHEMA_VERSION};
use pastel_core::db::{open_db, open_db_in_memory, DbError};
use pastel_core::{BlobStore, SqliteBlobStore};
use rusqlite::Connection;

#[test]
fn kv_store_has_expected_columns() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(stored_version(&conn).unwrap(), SCHEMA_VERSION);

    let mut stmt = conn
        .prepare("SELECT name, type, pk, \"notnull\" FROM pragma_table_info('kv_store') ORDER BY cid;")
        .unwrap();
    let columns: Vec<(String, String, i64, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        columns,
        vec![
            ("key".to_string(), "TEXT".to_string(), 1, 1),
            ("value".to_string(), "TEXT".to_string(), 0, 1),
            ("updated_at".to_string(), "INTEGER".to_string(), 0, 1),
        ]
    );
}

#[test]
fn updated_at_defaults_to_epoch_millis() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_store (key, value) VALUES ('k', '{}');",
        [],
    )
    .unwrap();
    let updated_at: i64 = conn
        .query_row("SELECT updated_at FROM kv_store WHERE key = 'k';", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert!(updated_at > 1_600_000_000_000, "updated_at={updated_at}");
}

#[test]
fn reopening_keeps_schema_and_stored_blob() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.db");

    let first = SqliteBlobStore::open(&path).unwrap();
    first.write("board", r#"{"a":1}"#).unwrap();
    drop(first);

    let second = SqliteBlobStore::open(&path).unwrap();
    assert_eq!(stored_version(second.connection()).unwrap(), SCHEMA_VERSION);
    assert_eq!(second.read("board").unwrap().as_deref(), Some(r#"{"a":1}"#));
    let rows: i64 = second
        .connection()
        .query_row("SELECT COUNT(*) FROM kv_store;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn newer_schema_file_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 42;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 42);
            assert_eq!(supported, SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}
