// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entity record operations.
//!
//! Records are JSON documents keyed by `(kind, id)`. Updates are merge-patches
//! applied inside a transaction so unrelated fields written by other systems
//! are never clobbered.

use chrono::Utc;
use framegen_core::{merge_patch, EntityKey, FramegenError};
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};

fn decode_err(e: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
}

/// Insert or replace a record. Used by producers and fixtures; the pipeline
/// itself never creates records.
pub async fn put(
    db: &Database,
    key: &EntityKey,
    record: &serde_json::Value,
) -> Result<(), FramegenError> {
    let (kind, id) = (key.kind.clone(), key.id.clone());
    let record = record.to_string();
    let now = Utc::now().timestamp_millis();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT OR REPLACE INTO entity_records (kind, id, record, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![kind, id, record, now],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch a record, or `None` if it does not exist.
pub async fn get(
    db: &Database,
    key: &EntityKey,
) -> Result<Option<serde_json::Value>, FramegenError> {
    let (kind, id) = (key.kind.clone(), key.id.clone());
    db.connection()
        .call(move |conn| -> Result<Option<serde_json::Value>, rusqlite::Error> {
            let raw: Option<String> = conn
                .query_row(
                    "SELECT record FROM entity_records WHERE kind = ?1 AND id = ?2",
                    params![kind, id],
                    |row| row.get(0),
                )
                .optional()?;
            raw.map(|r| serde_json::from_str(&r).map_err(decode_err))
                .transpose()
        })
        .await
        .map_err(map_tr_err)
}

/// Merge-patch an existing record. Returns `false` if the record does not exist.
pub async fn merge(
    db: &Database,
    key: &EntityKey,
    patch: &serde_json::Value,
) -> Result<bool, FramegenError> {
    let (kind, id) = (key.kind.clone(), key.id.clone());
    let patch = patch.clone();
    let now = Utc::now().timestamp_millis();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            let raw: Option<String> = tx
                .query_row(
                    "SELECT record FROM entity_records WHERE kind = ?1 AND id = ?2",
                    params![kind, id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(raw) = raw else {
                return Ok(false);
            };

            let mut record: serde_json::Value = serde_json::from_str(&raw).map_err(decode_err)?;
            merge_patch(&mut record, &patch);

            tx.execute(
                "UPDATE entity_records SET record = ?3, updated_at = ?4
                 WHERE kind = ?1 AND id = ?2",
                params![kind, id, record.to_string(), now],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("entities.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn scene(id: &str) -> EntityKey {
        EntityKey::parse(&format!("scene:{id}")).unwrap()
    }

    #[tokio::test]
    async fn get_missing_record_is_none() {
        let (db, _dir) = setup_db().await;
        assert!(get(&db, &scene("404")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn merge_on_missing_record_returns_false_and_creates_nothing() {
        let (db, _dir) = setup_db().await;
        let updated = merge(&db, &scene("404"), &json!({"asset_url": "u"}))
            .await
            .unwrap();
        assert!(!updated);
        assert!(get(&db, &scene("404")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn merge_preserves_unrelated_fields() {
        let (db, _dir) = setup_db().await;
        let key = scene("1");
        put(
            &db,
            &key,
            &json!({"title": "Opening", "order": 3, "canvas": {"x": 10, "y": 20}}),
        )
        .await
        .unwrap();

        let updated = merge(
            &db,
            &key,
            &json!({"asset_url": "https://cdn/scene:1/1_1.png", "model_used": "imagen"}),
        )
        .await
        .unwrap();
        assert!(updated);

        let record = get(&db, &key).await.unwrap().unwrap();
        assert_eq!(record["title"], "Opening");
        assert_eq!(record["order"], 3);
        assert_eq!(record["canvas"], json!({"x": 10, "y": 20}));
        assert_eq!(record["asset_url"], "https://cdn/scene:1/1_1.png");
        assert_eq!(record["model_used"], "imagen");
    }

    #[tokio::test]
    async fn keys_are_composite() {
        let (db, _dir) = setup_db().await;
        put(&db, &scene("1"), &json!({"who": "scene"})).await.unwrap();
        put(
            &db,
            &EntityKey::parse("character:1").unwrap(),
            &json!({"who": "character"}),
        )
        .await
        .unwrap();

        let record = get(&db, &scene("1")).await.unwrap().unwrap();
        assert_eq!(record["who"], "scene");
    }
}
