// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Visibility-timeout queue operations.
//!
//! A read never deletes: it pushes the message's `vt` into the future and bumps
//! `read_ct`. Until `vt` passes, no other reader can claim the message. A
//! message leaves the live table only through [`delete`] or [`archive`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use framegen_core::{Envelope, FramegenError, MessageId, QueueName};
use rusqlite::params;
use tracing::warn;

use crate::database::{map_tr_err, Database};

/// Raw row returned by a claim, before payload decoding.
struct ClaimedRow {
    msg_id: i64,
    read_ct: i32,
    enqueued_at: i64,
    vt: i64,
    payload: String,
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

/// Append a payload to `queue`. Returns the new message id.
pub async fn send(
    db: &Database,
    queue: QueueName,
    payload: &serde_json::Value,
) -> Result<MessageId, FramegenError> {
    let queue_name = queue.to_string();
    let payload = payload.to_string();
    let now = now_millis();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO queue_messages (queue_name, payload, read_ct, enqueued_at, vt)
                 VALUES (?1, ?2, 0, ?3, ?3)",
                params![queue_name, payload, now],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map(MessageId)
        .map_err(map_tr_err)
}

/// Claim up to `max_count` visible messages from `queue`.
///
/// The select-and-update is a single `UPDATE ... RETURNING` statement run on
/// the connection's one background thread, so two concurrent readers can
/// never claim the same message.
pub async fn read(
    db: &Database,
    queue: QueueName,
    visibility_timeout: Duration,
    max_count: usize,
) -> Result<Vec<Envelope>, FramegenError> {
    if max_count == 0 {
        return Ok(Vec::new());
    }

    let queue_name = queue.to_string();
    let now = now_millis();
    let hidden_until = now + i64::try_from(visibility_timeout.as_millis()).unwrap_or(i64::MAX / 2);
    let limit = i64::try_from(max_count).unwrap_or(i64::MAX);

    let mut rows = db
        .connection()
        .call(move |conn| -> Result<Vec<ClaimedRow>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "UPDATE queue_messages
                 SET vt = ?1, read_ct = read_ct + 1
                 WHERE msg_id IN (
                     SELECT msg_id FROM queue_messages
                     WHERE queue_name = ?2 AND vt <= ?3
                     ORDER BY msg_id ASC
                     LIMIT ?4
                 )
                 RETURNING msg_id, read_ct, enqueued_at, vt, payload",
            )?;
            let claimed = stmt
                .query_map(params![hidden_until, queue_name, now, limit], |row| {
                    Ok(ClaimedRow {
                        msg_id: row.get(0)?,
                        read_ct: row.get(1)?,
                        enqueued_at: row.get(2)?,
                        vt: row.get(3)?,
                        payload: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(claimed)
        })
        .await
        .map_err(map_tr_err)?;

    // RETURNING order is unspecified; keep FIFO.
    rows.sort_by_key(|row| row.msg_id);

    Ok(rows.into_iter().map(ClaimedRow::into_envelope).collect())
}

impl ClaimedRow {
    /// A payload that is not JSON is handed on as a JSON string, so the
    /// consumer fails that one message instead of the whole claim.
    fn into_envelope(self) -> Envelope {
        let payload = serde_json::from_str(&self.payload).unwrap_or_else(|e| {
            warn!(msg_id = self.msg_id, error = %e, "claimed message has a non-JSON payload");
            serde_json::Value::String(self.payload)
        });
        Envelope {
            message_id: MessageId(self.msg_id),
            read_count: self.read_ct,
            enqueued_at: millis_to_datetime(self.enqueued_at),
            visible_at: millis_to_datetime(self.vt),
            payload,
        }
    }
}

/// Delete a message. Returns `false` if no such message was live.
pub async fn delete(db: &Database, queue: QueueName, id: MessageId) -> Result<bool, FramegenError> {
    let queue_name = queue.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "DELETE FROM queue_messages WHERE queue_name = ?1 AND msg_id = ?2",
                params![queue_name, id.0],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Move a message into `queue_archive`. Returns `false` if no such message was live.
pub async fn archive(
    db: &Database,
    queue: QueueName,
    id: MessageId,
) -> Result<bool, FramegenError> {
    let queue_name = queue.to_string();
    let now = now_millis();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            let copied = tx.execute(
                "INSERT INTO queue_archive
                     (msg_id, queue_name, payload, read_ct, enqueued_at, vt, archived_at)
                 SELECT msg_id, queue_name, payload, read_ct, enqueued_at, vt, ?3
                 FROM queue_messages WHERE queue_name = ?1 AND msg_id = ?2",
                params![queue_name, id.0, now],
            )?;
            tx.execute(
                "DELETE FROM queue_messages WHERE queue_name = ?1 AND msg_id = ?2",
                params![queue_name, id.0],
            )?;
            tx.commit()?;
            Ok(copied > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Number of live messages in `queue`, whether currently visible or not.
pub async fn count(db: &Database, queue: QueueName) -> Result<u64, FramegenError> {
    let queue_name = queue.to_string();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*) FROM queue_messages WHERE queue_name = ?1",
                params![queue_name],
                |row| row.get(0),
            )
        })
        .await
        .map(|n| u64::try_from(n).unwrap_or(0))
        .map_err(map_tr_err)
}

/// Number of archived messages in `queue`.
pub async fn archived_count(db: &Database, queue: QueueName) -> Result<u64, FramegenError> {
    let queue_name = queue.to_string();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*) FROM queue_archive WHERE queue_name = ?1",
                params![queue_name],
                |row| row.get(0),
            )
        })
        .await
        .map(|n| u64::try_from(n).unwrap_or(0))
        .map_err(map_tr_err)
}
