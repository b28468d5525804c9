// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message log queries.
//!
//! Messages are stored as JSON in insertion order. `seq` is a database-wide
//! counter: inserts take the next values, and unqueueing moves the folded
//! rows after everything already stored. A message queued while a reply was
//! being generated therefore reads back after that reply.

use parley_core::{Message, ParleyError};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn encode(messages: &[Message]) -> Result<Vec<String>, ParleyError> {
    messages
        .iter()
        .map(|m| serde_json::to_string(m).map_err(ParleyError::storage))
        .collect()
}

fn decode(rows: Vec<String>) -> Result<Vec<Message>, ParleyError> {
    rows.iter()
        .map(|json| serde_json::from_str(json).map_err(ParleyError::storage))
        .collect()
}

fn max_seq(conn: &rusqlite::Connection) -> rusqlite::Result<i64> {
    let max: Option<i64> = conn
        .query_row("SELECT MAX(seq) FROM messages", [], |r| r.get(0))
        .optional()?
        .flatten();
    Ok(max.unwrap_or(0))
}

/// Appends `messages` for `user_id` in order, all with the same pending flag.
pub async fn insert_messages(
    db: &Database,
    user_id: &str,
    pending: bool,
    messages: &[Message],
) -> Result<Vec<Message>, ParleyError> {
    if messages.is_empty() {
        return Ok(Vec::new());
    }
    let rows = encode(messages)?;
    let user_id = user_id.to_string();
    let ts = now();

    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let mut seq = max_seq(&tx)?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO messages (user_id, seq, pending, message, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                )?;
                for json in &rows {
                    seq += 1;
                    stmt.execute(params![user_id, seq, pending, json, ts])?;
                }
            }
            tx.commit()
        })
        .await
        .map_err(map_tr_err)?;

    Ok(messages.to_vec())
}

/// Clears the pending flag on every pending message of `user_id`, moves them
/// to the end of the log, and returns them in their original order.
pub async fn unqueue(db: &Database, user_id: &str) -> Result<Vec<Message>, ParleyError> {
    let user_id = user_id.to_string();
    let ts = now();

    let rows = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let pending: Vec<(i64, String)> = {
                let mut stmt = tx.prepare(
                    "SELECT id, message FROM messages
                     WHERE user_id = ?1 AND pending = 1
                     ORDER BY seq ASC, id ASC",
                )?;
                let rows = stmt.query_map(params![user_id], |r| Ok((r.get(0)?, r.get(1)?)))?;
                rows.collect::<Result<_, _>>()?
            };

            let mut seq = max_seq(&tx)?;
            {
                let mut stmt = tx.prepare(
                    "UPDATE messages SET pending = 0, seq = ?1, updated_at = ?2 WHERE id = ?3",
                )?;
                for (id, _) in &pending {
                    seq += 1;
                    stmt.execute(params![seq, ts, id])?;
                }
            }
            tx.commit()?;
            Ok(pending.into_iter().map(|(_, json)| json).collect::<Vec<String>>())
        })
        .await
        .map_err(map_tr_err)?;

    decode(rows)
}

/// The conversation of `user_id`: every message already folded in by
/// [`unqueue`]. Pending messages are not part of it yet.
pub async fn read_history(db: &Database, user_id: &str) -> Result<Vec<Message>, ParleyError> {
    select(db, user_id, false).await
}

/// Messages of `user_id` that have not been folded into a drain pass yet.
pub async fn pending(db: &Database, user_id: &str) -> Result<Vec<Message>, ParleyError> {
    select(db, user_id, true).await
}

async fn select(db: &Database, user_id: &str, pending: bool) -> Result<Vec<Message>, ParleyError> {
    let user_id = user_id.to_string();
    let rows = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT message FROM messages WHERE user_id = ?1 AND pending = ?2
                 ORDER BY seq ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![user_id, pending], |r| r.get(0))?;
            rows.collect::<Result<Vec<String>, _>>()
        })
        .await
        .map_err(map_tr_err)?;

    decode(rows)
}

/// Number of stored messages for `user_id`.
pub async fn count(db: &Database, user_id: &str) -> Result<i64, ParleyError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE user_id = ?1",
                params![user_id],
                |r| r.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}
