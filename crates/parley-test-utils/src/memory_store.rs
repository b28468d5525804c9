// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`MessageStore`] with the same ordering rules as the SQLite store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parley_core::{Message, MessageStore, ParleyError};
use tokio::sync::Mutex;

struct Row {
    seq: u64,
    pending: bool,
    message: Message,
}

#[derive(Default)]
struct State {
    next_seq: u64,
    users: HashMap<String, Vec<Row>>,
}

impl State {
    fn bump(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

/// Message store kept in process memory.
///
/// [`set_failing`](MemoryStore::set_failing) makes every operation return a
/// storage error until switched off again.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    async fn select(&self, user_id: &str, pending: bool) -> Result<Vec<Message>, ParleyError> {
        self.check()?;
        let state = self.state.lock().await;
        Ok(state
            .users
            .get(user_id)
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.pending == pending)
                    .map(|r| r.message.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn check(&self) -> Result<(), ParleyError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(ParleyError::storage(std::io::Error::other(
                "injected storage failure",
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn insert(
        &self,
        user_id: &str,
        pending: bool,
        messages: &[Message],
    ) -> Result<Vec<Message>, ParleyError> {
        self.check()?;
        let mut state = self.state.lock().await;
        for message in messages {
            let seq = state.bump();
            state.users.entry(user_id.to_string()).or_default().push(Row {
                seq,
                pending,
                message: message.clone(),
            });
        }
        Ok(messages.to_vec())
    }

    async fn unqueue(&self, user_id: &str) -> Result<Vec<Message>, ParleyError> {
        self.check()?;
        let mut state = self.state.lock().await;
        let Some(rows) = state.users.get(user_id) else {
            return Ok(Vec::new());
        };
        let pending = rows.iter().filter(|r| r.pending).count() as u64;
        let base = state.next_seq;
        state.next_seq += pending;

        let mut folded = Vec::new();
        if let Some(rows) = state.users.get_mut(user_id) {
            let mut seq = base;
            for row in rows.iter_mut().filter(|r| r.pending) {
                seq += 1;
                row.pending = false;
                row.seq = seq;
                folded.push(row.message.clone());
            }
            rows.sort_by_key(|r| r.seq);
        }
        Ok(folded)
    }

    async fn read_history(&self, user_id: &str) -> Result<Vec<Message>, ParleyError> {
        self.select(user_id, false).await
    }

    async fn pending(&self, user_id: &str) -> Result<Vec<Message>, ParleyError> {
        self.select(user_id, true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn folded_messages_move_after_existing_rows() {
        let store = MemoryStore::new();
        store.insert("u", true, &[Message::user("first")]).await.unwrap();
        store.unqueue("u").await.unwrap();
        store.insert("u", true, &[Message::user("second")]).await.unwrap();
        store
            .insert("u", false, &[Message::assistant("reply")])
            .await
            .unwrap();

        assert_eq!(store.pending("u").await.unwrap(), vec![Message::user("second")]);
        assert_eq!(
            store.read_history("u").await.unwrap(),
            vec![Message::user("first"), Message::assistant("reply")]
        );
        store.unqueue("u").await.unwrap();
        assert_eq!(
            store.read_history("u").await.unwrap(),
            vec![
                Message::user("first"),
                Message::assistant("reply"),
                Message::user("second")
            ]
        );
    }

    #[tokio::test]
    async fn failing_store_errors() {
        let store = MemoryStore::new();
        store.set_failing(true);
        assert!(store.read_history("u").await.is_err());
        store.set_failing(false);
        assert!(store.read_history("u").await.unwrap().is_empty());
    }
}
