// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The set of users with an active drain session.
//!
//! A claim is taken with an atomic insert-if-absent and held by a
//! [`ClaimGuard`]. Dropping the guard releases the claim, so a session that
//! returns early, fails, times out, or is cancelled never leaves its user
//! claimed.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::trace;

/// Shared set of claimed user ids. Cloning shares the underlying set.
///
/// Each claim is tagged with a generation so a guard only ever removes the
/// claim it created.
#[derive(Clone, Default)]
pub struct ClaimSet {
    users: Arc<DashMap<String, u64>>,
    generation: Arc<AtomicU64>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `user_id` if nobody holds it.
    ///
    /// Returns `None` when the user is already claimed. Of any number of
    /// concurrent callers for the same user, exactly one gets a guard.
    pub fn try_claim(&self, user_id: &str) -> Option<ClaimGuard> {
        match self.users.entry(user_id.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let generation = self.generation.fetch_add(1, Ordering::Relaxed);
                slot.insert(generation);
                trace!(user_id, generation, "claimed");
                Some(ClaimGuard {
                    users: Arc::clone(&self.users),
                    user_id: user_id.to_string(),
                    generation,
                })
            }
        }
    }

    pub fn is_claimed(&self, user_id: &str) -> bool {
        self.users.contains_key(user_id)
    }

    /// Removes `user_id` regardless of any outstanding guard.
    ///
    /// Returns whether the user was claimed. Meant for operator recovery of a
    /// stuck session; the stale guard's later drop leaves newer claims alone.
    pub fn release(&self, user_id: &str) -> bool {
        self.users.remove(user_id).is_some()
    }

    /// Number of users currently claimed.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl fmt::Debug for ClaimSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimSet")
            .field("claimed", &self.users.len())
            .finish()
    }
}

/// Proof of an active claim. Releases the user on drop.
#[must_use = "the claim is released as soon as the guard is dropped"]
pub struct ClaimGuard {
    users: Arc<DashMap<String, u64>>,
    user_id: String,
    generation: u64,
}

impl ClaimGuard {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl fmt::Debug for ClaimGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimGuard")
            .field("user_id", &self.user_id)
            .finish()
    }
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        self.users
            .remove_if(&self.user_id, |_, generation| *generation == self.generation);
        trace!(user_id = %self.user_id, "released");
    }
}
