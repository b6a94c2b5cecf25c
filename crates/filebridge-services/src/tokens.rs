//! Single-use bearer tokens.
//!
//! Bridge sessions and download grants share one lifecycle:
//!
//! ```text
//! Pending --reserve--> Reserved --commit--> Consumed
//!    ^                    |
//!    +------release-------+
//! ```
//!
//! A reservation is the only way out of `Pending`, and it is taken with a single check-and-set
//! under the store lock, so concurrent callers can never both win. The winner then does its
//! slow work (storing an upload, opening a download) with no lock held and either commits or
//! drops the reservation, which puts the token back to `Pending` so it can be retried.
//!
//! Expiry is evaluated lazily on every access and always wins over the consumed state. Entries
//! stay in the store until `expires_at + retention`; after [`TokenStore::purge_expired`] removes
//! them they are reported as unknown.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use filebridge_core::{AppError, AppResult};
use parking_lot::Mutex;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;

use crate::clock::Clock;

/// Random bytes per token (256 bits)
const TOKEN_BYTES: usize = 32;

/// Generates an unguessable URL-safe token.
pub fn generate_token() -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenState {
    Pending,
    Reserved,
    Consumed,
}

struct TokenEntry<P> {
    payload: P,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    state: TokenState,
}

impl<P: Clone> TokenEntry<P> {
    fn snapshot(&self, token: &str) -> TokenSnapshot<P> {
        TokenSnapshot {
            token: token.to_string(),
            payload: self.payload.clone(),
            created_at: self.created_at,
            expires_at: self.expires_at,
            consumed: self.state == TokenState::Consumed,
        }
    }
}

/// Point-in-time copy of a token entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSnapshot<P> {
    pub token: String,
    pub payload: P,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
}

pub struct TokenStore<P> {
    entries: Mutex<HashMap<String, TokenEntry<P>>>,
    ttl: Duration,
    retention: Duration,
    clock: Arc<dyn Clock>,
}

impl<P: Clone + Send> TokenStore<P> {
    pub fn new(ttl: Duration, retention: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            retention,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a fresh pending token carrying `payload`.
    pub fn issue(&self, payload: P) -> TokenSnapshot<P> {
        let created_at = self.clock.now();
        let entry = TokenEntry {
            payload,
            created_at,
            expires_at: created_at + self.ttl,
            state: TokenState::Pending,
        };

        let mut entries = self.entries.lock();
        let token = loop {
            let candidate = generate_token();
            if !entries.contains_key(&candidate) {
                break candidate;
            }
        };
        let snapshot = entry.snapshot(&token);
        entries.insert(token, entry);
        snapshot
    }

    /// Returns the token if it could be consumed right now, without consuming it.
    ///
    /// `accepts` filters by payload; a token it rejects is reported as unknown.
    pub fn peek(
        &self,
        token: &str,
        accepts: impl FnOnce(&P) -> bool,
    ) -> AppResult<TokenSnapshot<P>> {
        let now = self.clock.now();
        let entries = self.entries.lock();
        let entry = check_usable(entries.get(token), now, accepts)?;
        Ok(entry.snapshot(token))
    }

    /// Moves a pending token to reserved. Exactly one concurrent caller succeeds.
    pub fn reserve(
        &self,
        token: &str,
        accepts: impl FnOnce(&P) -> bool,
    ) -> AppResult<Reservation<'_, P>> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        check_usable(entries.get(token), now, accepts)?;

        let Some(entry) = entries.get_mut(token) else {
            return Err(AppError::TokenNotFound);
        };
        entry.state = TokenState::Reserved;
        let snapshot = entry.snapshot(token);

        Ok(Reservation {
            store: self,
            snapshot,
            settled: false,
        })
    }

    /// Drops entries whose retention window has passed. Reserved entries are kept until settled.
    pub fn purge_expired(&self) -> usize {
        let cutoff = self.clock.now() - self.retention;
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.state == TokenState::Reserved || entry.expires_at > cutoff);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn settle(&self, token: &str, state: TokenState) {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(token) {
            if entry.state == TokenState::Reserved {
                entry.state = state;
            }
        }
    }
}

fn check_usable<P>(
    entry: Option<&TokenEntry<P>>,
    now: DateTime<Utc>,
    accepts: impl FnOnce(&P) -> bool,
) -> AppResult<&TokenEntry<P>> {
    let entry = match entry {
        Some(entry) if accepts(&entry.payload) => entry,
        _ => return Err(AppError::TokenNotFound),
    };
    if now >= entry.expires_at {
        return Err(AppError::TokenExpired);
    }
    if entry.state != TokenState::Pending {
        return Err(AppError::TokenAlreadyConsumed);
    }
    Ok(entry)
}

/// Exclusive claim on a token.
///
/// [`Reservation::commit`] marks the token consumed. Dropping the reservation without
/// committing (an error path, or a cancelled request) returns the token to pending.
pub struct Reservation<'a, P: Clone + Send> {
    store: &'a TokenStore<P>,
    snapshot: TokenSnapshot<P>,
    settled: bool,
}

impl<P: Clone + Send> Reservation<'_, P> {
    pub fn payload(&self) -> &P {
        &self.snapshot.payload
    }

    pub fn token(&self) -> &str {
        &self.snapshot.token
    }

    pub fn commit(mut self) -> TokenSnapshot<P> {
        self.store.settle(&self.snapshot.token, TokenState::Consumed);
        self.settled = true;
        let mut snapshot = self.snapshot.clone();
        snapshot.consumed = true;
        snapshot
    }
}

impl<P: Clone + Send> Drop for Reservation<'_, P> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!("Releasing unconsumed token reservation");
            self.store.settle(&self.snapshot.token, TokenState::Pending);
        }
    }
}
