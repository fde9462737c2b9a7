/// Single-use password-reset tokens
///
/// Reset tokens authorize exactly one password change within a fixed
/// one-hour window. They live in an in-memory store owned by the
/// service: nothing is persisted, so a restart invalidates every
/// outstanding reset link.
///
/// Tokens carry no password material; the store maps the token value to
/// the user it was issued for and an absolute expiry instant.
///
/// Expiry is passive: an expired entry is removed only when a consumer
/// looks it up. There is no background sweep, so unconsumed tokens
/// accumulate until their first (failing) lookup.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::reset::{ResetTokenStore, ResetTokenError};
///
/// let store = ResetTokenStore::new();
/// let token = store.issue(42);
///
/// // First consumption succeeds and removes the entry
/// assert_eq!(store.consume(&token).unwrap(), 42);
///
/// // Second consumption observes an absent token
/// assert!(matches!(store.consume(&token), Err(ResetTokenError::Invalid)));
/// ```

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Fixed time-to-live for reset tokens
const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// Number of random bytes per token (hex-encoded to 64 characters)
const TOKEN_BYTES: usize = 32;

/// Error type for reset token consumption
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResetTokenError {
    /// Token is unknown (never issued, already consumed, or cleared by restart)
    #[error("Reset token is invalid")]
    Invalid,

    /// Token existed but its TTL had elapsed; it has been removed
    #[error("Reset token has expired")]
    Expired,
}

#[derive(Debug, Clone)]
struct ResetEntry {
    user_id: i64,
    expires_at: DateTime<Utc>,
}

/// In-memory store of outstanding reset tokens
///
/// Mutations are individually atomic: concurrent consumption attempts
/// on the same token serialize on the lock, so at most one observes the
/// pre-consumption state.
///
/// Cheap to clone; clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct ResetTokenStore {
    entries: Arc<Mutex<HashMap<String, ResetEntry>>>,
}

impl ResetTokenStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new reset token for a user
    ///
    /// The token is 32 bytes of OS randomness, hex-encoded, and expires
    /// one hour from now. Issuing does not invalidate any prior
    /// outstanding token for the same user; multiple valid tokens may
    /// coexist.
    pub fn issue(&self, user_id: i64) -> String {
        self.issue_with_ttl(user_id, Duration::hours(RESET_TOKEN_TTL_HOURS))
    }

    /// Issues a token with an explicit time-to-live
    ///
    /// Exists so expiry behavior is testable without waiting an hour.
    pub fn issue_with_ttl(&self, user_id: i64, ttl: Duration) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let entry = ResetEntry {
            user_id,
            expires_at: Utc::now() + ttl,
        };

        let mut entries = self.entries.lock().expect("reset token lock poisoned");
        entries.insert(token.clone(), entry);
        debug!(user_id, outstanding = entries.len(), "Issued reset token");

        token
    }

    /// Consumes a reset token, returning the bound user ID
    ///
    /// A token is consumed at most once: success removes the entry, so a
    /// concurrent second attempt observes [`ResetTokenError::Invalid`].
    /// An entry found past its expiry is removed as a side effect of the
    /// failed attempt.
    ///
    /// # Errors
    ///
    /// - `ResetTokenError::Invalid` if the token is absent
    /// - `ResetTokenError::Expired` if the token's TTL had elapsed
    pub fn consume(&self, token: &str) -> Result<i64, ResetTokenError> {
        let mut entries = self.entries.lock().expect("reset token lock poisoned");

        let entry = entries.remove(token).ok_or(ResetTokenError::Invalid)?;

        if Utc::now() > entry.expires_at {
            debug!(user_id = entry.user_id, "Reset token expired, removed on lookup");
            return Err(ResetTokenError::Expired);
        }

        debug!(user_id = entry.user_id, "Reset token consumed");
        Ok(entry.user_id)
    }

    /// Number of outstanding (issued, unconsumed) tokens
    ///
    /// Includes expired entries that have not yet been looked up.
    pub fn outstanding(&self) -> usize {
        self.entries.lock().expect("reset token lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_consume() {
        let store = ResetTokenStore::new();
        let token = store.issue(42);

        assert_eq!(token.len(), 64);
        assert_eq!(store.outstanding(), 1);

        assert_eq!(store.consume(&token), Ok(42));
        assert_eq!(store.outstanding(), 0);
    }

    #[test]
    fn test_single_use() {
        let store = ResetTokenStore::new();
        let token = store.issue(42);

        assert_eq!(store.consume(&token), Ok(42));
        assert_eq!(store.consume(&token), Err(ResetTokenError::Invalid));
    }

    #[test]
    fn test_unknown_token_invalid() {
        let store = ResetTokenStore::new();
        assert_eq!(store.consume("deadbeef"), Err(ResetTokenError::Invalid));
    }

    #[test]
    fn test_expired_token_removed_on_lookup() {
        let store = ResetTokenStore::new();
        let token = store.issue_with_ttl(42, Duration::seconds(-1));
        assert_eq!(store.outstanding(), 1);

        assert_eq!(store.consume(&token), Err(ResetTokenError::Expired));
        assert_eq!(store.outstanding(), 0);

        // The failed expiry lookup already removed it
        assert_eq!(store.consume(&token), Err(ResetTokenError::Invalid));
    }

    #[test]
    fn test_multiple_outstanding_tokens_per_user() {
        let store = ResetTokenStore::new();
        let first = store.issue(42);
        let second = store.issue(42);

        assert_ne!(first, second);
        assert_eq!(store.outstanding(), 2);

        // Issuing the second token did not invalidate the first
        assert_eq!(store.consume(&first), Ok(42));
        assert_eq!(store.consume(&second), Ok(42));
    }

    #[test]
    fn test_expired_entries_linger_until_lookup() {
        let store = ResetTokenStore::new();
        store.issue_with_ttl(1, Duration::seconds(-1));
        store.issue_with_ttl(2, Duration::seconds(-1));

        // No sweep: both entries are still held
        assert_eq!(store.outstanding(), 2);
    }

    #[test]
    fn test_concurrent_consumption_single_winner() {
        let store = ResetTokenStore::new();
        let token = store.issue(42);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let token = token.clone();
            handles.push(std::thread::spawn(move || store.consume(&token).is_ok()));
        }

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
    }
}
