//! Guest registry: registration, filtering, and aggregate stats.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use thiserror::Error;

use gatecheck_core::CheckInCode;

use crate::db::RepositoryError;
use crate::db::guests::GuestRepository;
use crate::models::guest::{Guest, NewGuest};

/// How many fresh codes to try before giving up on registration.
///
/// The code space holds ~1.68M combinations, so consecutive collisions are
/// vanishingly unlikely at realistic guest counts; the bound exists so a
/// broken RNG cannot spin forever.
const MAX_CODE_ATTEMPTS: usize = 5;

/// Window for the "recent check-ins" dashboard stat.
const RECENT_CHECKIN_HOURS: i64 = 24;

/// Errors that can occur in the guest registry.
#[derive(Debug, Error)]
pub enum GuestServiceError {
    /// A required field was empty.
    #[error("guest name is required")]
    MissingName,

    /// Optional email was present but malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] gatecheck_core::EmailError),

    /// Every generated code collided with an existing guest.
    #[error("could not find a free check-in code after {0} attempts")]
    CodeSpaceExhausted(usize),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Guest registry service.
pub struct GuestService<'a> {
    guests: GuestRepository<'a>,
}

impl<'a> GuestService<'a> {
    /// Create a new guest service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            guests: GuestRepository::new(pool),
        }
    }

    /// Register a new guest, minting a unique check-in code.
    ///
    /// Codes are generated at random; uniqueness is enforced by the database
    /// and a colliding code is regenerated and retried up to
    /// [`MAX_CODE_ATTEMPTS`] times.
    ///
    /// # Errors
    ///
    /// Returns `GuestServiceError::MissingName` if the name is blank,
    /// `GuestServiceError::CodeSpaceExhausted` if every attempt collided,
    /// or `GuestServiceError::Repository` for database failures.
    pub async fn register(&self, new_guest: NewGuest) -> Result<Guest, GuestServiceError> {
        if new_guest.full_name.trim().is_empty() {
            return Err(GuestServiceError::MissingName);
        }

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            // `ThreadRng` is !Send, so it must not live across the insert
            // await; mint the code with a scoped rng instead.
            let code = CheckInCode::generate(&mut rand::rng());
            match self.guests.insert(&new_guest, &code).await {
                Ok(guest) => return Ok(guest),
                Err(RepositoryError::Conflict(_)) => {
                    tracing::warn!(
                        %code,
                        attempt,
                        "check-in code collision, regenerating"
                    );
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(GuestServiceError::CodeSpaceExhausted(MAX_CODE_ATTEMPTS))
    }

    /// Load all guests, newest first.
    ///
    /// # Errors
    ///
    /// Returns `GuestServiceError::Repository` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Guest>, GuestServiceError> {
        Ok(self.guests.list_all().await?)
    }
}

/// Aggregate stats over a loaded guest list.
///
/// Recomputed from the in-memory list on every render; the list is the
/// source of truth, not a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuestStats {
    /// Total number of guests.
    pub total: usize,
    /// Number of guests that have checked in.
    pub checked_in: usize,
    /// `round(100 * checked_in / total)`; zero when there are no guests.
    pub check_in_rate: u32,
    /// Check-ins within the last 24 hours.
    pub recent_checkins: usize,
}

impl GuestStats {
    /// Compute stats for a guest list as of `now`.
    #[must_use]
    pub fn compute(guests: &[Guest], now: DateTime<Utc>) -> Self {
        let total = guests.len();
        let checked_in = guests.iter().filter(|g| g.scanned).count();

        // Integer round-half-up of 100 * checked_in / total
        let check_in_rate = if total == 0 {
            0
        } else {
            u32::try_from((200 * checked_in + total) / (2 * total)).unwrap_or(0)
        };

        let cutoff = now - Duration::hours(RECENT_CHECKIN_HOURS);
        let recent_checkins = guests
            .iter()
            .filter(|g| g.scanned_at.is_some_and(|at| at >= cutoff))
            .count();

        Self {
            total,
            checked_in,
            check_in_rate,
            recent_checkins,
        }
    }
}

/// Filter guests by a search term.
///
/// A guest matches when the term is a case-insensitive substring of the name
/// or the check-in code; an empty term matches everything.
#[must_use]
pub fn filter_guests<'g>(guests: &'g [Guest], term: &str) -> Vec<&'g Guest> {
    let needle = term.to_lowercase();
    guests
        .iter()
        .filter(|g| {
            g.full_name.to_lowercase().contains(&needle)
                || g.unique_code.as_str().to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use gatecheck_core::GuestId;

    use super::*;

    fn guest(id: i32, name: &str, code: &str, scanned_at: Option<DateTime<Utc>>) -> Guest {
        Guest {
            id: GuestId::new(id),
            unique_code: CheckInCode::parse(code).unwrap(),
            full_name: name.to_owned(),
            email: None,
            scanned: scanned_at.is_some(),
            scanned_at,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    // Handlers calling register must stay Send; a thread-local rng held
    // across the insert await broke this once. Fails to compile on regress.
    #[tokio::test]
    async fn test_register_future_is_send() {
        fn require_send<T: Send>(_: &T) {}

        let pool = PgPool::connect_lazy("postgres://gatecheck@localhost/gatecheck")
            .expect("lazy pool");
        let service = GuestService::new(&pool);
        let fut = service.register(NewGuest {
            full_name: "Ada Lovelace".to_owned(),
            email: None,
            created_by: None,
        });
        require_send(&fut);
        drop(fut);
    }

    #[test]
    fn test_stats_empty_list_rate_is_zero() {
        let stats = GuestStats::compute(&[], Utc::now());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.checked_in, 0);
        assert_eq!(stats.check_in_rate, 0);
        assert_eq!(stats.recent_checkins, 0);
    }

    #[test]
    fn test_stats_rate_rounds() {
        let now = Utc::now();
        let guests = vec![
            guest(1, "Ada Lovelace", "7K2Q", Some(now)),
            guest(2, "Grace Hopper", "AB12", None),
            guest(3, "Alan Turing", "CD34", None),
        ];
        let stats = GuestStats::compute(&guests, now);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.checked_in, 1);
        // 1/3 = 33.33..% rounds to 33
        assert_eq!(stats.check_in_rate, 33);

        let guests = vec![
            guest(1, "Ada Lovelace", "7K2Q", Some(now)),
            guest(2, "Grace Hopper", "AB12", Some(now)),
            guest(3, "Alan Turing", "CD34", None),
        ];
        // 2/3 = 66.66..% rounds to 67
        assert_eq!(GuestStats::compute(&guests, now).check_in_rate, 67);
    }

    #[test]
    fn test_stats_recent_checkins_window() {
        let now = Utc::now();
        let guests = vec![
            guest(1, "Ada", "7K2Q", Some(now - Duration::hours(1))),
            guest(2, "Grace", "AB12", Some(now - Duration::hours(30))),
            guest(3, "Alan", "CD34", None),
        ];
        let stats = GuestStats::compute(&guests, now);
        assert_eq!(stats.checked_in, 2);
        assert_eq!(stats.recent_checkins, 1);
    }

    #[test]
    fn test_stats_checkin_exactly_24h_ago_counts_as_recent() {
        let now = Utc::now();
        let guests = vec![guest(
            1,
            "Ada",
            "7K2Q",
            Some(now - Duration::hours(RECENT_CHECKIN_HOURS)),
        )];
        assert_eq!(GuestStats::compute(&guests, now).recent_checkins, 1);
    }

    #[test]
    fn test_filter_empty_term_matches_all() {
        let guests = vec![
            guest(1, "Ada Lovelace", "7K2Q", None),
            guest(2, "Grace Hopper", "AB12", None),
        ];
        assert_eq!(filter_guests(&guests, "").len(), 2);
    }

    #[test]
    fn test_filter_matches_name_case_insensitively() {
        let guests = vec![
            guest(1, "Ada Lovelace", "7K2Q", None),
            guest(2, "Grace Hopper", "AB12", None),
        ];
        let hits = filter_guests(&guests, "lovelace");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.first().unwrap().full_name, "Ada Lovelace");
    }

    #[test]
    fn test_filter_matches_code_case_insensitively() {
        let guests = vec![
            guest(1, "Ada Lovelace", "7K2Q", None),
            guest(2, "Grace Hopper", "AB12", None),
        ];
        let hits = filter_guests(&guests, "7k2");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.first().unwrap().full_name, "Ada Lovelace");
    }

    #[test]
    fn test_filter_no_match() {
        let guests = vec![guest(1, "Ada Lovelace", "7K2Q", None)];
        assert!(filter_guests(&guests, "zzz").is_empty());
    }
}
