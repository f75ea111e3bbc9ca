//! Durable client-state records.
//!
//! Two small records survive page reloads, both time-boxed by the same
//! fixed 12-hour window:
//!
//! * [`PersistedPaymentRecord`] — written immediately *before* the external
//!   checkout overlay opens so an in-flight payment survives navigation or
//!   a crash; updated to `Failed` on failure (kept for retry); deleted on
//!   success.
//! * [`BannerDismissRecord`] — gates the resume-payment nag banner; the
//!   dismiss count saturates at 2 and the whole record resets after expiry.
//!
//! Expiry is not an error: an expired record reads as "no prior state".

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{PaymentStatus, ServiceType};

/// Fixed time-to-live for both record types.
pub const RECORD_TTL_HOURS: i64 = 12;

/// Maximum times the banner may be dismissed inside one TTL window.
pub const MAX_BANNER_DISMISSALS: u32 = 2;

fn ttl() -> Duration {
    Duration::hours(RECORD_TTL_HOURS)
}

/// The two statuses a persisted payment record can carry.  `Success` never
/// appears here — success deletes the record instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumableStatus {
    Pending,
    Failed,
}

impl ResumableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl From<ResumableStatus> for PaymentStatus {
    fn from(status: ResumableStatus) -> Self {
        match status {
            ResumableStatus::Pending => PaymentStatus::Pending,
            ResumableStatus::Failed => PaymentStatus::Failed,
        }
    }
}

/// In-flight payment state, durable across reloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedPaymentRecord {
    pub lead_id: String,
    pub service: ServiceType,
    pub name: String,
    pub whatsapp_number: Option<String>,
    pub status: ResumableStatus,
    pub created_at: DateTime<Utc>,
}

impl PersistedPaymentRecord {
    /// A fresh record, written just before the checkout overlay opens.
    pub fn pending(
        lead_id: String,
        service: ServiceType,
        name: String,
        whatsapp_number: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        PersistedPaymentRecord {
            lead_id,
            service,
            name,
            whatsapp_number,
            status: ResumableStatus::Pending,
            created_at: now,
        }
    }

    /// Expired records are discarded silently, regardless of status.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > ttl()
    }
}

/// Persisted dismiss counter for the resume-payment banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerDismissRecord {
    pub count: u32,
    pub first_at: DateTime<Utc>,
}

impl BannerDismissRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.first_at > ttl()
    }

    /// Register a dismissal against an optional prior record.
    ///
    /// Inside the TTL window the count saturates at
    /// [`MAX_BANNER_DISMISSALS`]; once the window has expired the record
    /// starts over at 1.
    pub fn register_dismiss(previous: Option<BannerDismissRecord>, now: DateTime<Utc>) -> Self {
        match previous {
            Some(prev) if !prev.is_expired(now) => BannerDismissRecord {
                count: (prev.count + 1).min(MAX_BANNER_DISMISSALS),
                first_at: prev.first_at,
            },
            _ => BannerDismissRecord {
                count: 1,
                first_at: now,
            },
        }
    }

    /// Whether the banner should still be shown.
    pub fn banner_suppressed(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now) && self.count >= MAX_BANNER_DISMISSALS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    fn record_at(created: DateTime<Utc>) -> PersistedPaymentRecord {
        PersistedPaymentRecord::pending(
            "abc123".to_string(),
            ServiceType::Consultation,
            "Asha Verma".to_string(),
            Some("9876543210".to_string()),
            created,
        )
    }

    #[test]
    fn record_fresh_at_eleven_hours() {
        let rec = record_at(t0());
        assert!(!rec.is_expired(t0() + Duration::hours(11)));
    }

    #[test]
    fn record_expired_at_thirteen_hours() {
        let rec = record_at(t0());
        assert!(rec.is_expired(t0() + Duration::hours(13)));
    }

    #[test]
    fn record_expires_regardless_of_status() {
        let mut rec = record_at(t0());
        rec.status = ResumableStatus::Failed;
        assert!(rec.is_expired(t0() + Duration::hours(13)));
    }

    #[test]
    fn dismiss_count_saturates_at_two() {
        let now = t0();
        let mut rec = BannerDismissRecord::register_dismiss(None, now);
        assert_eq!(rec.count, 1);
        for _ in 0..5 {
            rec = BannerDismissRecord::register_dismiss(Some(rec), now + Duration::hours(1));
        }
        assert_eq!(rec.count, 2);
        assert_eq!(rec.first_at, now);
    }

    #[test]
    fn dismiss_resets_to_one_after_window() {
        let now = t0();
        let rec = BannerDismissRecord {
            count: 2,
            first_at: now,
        };
        let later = now + Duration::hours(13);
        let reset = BannerDismissRecord::register_dismiss(Some(rec), later);
        assert_eq!(reset.count, 1);
        assert_eq!(reset.first_at, later);
    }

    #[test]
    fn banner_suppression() {
        let now = t0();
        let one = BannerDismissRecord {
            count: 1,
            first_at: now,
        };
        assert!(!one.banner_suppressed(now));

        let two = BannerDismissRecord {
            count: 2,
            first_at: now,
        };
        assert!(two.banner_suppressed(now + Duration::hours(1)));
        // Expired records stop suppressing.
        assert!(!two.banner_suppressed(now + Duration::hours(13)));
    }
}
