use serde::{Deserialize, Serialize};

/// Canonical, UI-facing status. The store holds a wider, inconsistently
/// cased vocabulary accumulated over time (including literal
/// "awaiting confirmation" with a space); every raw string collapses into
/// one of these tags before any presentation logic branches on it.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalStatus {
    #[serde(rename = "confirmed")]
    Confirmed,
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "pending_payment")]
    PendingPayment,
    #[serde(rename = "processing")]
    Processing,
    #[serde(rename = "declined")]
    Declined,
    #[serde(rename = "cancelled")]
    Cancelled,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "unknown")]
    Unknown,
}

impl CanonicalStatus {
    /// Collapse a raw persisted status into its canonical tag.
    /// First match wins; raw `processing` renders like an in-flight payment,
    /// so it lands on `PendingPayment`.
    pub fn normalize(raw: &str) -> CanonicalStatus {
        let status = raw.trim().to_lowercase();

        match status.as_str() {
            "confirmed" | "payment_confirmed" => CanonicalStatus::Confirmed,
            "pending" => CanonicalStatus::Pending,
            s if s.contains("awaiting") => CanonicalStatus::Pending,
            "pending_payment" | "processing" => CanonicalStatus::PendingPayment,
            "declined" | "expired" | "error" => CanonicalStatus::Declined,
            "cancelled" => CanonicalStatus::Cancelled,
            "completed" => CanonicalStatus::Completed,
            _ => {
                log::warn!("Unrecognized booking status {:?}, rendering as unknown", raw);
                CanonicalStatus::Unknown
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalStatus::Confirmed => "confirmed",
            CanonicalStatus::Pending => "pending",
            CanonicalStatus::PendingPayment => "pending_payment",
            CanonicalStatus::Processing => "processing",
            CanonicalStatus::Declined => "declined",
            CanonicalStatus::Cancelled => "cancelled",
            CanonicalStatus::Completed => "completed",
            CanonicalStatus::Unknown => "unknown",
        }
    }

    /// Badge color used by the storefront and the result page.
    pub fn badge_color(&self) -> &'static str {
        match self {
            CanonicalStatus::Confirmed => "green",
            CanonicalStatus::Pending => "yellow",
            CanonicalStatus::PendingPayment | CanonicalStatus::Processing => "blue",
            CanonicalStatus::Declined | CanonicalStatus::Cancelled => "red",
            CanonicalStatus::Completed => "blue",
            CanonicalStatus::Unknown => "gray",
        }
    }
}

/// Canonical tag plus the raw string it came from, kept for audit display.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct NormalizedStatus {
    pub status: CanonicalStatus,
    pub raw: String,
    pub badge: &'static str,
}

impl NormalizedStatus {
    pub fn from_raw(raw: &str) -> NormalizedStatus {
        let status = CanonicalStatus::normalize(raw);
        NormalizedStatus {
            status,
            raw: raw.to_string(),
            badge: status.badge_color(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paid_statuses_are_confirmed() {
        assert_eq!(CanonicalStatus::normalize("confirmed"), CanonicalStatus::Confirmed);
        assert_eq!(
            CanonicalStatus::normalize("payment_confirmed"),
            CanonicalStatus::Confirmed
        );
        assert_eq!(CanonicalStatus::normalize(" Confirmed "), CanonicalStatus::Confirmed);
    }

    #[test]
    fn test_awaiting_confirmation_is_pending() {
        // The literal space-separated value exists in persisted records.
        let normalized = NormalizedStatus::from_raw("awaiting confirmation");
        assert_eq!(normalized.status, CanonicalStatus::Pending);
        assert_eq!(normalized.badge, "yellow");
        assert_eq!(normalized.raw, "awaiting confirmation");
    }

    #[test]
    fn test_in_flight_payment_statuses() {
        assert_eq!(
            CanonicalStatus::normalize("pending_payment"),
            CanonicalStatus::PendingPayment
        );
        assert_eq!(
            CanonicalStatus::normalize("processing"),
            CanonicalStatus::PendingPayment
        );
    }

    #[test]
    fn test_failed_statuses_are_declined() {
        for raw in ["declined", "expired", "error", "EXPIRED"] {
            assert_eq!(CanonicalStatus::normalize(raw), CanonicalStatus::Declined);
        }
    }

    #[test]
    fn test_cancelled_and_completed() {
        assert_eq!(CanonicalStatus::normalize("cancelled"), CanonicalStatus::Cancelled);
        assert_eq!(CanonicalStatus::normalize("completed"), CanonicalStatus::Completed);
        assert_eq!(CanonicalStatus::normalize("cancelled").badge_color(), "red");
        assert_eq!(CanonicalStatus::normalize("completed").badge_color(), "blue");
    }

    #[test]
    fn test_unrecognized_statuses_are_unknown() {
        assert_eq!(CanonicalStatus::normalize("refunded"), CanonicalStatus::Unknown);
        assert_eq!(CanonicalStatus::normalize(""), CanonicalStatus::Unknown);
        assert_eq!(CanonicalStatus::normalize("refunded").badge_color(), "gray");
    }

    #[test]
    fn test_normalization_is_idempotent_over_outputs() {
        let raws = [
            "confirmed",
            "payment_confirmed",
            "pending",
            "awaiting confirmation",
            "pending_payment",
            "processing",
            "declined",
            "expired",
            "error",
            "cancelled",
            "completed",
            "something else",
        ];

        for raw in raws {
            let once = CanonicalStatus::normalize(raw);
            let twice = CanonicalStatus::normalize(once.as_str());
            assert_eq!(once, twice, "normalization not idempotent for {:?}", raw);
        }
    }
}
