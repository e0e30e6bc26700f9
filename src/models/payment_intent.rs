use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pricing::{PricingSummary, VesselSelection};

/// Raw payment statuses an intent moves through. Kept as plain strings on
/// the document (the store's historical vocabulary is wider than any one
/// release of this service); `CanonicalStatus` normalizes for presentation.
pub mod payment_status {
    pub const PENDING: &str = "pending";
    pub const PROCESSING: &str = "processing";
    pub const CONFIRMED: &str = "confirmed";
    pub const DECLINED: &str = "declined";
    pub const EXPIRED: &str = "expired";
    pub const ERROR: &str = "error";
    pub const CANCELLED: &str = "cancelled";
}

/// A provisional booking created at checkout submission, before the payment
/// provider has answered. Confirmed intents are superseded by the durable
/// `Booking` they produce.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub adventure_id: ObjectId,
    pub adventure_title: String,
    pub customer_name: String,
    pub customer_email: String,
    /// Collected just-in-time on the payment page, not at submission.
    pub phone_number: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub vessels: VesselSelection,
    pub pricing: PricingSummary,
    pub coupon_code: Option<String>,
    /// Our reference sent to the payment provider, echoed back in the IPN.
    pub provider_order_ref: String,
    pub payment_status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
