use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pricing::{PricingSummary, VesselSelection};

/// A confirmed (or historically semi-confirmed) reservation. `status` is the
/// raw persisted string; presentation goes through `CanonicalStatus`.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub adventure_id: ObjectId,
    pub adventure_title: String,
    /// The payment intent this booking was confirmed from, when it went
    /// through the online flow. Older records created by staff have none.
    pub intent_id: Option<ObjectId>,
    pub customer_name: String,
    pub customer_email: String,
    pub phone_number: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub vessels: VesselSelection,
    pub pricing: PricingSummary,
    pub coupon_code: Option<String>,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
