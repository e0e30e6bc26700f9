use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum CouponKind {
    #[serde(rename = "percentage")]
    Percentage,
    #[serde(rename = "fixed")]
    Fixed,
}

fn default_active() -> bool {
    true
}

/// A discount code. Percentage coupons take `value` percent off the base
/// price; fixed coupons take `value` RON, capped at the base price. A coupon
/// may be restricted to a single adventure.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub code: String,
    #[serde(rename = "type")]
    pub kind: CouponKind,
    pub value: f64,
    #[serde(default = "default_active")]
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub adventure_id: Option<ObjectId>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
