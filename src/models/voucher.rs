use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A gift-card purchase, independent of any adventure. On payment
/// confirmation the generated code is activated as a fixed-value coupon.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VoucherPurchase {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub customer_name: Option<String>,
    pub customer_email: String,
    /// Gift value, RON. The buyer pays this plus the processing fee.
    pub amount: f64,
    pub processing_fee: f64,
    pub coupon_code: String,
    pub provider_order_ref: String,
    pub payment_status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
