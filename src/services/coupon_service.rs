use bson::{doc, oid::ObjectId};
use chrono::{DateTime, Utc};
use mongodb::{Client, Collection};
use thiserror::Error;

use crate::db::mongo::{COLL_COUPONS, DB_NAME};
use crate::models::coupon::{Coupon, CouponKind};

/// User-correctable validation failures. These surface as inline form
/// messages, never as 5xx responses.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CouponError {
    #[error("We don't recognize this coupon code")]
    NotFound,
    #[error("This coupon has expired")]
    Expired,
    #[error("This coupon is no longer active")]
    Inactive,
    #[error("This coupon does not apply to the selected adventure")]
    NotApplicable,
}

pub struct CouponService;

impl CouponService {
    /// Pure validation against an adventure/price context. Mutates nothing;
    /// callers re-run this whenever the base price changes, so the discount
    /// always tracks the current vessel selection.
    pub fn validate(
        coupon: &Coupon,
        adventure_id: &ObjectId,
        base_price: f64,
        now: DateTime<Utc>,
    ) -> Result<f64, CouponError> {
        if !coupon.active {
            return Err(CouponError::Inactive);
        }

        if let Some(expires_at) = coupon.expires_at {
            if now > expires_at {
                return Err(CouponError::Expired);
            }
        }

        if let Some(scope) = &coupon.adventure_id {
            if scope != adventure_id {
                return Err(CouponError::NotApplicable);
            }
        }

        Ok(Self::discount(coupon, base_price))
    }

    /// Discount for a coupon at a given base price, capped so the remaining
    /// total can never go negative.
    pub fn discount(coupon: &Coupon, base_price: f64) -> f64 {
        let raw = match coupon.kind {
            CouponKind::Percentage => (base_price * coupon.value / 100.0).round(),
            CouponKind::Fixed => coupon.value,
        };

        raw.max(0.0).min(base_price.max(0.0))
    }

    /// Codes are stored uppercase; lookup is tolerant of user casing.
    pub async fn lookup(
        client: &Client,
        code: &str,
    ) -> Result<Option<Coupon>, mongodb::error::Error> {
        let collection: Collection<Coupon> = client.database(DB_NAME).collection(COLL_COUPONS);

        collection
            .find_one(doc! { "code": code.trim().to_uppercase() })
            .await
    }
}
