use bson::doc;
use chrono::Utc;
use mongodb::{Client, Collection};
use rand::{distributions::Alphanumeric, Rng};

use crate::db::mongo::{COLL_COUPONS, COLL_VOUCHERS, DB_NAME};
use crate::models::coupon::{Coupon, CouponKind};
use crate::models::payment_intent::payment_status;
use crate::models::voucher::VoucherPurchase;
use crate::services::booking_service::BookingService;

/// Card-processing fee charged on top of the gift value.
pub const VOUCHER_FEE_RATE: f64 = 0.05;
pub const VOUCHER_FEE_MINIMUM: f64 = 10.0;

#[derive(Debug, PartialEq, Eq)]
pub enum VoucherUpdateOutcome {
    Updated,
    CouponIssued(String),
    Ignored,
    UnknownOrder,
}

pub struct VoucherService;

impl VoucherService {
    pub fn processing_fee(amount: f64) -> f64 {
        (amount * VOUCHER_FEE_RATE).max(VOUCHER_FEE_MINIMUM).round()
    }

    /// Gift codes are random, uppercase and prefixed so support staff can
    /// tell them from campaign coupons at a glance.
    pub fn generate_code() -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();

        format!("GIFT-{}", suffix.to_uppercase())
    }

    /// Apply a provider callback to a voucher purchase; on confirmation the
    /// generated code becomes a live fixed-value coupon.
    pub async fn apply_payment_update(
        client: &Client,
        order_ref: &str,
        incoming_status: &str,
    ) -> Result<VoucherUpdateOutcome, mongodb::error::Error> {
        let vouchers: Collection<VoucherPurchase> =
            client.database(DB_NAME).collection(COLL_VOUCHERS);

        let voucher = match vouchers
            .find_one(doc! { "providerOrderRef": order_ref })
            .await?
        {
            Some(voucher) => voucher,
            None => {
                log::warn!("Voucher IPN for unknown provider order ref {}", order_ref);
                return Ok(VoucherUpdateOutcome::UnknownOrder);
            }
        };

        // Same terminal rule as bookings: a confirmed purchase stays confirmed.
        if !BookingService::accepts_transition(&voucher.payment_status, incoming_status) {
            return Ok(VoucherUpdateOutcome::Ignored);
        }

        let now = Utc::now();
        vouchers
            .update_one(
                doc! { "providerOrderRef": order_ref },
                doc! { "$set": {
                    "paymentStatus": incoming_status,
                    "updatedAt": now.to_rfc3339(),
                }},
            )
            .await?;

        if !incoming_status
            .trim()
            .eq_ignore_ascii_case(payment_status::CONFIRMED)
        {
            return Ok(VoucherUpdateOutcome::Updated);
        }

        let coupons: Collection<Coupon> = client.database(DB_NAME).collection(COLL_COUPONS);

        // A replayed confirmation must not issue the coupon twice.
        if coupons
            .find_one(doc! { "code": &voucher.coupon_code })
            .await?
            .is_some()
        {
            return Ok(VoucherUpdateOutcome::Ignored);
        }

        let coupon = Coupon {
            id: None,
            code: voucher.coupon_code.clone(),
            kind: CouponKind::Fixed,
            value: voucher.amount,
            active: true,
            expires_at: None,
            adventure_id: None,
            created_at: Some(now),
            updated_at: Some(now),
        };

        coupons.insert_one(&coupon).await?;
        log::info!(
            "Issued gift coupon {} for voucher order {}",
            voucher.coupon_code,
            order_ref
        );

        Ok(VoucherUpdateOutcome::CouponIssued(voucher.coupon_code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_fee_five_percent() {
        assert_eq!(VoucherService::processing_fee(500.0), 25.0);
        assert_eq!(VoucherService::processing_fee(1000.0), 50.0);
    }

    #[test]
    fn test_processing_fee_floor() {
        assert_eq!(VoucherService::processing_fee(100.0), 10.0);
        assert_eq!(VoucherService::processing_fee(0.0), 10.0);
    }

    #[test]
    fn test_generated_codes_are_prefixed_uppercase() {
        for _ in 0..20 {
            let code = VoucherService::generate_code();
            assert!(code.starts_with("GIFT-"));
            assert_eq!(code.len(), 13);
            assert!(code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-'));
        }
    }
}
