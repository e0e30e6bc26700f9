use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use mongodb::{bson::oid::ObjectId, Client};
use serde::Deserialize;
use std::sync::Arc;

use crate::services::coupon_service::{CouponError, CouponService};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponInput {
    pub code: String,
    pub adventure_id: String,
    pub base_price: f64,
}

/*
    /api/coupons/validate

    An unusable code is a user-correctable outcome, not an error status:
    the storefront shows the message inline and keeps the form state.
*/
pub async fn validate(
    data: web::Data<Arc<Client>>,
    input: web::Json<ValidateCouponInput>,
) -> impl Responder {
    let client = data.into_inner();
    let input = input.into_inner();

    let adventure_id = match ObjectId::parse_str(&input.adventure_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid adventure ID"),
    };

    let coupon = match CouponService::lookup(&client, &input.code).await {
        Ok(coupon) => coupon,
        Err(err) => {
            log::error!("Error looking up coupon: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to look up coupon");
        }
    };

    let coupon = match coupon {
        Some(coupon) => coupon,
        None => {
            return HttpResponse::Ok().json(serde_json::json!({
                "valid": false,
                "message": CouponError::NotFound.to_string(),
            }))
        }
    };

    match CouponService::validate(&coupon, &adventure_id, input.base_price, Utc::now()) {
        Ok(discount) => {
            let total_price = (input.base_price - discount).max(0.0);
            HttpResponse::Ok().json(serde_json::json!({
                "valid": true,
                "discount": discount,
                "totalPrice": total_price,
                "coupon": {
                    "code": coupon.code,
                    "type": coupon.kind,
                    "value": coupon.value,
                },
            }))
        }
        Err(err) => HttpResponse::Ok().json(serde_json::json!({
            "valid": false,
            "message": err.to_string(),
        })),
    }
}
