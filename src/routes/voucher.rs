use actix_web::{web, HttpRequest, HttpResponse, Responder};
use bson::doc;
use chrono::Utc;
use mongodb::{Client, Collection};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::mongo::{COLL_VOUCHERS, DB_NAME};
use crate::models::payment_intent::payment_status;
use crate::models::voucher::VoucherPurchase;
use crate::routes::payment::SIGNATURE_HEADER;
use crate::services::payment::interface::{PaymentOperations, StartPaymentRequest};
use crate::services::payment::netopia::{IpnPayload, NetopiaClient};
use crate::services::voucher_service::VoucherService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherInput {
    pub customer_name: Option<String>,
    pub customer_email: String,
    pub amount: f64,
}

/*
    /api/vouchers

    Gift-card purchase: the buyer pays the gift value plus a processing fee;
    the generated code becomes a live coupon once the payment confirms.
*/
pub async fn purchase(
    mongo_data: web::Data<Arc<Client>>,
    payment_data: web::Data<NetopiaClient>,
    input: web::Json<VoucherInput>,
) -> impl Responder {
    let client = mongo_data.into_inner();
    let input = input.into_inner();

    if !input.amount.is_finite() || input.amount <= 0.0 {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Voucher amount must be a positive value"
        }));
    }

    let processing_fee = VoucherService::processing_fee(input.amount);
    let coupon_code = VoucherService::generate_code();
    let order_ref = uuid::Uuid::new_v4().to_string();
    let now = Utc::now();

    let voucher = VoucherPurchase {
        id: None,
        customer_name: input.customer_name,
        customer_email: input.customer_email.clone(),
        amount: input.amount,
        processing_fee,
        coupon_code: coupon_code.clone(),
        provider_order_ref: order_ref.clone(),
        payment_status: payment_status::PENDING.to_string(),
        created_at: Some(now),
        updated_at: Some(now),
    };

    let vouchers: Collection<VoucherPurchase> =
        client.database(DB_NAME).collection(COLL_VOUCHERS);

    let voucher_id = match vouchers.insert_one(&voucher).await {
        Ok(result) => result
            .inserted_id
            .as_object_id()
            .map(|id| id.to_string())
            .unwrap_or_default(),
        Err(err) => {
            log::error!("Error creating voucher purchase: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to create voucher purchase");
        }
    };

    let request = StartPaymentRequest {
        order_ref: order_ref.clone(),
        amount: input.amount + processing_fee,
        description: format!("AdventureTime gift voucher {}", coupon_code),
        customer_email: input.customer_email,
    };

    match payment_data.start_payment(request).await {
        Ok(redirect) => HttpResponse::Ok().json(serde_json::json!({
            "voucherId": voucher_id,
            "couponCode": coupon_code,
            "processingFee": processing_fee,
            "redirectUrl": redirect.redirect_url,
        })),
        Err(err) => {
            log::error!("Error starting voucher payment for order {}: {}", order_ref, err);
            let _ = vouchers
                .update_one(
                    doc! { "providerOrderRef": &order_ref },
                    doc! { "$set": {
                        "paymentStatus": payment_status::ERROR,
                        "updatedAt": Utc::now().to_rfc3339(),
                    }},
                )
                .await;
            HttpResponse::BadGateway().json(serde_json::json!({
                "error": "Could not reach the payment provider, please try again"
            }))
        }
    }
}

/*
    /api/vouchers/ipn
*/
pub async fn handle_ipn(
    req: HttpRequest,
    payload: web::Bytes,
    mongo_data: web::Data<Arc<Client>>,
    payment_data: web::Data<NetopiaClient>,
) -> impl Responder {
    let signature = match req.headers().get(SIGNATURE_HEADER) {
        Some(sig) => sig.to_str().unwrap_or(""),
        None => {
            return HttpResponse::BadRequest().body("Missing signature header");
        }
    };

    if !payment_data.verify_ipn_signature(&payload, signature) {
        log::warn!("Rejected voucher IPN with bad signature");
        return HttpResponse::BadRequest().body("Invalid signature");
    }

    let ipn = match IpnPayload::from_envelope(&payload) {
        Ok(ipn) => ipn,
        Err(err) => {
            log::warn!("Rejected voucher IPN: {}", err);
            return HttpResponse::BadRequest().body("Invalid payload");
        }
    };

    let status = NetopiaClient::payment_status_for(ipn.status);

    match VoucherService::apply_payment_update(&mongo_data.into_inner(), &ipn.order_ref, status)
        .await
    {
        Ok(outcome) => {
            log::info!(
                "Voucher IPN for order {} -> {} ({:?})",
                ipn.order_ref,
                status,
                outcome
            );
            HttpResponse::Ok().json(serde_json::json!({ "received": true }))
        }
        Err(err) => {
            log::error!("Error applying voucher update: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to process voucher update")
        }
    }
}
