use actix_web::{web, HttpRequest, HttpResponse, Responder};
use bson::doc;
use mongodb::{bson::oid::ObjectId, Client, Collection};
use std::sync::Arc;

use crate::db::mongo::{COLL_PAYMENT_INTENTS, DB_NAME};
use crate::models::payment_intent::PaymentIntent;
use crate::models::status::NormalizedStatus;
use crate::services::booking_service::BookingService;
use crate::services::payment::interface::PaymentOperations;
use crate::services::payment::netopia::{IpnPayload, NetopiaClient};

pub const SIGNATURE_HEADER: &str = "x-payment-signature";

/*
    /api/payments/ipn

    Provider callback for booking payments. Signature is checked over the
    raw body before anything is parsed.
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
        log::warn!("Rejected payment IPN with bad signature");
        return HttpResponse::BadRequest().body("Invalid signature");
    }

    let ipn = match IpnPayload::from_envelope(&payload) {
        Ok(ipn) => ipn,
        Err(err) => {
            log::warn!("Rejected payment IPN: {}", err);
            return HttpResponse::BadRequest().body("Invalid payload");
        }
    };

    let status = NetopiaClient::payment_status_for(ipn.status);

    match BookingService::apply_payment_update(&mongo_data.into_inner(), &ipn.order_ref, status)
        .await
    {
        Ok(outcome) => {
            log::info!(
                "Payment IPN for order {} -> {} ({:?})",
                ipn.order_ref,
                status,
                outcome
            );
            HttpResponse::Ok().json(serde_json::json!({ "received": true }))
        }
        Err(err) => {
            log::error!("Error applying payment update: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to process payment update")
        }
    }
}

/*
    /api/payments/{id}/status

    Polled by the result page every few seconds while the payment is in
    flight; returns the normalized status plus the raw value for audit.
*/
pub async fn get_status(path: web::Path<String>, data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();

    let id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid intent ID"),
    };

    let intents: Collection<PaymentIntent> =
        client.database(DB_NAME).collection(COLL_PAYMENT_INTENTS);

    match intents.find_one(doc! { "_id": id }).await {
        Ok(Some(intent)) => HttpResponse::Ok().json(serde_json::json!({
            "intentId": id.to_string(),
            "paymentStatus": NormalizedStatus::from_raw(&intent.payment_status),
        })),
        Ok(None) => HttpResponse::NotFound().body("Payment intent not found"),
        Err(err) => {
            log::error!("Error fetching payment intent: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch payment intent")
        }
    }
}
