use actix_web::{web, HttpResponse, Responder};
use bson::doc;
use chrono::{DateTime, Utc};
use mongodb::{bson::oid::ObjectId, Client, Collection};
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::mongo::{COLL_ADVENTURES, COLL_PAYMENT_INTENTS, DB_NAME};
use crate::models::adventure::Adventure;
use crate::models::payment_intent::{payment_status, PaymentIntent};
use crate::models::pricing::VesselSelection;
use crate::services::coupon_service::CouponService;
use crate::services::date_service::DateService;
use crate::services::payment::interface::{PaymentOperations, StartPaymentRequest};
use crate::services::payment::netopia::NetopiaClient;
use crate::services::pricing_service::PricingService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutInput {
    pub adventure_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub start_date: DateTime<Utc>,
    pub vessels: VesselSelection,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachPhoneInput {
    pub phone_number: String,
}

/*
    /api/checkout/intent

    Prices the submission server-side, persists a pending payment intent and
    opens the advance payment with the provider. The zero-vessel guard is the
    only hard gate here; a stale or invalid coupon degrades to no discount.
*/
pub async fn create_intent(
    mongo_data: web::Data<Arc<Client>>,
    payment_data: web::Data<NetopiaClient>,
    input: web::Json<CheckoutInput>,
) -> impl Responder {
    let client = mongo_data.into_inner();
    let input = input.into_inner();

    if input.vessels.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Select at least one kayak or SUP board before booking"
        }));
    }

    let adventure_id = match ObjectId::parse_str(&input.adventure_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid adventure ID"),
    };

    let adventures: Collection<Adventure> =
        client.database(DB_NAME).collection(COLL_ADVENTURES);

    let adventure = match adventures.find_one(doc! { "_id": adventure_id }).await {
        Ok(Some(adventure)) => adventure,
        Ok(None) => return HttpResponse::NotFound().body("Adventure not found"),
        Err(err) => {
            log::error!("Error fetching adventure: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to fetch adventure");
        }
    };

    let now = Utc::now();

    // The submitted day must be one of the adventure's occurrences and
    // still bookable under the same-day cutoff.
    let ranges = DateService::resolve(&adventure, now);
    let selected = ranges
        .iter()
        .find(|range| range.start_date.date_naive() == input.start_date.date_naive());

    let selected = match selected {
        Some(range) if !range.is_past => *range,
        Some(_) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Bookings for this date have closed"
            }))
        }
        None => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "The selected date is no longer available"
            }))
        }
    };

    let base_price = PricingService::base_price(adventure.price, &input.vessels);

    let mut coupon_code = None;
    let mut discount = 0.0;
    if let Some(code) = input.coupon_code.as_deref().filter(|code| !code.trim().is_empty()) {
        match CouponService::lookup(&client, code).await {
            Ok(Some(coupon)) => {
                match CouponService::validate(&coupon, &adventure_id, base_price, now) {
                    Ok(value) => {
                        discount = value;
                        coupon_code = Some(coupon.code);
                    }
                    Err(err) => log::warn!("Ignoring coupon {:?} at checkout: {}", code, err),
                }
            }
            Ok(None) => log::warn!("Ignoring unknown coupon {:?} at checkout", code),
            Err(err) => {
                log::error!("Error looking up coupon: {:?}", err);
                return HttpResponse::InternalServerError().body("Failed to look up coupon");
            }
        }
    }

    let pricing = PricingService::summarize(
        adventure.price,
        &input.vessels,
        discount,
        adventure.advance_payment_percentage,
    );

    let order_ref = uuid::Uuid::new_v4().to_string();
    let intent = PaymentIntent {
        id: None,
        adventure_id,
        adventure_title: adventure.title.clone(),
        customer_name: input.customer_name,
        customer_email: input.customer_email.clone(),
        phone_number: None,
        start_date: selected.start_date,
        end_date: selected.end_date,
        vessels: input.vessels,
        pricing,
        coupon_code,
        provider_order_ref: order_ref.clone(),
        payment_status: payment_status::PENDING.to_string(),
        created_at: Some(now),
        updated_at: Some(now),
    };

    let intents: Collection<PaymentIntent> =
        client.database(DB_NAME).collection(COLL_PAYMENT_INTENTS);

    let intent_id = match intents.insert_one(&intent).await {
        Ok(result) => result
            .inserted_id
            .as_object_id()
            .map(|id| id.to_string())
            .unwrap_or_default(),
        Err(err) => {
            log::error!("Error creating payment intent: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to create payment intent");
        }
    };

    let request = StartPaymentRequest {
        order_ref: order_ref.clone(),
        amount: pricing.advance_payment_amount,
        description: format!("Advance payment for {}", adventure.title),
        customer_email: input.customer_email,
    };

    match payment_data.start_payment(request).await {
        Ok(redirect) => HttpResponse::Ok().json(serde_json::json!({
            "intentId": intent_id,
            "redirectUrl": redirect.redirect_url,
            "pricing": pricing,
        })),
        Err(err) => {
            log::error!("Error starting payment for order {}: {}", order_ref, err);
            let _ = intents
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
    /api/checkout/intent/{id}/phone

    Phone numbers are collected just-in-time on the payment page.
*/
pub async fn attach_phone(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    input: web::Json<AttachPhoneInput>,
) -> impl Responder {
    let client = data.into_inner();

    let id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid intent ID"),
    };

    let phone = input.into_inner().phone_number;
    if !valid_phone(&phone) {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Enter a valid Romanian mobile number (07xxxxxxxx)"
        }));
    }

    let intents: Collection<PaymentIntent> =
        client.database(DB_NAME).collection(COLL_PAYMENT_INTENTS);

    match intents
        .update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "phoneNumber": phone.trim(),
                "updatedAt": Utc::now().to_rfc3339(),
            }},
        )
        .await
    {
        Ok(result) => {
            if result.matched_count == 0 {
                return HttpResponse::NotFound().body("Payment intent not found");
            }
            HttpResponse::Ok().json(serde_json::json!({ "updated": true }))
        }
        Err(err) => {
            log::error!("Error attaching phone number: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to update payment intent")
        }
    }
}

/// Romanian mobile numbers, with or without the country prefix.
fn valid_phone(phone: &str) -> bool {
    Regex::new(r"^(\+4)?07\d{8}$")
        .map(|re| re.is_match(phone.trim()))
        .unwrap_or(false)
}
