use std::collections::HashSet;

use bson::{doc, oid::ObjectId};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{Client, Collection};
use serde::Serialize;

use crate::db::mongo::{COLL_BOOKINGS, COLL_PAYMENT_INTENTS, DB_NAME};
use crate::models::booking::Booking;
use crate::models::payment_intent::{payment_status, PaymentIntent};
use crate::models::pricing::PricingSummary;
use crate::models::status::NormalizedStatus;

/// One row in the user's reservation history, whether it comes from a
/// durable booking or a still-open payment intent.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingListEntry {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub adventure_id: ObjectId,
    pub adventure_title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub pricing: PricingSummary,
    pub status: NormalizedStatus,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum PaymentUpdateOutcome {
    /// Status written; nothing else to do.
    Updated,
    /// Status written and a durable booking created from the intent.
    BookingCreated(ObjectId),
    /// A replayed or late callback on a terminal intent; dropped.
    Ignored,
    /// No intent carries this provider reference.
    UnknownOrder,
}

pub struct BookingService;

impl BookingService {
    /// Whether an IPN-driven update may replace the current intent status.
    /// `confirmed` is terminal: a late or replayed callback never moves an
    /// intent out of it. Everything else follows the provider.
    pub fn accepts_transition(current: &str, incoming: &str) -> bool {
        !current
            .trim()
            .eq_ignore_ascii_case(payment_status::CONFIRMED)
            || incoming
                .trim()
                .eq_ignore_ascii_case(payment_status::CONFIRMED)
    }

    /// Merge durable bookings with open payment intents for display. An
    /// intent whose booking already exists is superseded and dropped; both
    /// record types are shown until then. Newest first.
    pub fn merge_listings(
        bookings: Vec<Booking>,
        intents: Vec<PaymentIntent>,
    ) -> Vec<BookingListEntry> {
        let superseded: HashSet<ObjectId> =
            bookings.iter().filter_map(|booking| booking.intent_id).collect();

        let mut entries: Vec<BookingListEntry> = bookings
            .into_iter()
            .map(|booking| BookingListEntry {
                kind: "booking",
                id: booking.id,
                adventure_id: booking.adventure_id,
                adventure_title: booking.adventure_title,
                start_date: booking.start_date,
                end_date: booking.end_date,
                pricing: booking.pricing,
                status: NormalizedStatus::from_raw(&booking.status),
                created_at: booking.created_at,
            })
            .collect();

        for intent in intents {
            if intent.id.map_or(false, |id| superseded.contains(&id)) {
                continue;
            }

            entries.push(BookingListEntry {
                kind: "paymentIntent",
                id: intent.id,
                adventure_id: intent.adventure_id,
                adventure_title: intent.adventure_title,
                start_date: intent.start_date,
                end_date: intent.end_date,
                pricing: intent.pricing,
                status: NormalizedStatus::from_raw(&intent.payment_status),
                created_at: intent.created_at,
            });
        }

        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries
    }

    /// Apply a provider callback to the intent it references; on
    /// confirmation, create the durable booking (idempotently).
    pub async fn apply_payment_update(
        client: &Client,
        order_ref: &str,
        incoming_status: &str,
    ) -> Result<PaymentUpdateOutcome, mongodb::error::Error> {
        let intents: Collection<PaymentIntent> =
            client.database(DB_NAME).collection(COLL_PAYMENT_INTENTS);

        let intent = match intents
            .find_one(doc! { "providerOrderRef": order_ref })
            .await?
        {
            Some(intent) => intent,
            None => {
                log::warn!("IPN for unknown provider order ref {}", order_ref);
                return Ok(PaymentUpdateOutcome::UnknownOrder);
            }
        };

        if !Self::accepts_transition(&intent.payment_status, incoming_status) {
            log::info!(
                "Ignoring IPN status {:?} for confirmed order {}",
                incoming_status,
                order_ref
            );
            return Ok(PaymentUpdateOutcome::Ignored);
        }

        let now = Utc::now();
        intents
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
            return Ok(PaymentUpdateOutcome::Updated);
        }

        Self::create_booking_from_intent(client, intent, now).await
    }

    async fn create_booking_from_intent(
        client: &Client,
        intent: PaymentIntent,
        now: DateTime<Utc>,
    ) -> Result<PaymentUpdateOutcome, mongodb::error::Error> {
        let bookings: Collection<Booking> = client.database(DB_NAME).collection(COLL_BOOKINGS);

        let intent_id = match intent.id {
            Some(id) => id,
            None => {
                log::error!(
                    "Confirmed intent for order {} has no _id; cannot create booking",
                    intent.provider_order_ref
                );
                return Ok(PaymentUpdateOutcome::Updated);
            }
        };

        // Replayed confirmations must not duplicate the booking.
        if bookings
            .find_one(doc! { "intentId": intent_id })
            .await?
            .is_some()
        {
            return Ok(PaymentUpdateOutcome::Ignored);
        }

        let booking = Booking {
            id: None,
            adventure_id: intent.adventure_id,
            adventure_title: intent.adventure_title,
            intent_id: Some(intent_id),
            customer_name: intent.customer_name,
            customer_email: intent.customer_email,
            phone_number: intent.phone_number,
            start_date: intent.start_date,
            end_date: intent.end_date,
            vessels: intent.vessels,
            pricing: intent.pricing,
            coupon_code: intent.coupon_code,
            status: payment_status::CONFIRMED.to_string(),
            created_at: Some(now),
            updated_at: Some(now),
        };

        let result = bookings.insert_one(&booking).await?;
        let booking_id = result
            .inserted_id
            .as_object_id()
            .unwrap_or_else(ObjectId::new);

        log::info!(
            "Created booking {} from confirmed intent {}",
            booking_id,
            intent_id
        );
        Ok(PaymentUpdateOutcome::BookingCreated(booking_id))
    }

    pub async fn listings_for_email(
        client: &Client,
        email: &str,
    ) -> Result<Vec<BookingListEntry>, mongodb::error::Error> {
        let bookings: Collection<Booking> = client.database(DB_NAME).collection(COLL_BOOKINGS);
        let intents: Collection<PaymentIntent> =
            client.database(DB_NAME).collection(COLL_PAYMENT_INTENTS);

        let filter = doc! { "customerEmail": email };

        let bookings: Vec<Booking> = bookings.find(filter.clone()).await?.try_collect().await?;
        let intents: Vec<PaymentIntent> = intents.find(filter).await?.try_collect().await?;

        Ok(Self::merge_listings(bookings, intents))
    }
}
