use actix_web::{web, HttpResponse, Responder};
use bson::doc;
use mongodb::{bson::oid::ObjectId, Client, Collection};
use std::sync::Arc;

use crate::db::mongo::{COLL_BOOKINGS, DB_NAME};
use crate::models::booking::Booking;
use crate::services::booking_service::BookingService;

/*
    /api/bookings/{email}

    The user's reservation history: durable bookings merged with their open
    payment intents, an intent dropping out once its booking exists.
*/
pub async fn get_for_email(data: web::Data<Arc<Client>>, path: web::Path<String>) -> impl Responder {
    let client = data.into_inner();
    let email = path.into_inner();

    match BookingService::listings_for_email(&client, email.trim()).await {
        Ok(entries) => HttpResponse::Ok().json(entries),
        Err(err) => {
            log::error!("Error fetching bookings: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch bookings")
        }
    }
}

/*
    /api/bookings/id/{id}
*/
pub async fn get_by_id(data: web::Data<Arc<Client>>, path: web::Path<String>) -> impl Responder {
    let client = data.into_inner();
    let collection: Collection<Booking> = client.database(DB_NAME).collection(COLL_BOOKINGS);

    let id = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid booking ID"),
    };

    match collection.find_one(doc! { "_id": id }).await {
        Ok(Some(booking)) => HttpResponse::Ok().json(booking),
        Ok(None) => HttpResponse::NotFound().body("Booking not found"),
        Err(err) => {
            log::error!("Error fetching booking: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch booking")
        }
    }
}
