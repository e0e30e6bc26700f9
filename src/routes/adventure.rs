use actix_web::{web, HttpResponse, Responder};
use bson::{doc, Document};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{bson::oid::ObjectId, Client};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::mongo::{COLL_ADVENTURES, DB_NAME};
use crate::models::adventure::{Adventure, Difficulty};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAdventures {
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub location: Option<String>,
    /// Keep only adventures with at least one bookable occurrence left.
    #[serde(default)]
    pub bookable_only: bool,
}

/*
    /api/adventures
*/
pub async fn get_all(data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    let collection = client
        .database(DB_NAME)
        .collection::<Adventure>(COLL_ADVENTURES);

    let cursor = collection
        .find(doc! {})
        .sort(doc! { "createdAt": -1 })
        .limit(100)
        .await;

    match cursor {
        Ok(cursor) => match cursor.try_collect::<Vec<Adventure>>().await {
            Ok(adventures) => {
                let now = Utc::now();
                let listed: Vec<_> = adventures
                    .into_iter()
                    .map(|adventure| adventure.with_resolved_dates(now))
                    .collect();
                HttpResponse::Ok().json(listed)
            }
            Err(err) => {
                log::error!("Error collecting adventures: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to retrieve adventures")
            }
        },
        Err(err) => {
            log::error!("Error fetching adventures: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch adventures")
        }
    }
}

/*
    /api/adventures/search
*/
pub async fn search(
    data: web::Data<Arc<Client>>,
    params: web::Json<SearchAdventures>,
) -> impl Responder {
    let client = data.into_inner();
    let params = params.into_inner();
    let collection = client
        .database(DB_NAME)
        .collection::<Adventure>(COLL_ADVENTURES);

    let filter = build_search_filter(&params);

    match collection.find(filter).await {
        Ok(cursor) => match cursor.try_collect::<Vec<Adventure>>().await {
            Ok(adventures) => {
                let now = Utc::now();
                let mut results: Vec<_> = adventures
                    .into_iter()
                    .map(|adventure| adventure.with_resolved_dates(now))
                    .collect();

                // Date availability cannot be filtered in the query; the
                // three historical date shapes only line up after resolution.
                if params.bookable_only {
                    results.retain(|entry| {
                        entry.resolved_dates.iter().any(|range| !range.is_past)
                    });
                }

                HttpResponse::Ok().json(results)
            }
            Err(err) => {
                log::error!("Error collecting search results: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to retrieve adventures")
            }
        },
        Err(err) => {
            log::error!("Error searching adventures: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to search adventures")
        }
    }
}

/*
    /api/adventures/{id}
*/
pub async fn get_by_id(path: web::Path<String>, data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    let collection = client
        .database(DB_NAME)
        .collection::<Adventure>(COLL_ADVENTURES);

    let id: ObjectId = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ID"),
    };

    match collection.find_one(doc! { "_id": id }).await {
        Ok(Some(adventure)) => HttpResponse::Ok().json(adventure.with_resolved_dates(Utc::now())),
        Ok(None) => HttpResponse::NotFound().body("Adventure not found"),
        Err(err) => {
            log::error!("Failed to retrieve adventure: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to retrieve adventure")
        }
    }
}

fn build_search_filter(params: &SearchAdventures) -> Document {
    let mut filter = Document::new();

    if let Some(category) = &params.category {
        if !category.is_empty() {
            filter.insert("category", category.as_str());
        }
    }

    if let Some(difficulty) = &params.difficulty {
        if let Ok(value) = bson::ser::to_bson(difficulty) {
            filter.insert("difficulty", value);
        }
    }

    if let Some(location) = &params.location {
        if !location.is_empty() {
            filter.insert(
                "location",
                doc! { "$regex": location.as_str(), "$options": "i" },
            );
        }
    }

    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_params_build_empty_filter() {
        let params = SearchAdventures {
            category: None,
            difficulty: None,
            location: None,
            bookable_only: false,
        };
        assert!(build_search_filter(&params).is_empty());
    }

    #[test]
    fn test_filter_includes_requested_criteria() {
        let params = SearchAdventures {
            category: Some("kayak".to_string()),
            difficulty: Some(Difficulty::Moderate),
            location: Some("Dunăre".to_string()),
            bookable_only: true,
        };

        let filter = build_search_filter(&params);
        assert_eq!(filter.get_str("category").unwrap(), "kayak");
        assert_eq!(filter.get_str("difficulty").unwrap(), "moderate");
        assert!(filter.get_document("location").is_ok());
    }
}
