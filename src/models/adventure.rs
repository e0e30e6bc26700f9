use bson::{oid::ObjectId, Bson};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::date_service::{DateService, ResolvedDateRange};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    #[serde(rename = "easy")]
    Easy,
    #[serde(rename = "moderate")]
    Moderate,
    #[serde(rename = "hard")]
    Hard,
    #[serde(rename = "extreme")]
    Extreme,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    #[serde(rename = "hours")]
    Hours,
    #[serde(rename = "days")]
    Days,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct TripDuration {
    pub value: u32,
    pub unit: DurationUnit,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VesselType {
    #[serde(rename = "caiacSingle")]
    CaiacSingle,
    #[serde(rename = "caiacDublu")]
    CaiacDublu,
    #[serde(rename = "placaSUP")]
    PlacaSup,
}

/// A bookable product, as stored. Date fields are kept as raw BSON because
/// the store carries three historical shapes side by side; `DateService`
/// turns them into `ResolvedDateRange`s at the read boundary.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Adventure {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub meeting_point: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub duration: Option<TripDuration>,
    /// Per-person base rate, RON.
    pub price: f64,
    #[serde(default)]
    pub included: Vec<String>,
    pub additional_info: Option<String>,
    /// Percentage of the total charged online up front; the rest is cash on
    /// the day. Absent on older records (the splitter defaults it to 30).
    pub advance_payment_percentage: Option<f64>,
    /// Same-day bookings close once this hour has passed.
    pub booking_cutoff_hour: Option<u32>,
    #[serde(default)]
    pub vessel_types: Vec<VesselType>,
    // Historical date shapes, current to oldest:
    //   dates: [{startDate, endDate}]   (current)
    //   dates: [Date] + endDates: [Date] (legacy parallel arrays)
    //   date / endDate                   (legacy single pair)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dates: Option<Bson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_dates: Option<Bson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Bson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Bson>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// An adventure as served to the storefront: the stored document plus its
/// normalized date ranges and the next occurrence to preselect.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdventureWithDates {
    #[serde(flatten)]
    pub adventure: Adventure,
    pub resolved_dates: Vec<ResolvedDateRange>,
    pub next_occurrence: Option<ResolvedDateRange>,
}

impl Adventure {
    pub fn with_resolved_dates(self, now: DateTime<Utc>) -> AdventureWithDates {
        let resolved_dates = DateService::resolve(&self, now);
        let next_occurrence = DateService::next_occurrence(&resolved_dates, now).cloned();

        AdventureWithDates {
            adventure: self,
            resolved_dates,
            next_occurrence,
        }
    }
}
