use bson::{Bson, Document};
use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use serde::Serialize;

use crate::models::adventure::Adventure;

/// One bookable occurrence, normalized from whichever historical shape the
/// stored document carries.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDateRange {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_past: bool,
}

pub struct DateService;

impl DateService {
    /// Normalize an adventure's date fields into an ordered range list.
    /// Shapes, current to oldest: `dates: [{startDate, endDate}]`, parallel
    /// `dates: [Date]` / `endDates: [Date]`, single `date`/`endDate`. An
    /// empty `dates` array falls back to the single-pair fields.
    ///
    /// Anomalies never fail resolution: an unparseable start substitutes the
    /// current instant (warn-logged), a missing or reversed end synthesizes
    /// start + 1 day.
    pub fn resolve(adventure: &Adventure, now: DateTime<Utc>) -> Vec<ResolvedDateRange> {
        let mut pairs = Self::raw_pairs(adventure, now);
        pairs.sort_by_key(|(start, _)| *start);

        pairs
            .into_iter()
            .map(|(start_date, end_date)| ResolvedDateRange {
                start_date,
                end_date,
                is_past: Self::is_past(start_date, adventure.booking_cutoff_hour, now),
            })
            .collect()
    }

    /// The occurrence the storefront preselects: the earliest pair starting
    /// at or after `now`, falling back to the earliest pair overall so a
    /// fully past adventure still renders a date.
    pub fn next_occurrence(
        ranges: &[ResolvedDateRange],
        now: DateTime<Utc>,
    ) -> Option<&ResolvedDateRange> {
        ranges
            .iter()
            .filter(|range| range.start_date >= now)
            .min_by_key(|range| range.start_date)
            .or_else(|| ranges.iter().min_by_key(|range| range.start_date))
    }

    /// A pair is past once its start day is over, or on the start day itself
    /// once the adventure's cutoff hour has passed.
    pub fn is_past(start: DateTime<Utc>, cutoff_hour: Option<u32>, now: DateTime<Utc>) -> bool {
        let start_day = start.date_naive();
        let today = now.date_naive();

        if start_day < today {
            return true;
        }

        if start_day == today {
            if let Some(cutoff) = cutoff_hour {
                return now.hour() >= cutoff;
            }
        }

        false
    }

    fn raw_pairs(adventure: &Adventure, now: DateTime<Utc>) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        let entries: &[Bson] = match &adventure.dates {
            Some(Bson::Array(array)) => array.as_slice(),
            _ => &[],
        };

        if !entries.is_empty() {
            let end_entries: &[Bson] = match &adventure.end_dates {
                Some(Bson::Array(array)) => array.as_slice(),
                _ => &[],
            };

            return entries
                .iter()
                .enumerate()
                .map(|(index, entry)| match entry {
                    Bson::Document(pair) => Self::pair_from_document(pair, now),
                    // Legacy parallel arrays: zip with endDates, synthesize
                    // a one-day range where endDates is absent or shorter.
                    other => {
                        let start = Self::parse_or_now(Some(other), now, "dates[]");
                        let end = end_entries
                            .get(index)
                            .and_then(Self::parse_bson_date)
                            .unwrap_or_else(|| start + Duration::days(1));
                        Self::ordered(start, end)
                    }
                })
                .collect();
        }

        if adventure.date.is_some() {
            let start = Self::parse_or_now(adventure.date.as_ref(), now, "date");
            let end = adventure
                .end_date
                .as_ref()
                .and_then(Self::parse_bson_date)
                .unwrap_or_else(|| start + Duration::days(1));
            return vec![Self::ordered(start, end)];
        }

        Vec::new()
    }

    fn pair_from_document(pair: &Document, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Self::parse_or_now(pair.get("startDate"), now, "dates[].startDate");
        let end = pair
            .get("endDate")
            .and_then(Self::parse_bson_date)
            .unwrap_or_else(|| start + Duration::days(1));

        Self::ordered(start, end)
    }

    fn ordered(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> (DateTime<Utc>, DateTime<Utc>) {
        if end < start {
            log::warn!(
                "endDate {} precedes startDate {}, synthesizing a one-day range",
                end,
                start
            );
            return (start, start + Duration::days(1));
        }

        (start, end)
    }

    fn parse_or_now(value: Option<&Bson>, now: DateTime<Utc>, field: &str) -> DateTime<Utc> {
        match value.and_then(Self::parse_bson_date) {
            Some(parsed) => parsed,
            None => {
                log::warn!(
                    "Unparseable {} value {:?}, substituting the current date",
                    field,
                    value
                );
                now
            }
        }
    }

    /// Accepts the representations that have accumulated in the store: BSON
    /// datetimes, RFC 3339 or plain `YYYY-MM-DD` strings, and numeric
    /// millisecond timestamps.
    fn parse_bson_date(value: &Bson) -> Option<DateTime<Utc>> {
        match value {
            Bson::DateTime(datetime) => Some(datetime.to_chrono()),
            Bson::String(text) => Self::parse_date_string(text),
            Bson::Int64(millis) => DateTime::from_timestamp_millis(*millis),
            Bson::Double(millis) if millis.is_finite() => {
                DateTime::from_timestamp_millis(*millis as i64)
            }
            _ => None,
        }
    }

    fn parse_date_string(text: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(text.trim()) {
            return Some(parsed.with_timezone(&Utc));
        }

        NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use chrono::TimeZone;

    fn adventure() -> Adventure {
        Adventure {
            id: None,
            title: "Kayak on the Danube".to_string(),
            images: vec![],
            category: None,
            location: None,
            meeting_point: None,
            difficulty: None,
            duration: None,
            price: 100.0,
            included: vec![],
            additional_info: None,
            advance_payment_percentage: None,
            booking_cutoff_hour: None,
            vessel_types: vec![],
            dates: None,
            end_dates: None,
            date: None,
            end_date: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn bson_dt(value: DateTime<Utc>) -> Bson {
        Bson::DateTime(bson::DateTime::from_chrono(value))
    }

    #[test]
    fn test_resolves_current_pair_array_shape() {
        let now = utc(2026, 8, 1, 10);
        let mut adventure = adventure();
        adventure.dates = Some(Bson::Array(vec![
            Bson::Document(doc! {
                "startDate": bson_dt(utc(2026, 9, 5, 9)),
                "endDate": bson_dt(utc(2026, 9, 6, 17)),
            }),
            Bson::Document(doc! {
                "startDate": bson_dt(utc(2026, 8, 15, 9)),
                "endDate": bson_dt(utc(2026, 8, 15, 18)),
            }),
        ]));

        let ranges = DateService::resolve(&adventure, now);
        assert_eq!(ranges.len(), 2);
        // Ordered by start date
        assert_eq!(ranges[0].start_date, utc(2026, 8, 15, 9));
        assert_eq!(ranges[1].start_date, utc(2026, 9, 5, 9));
        assert!(!ranges[0].is_past);
        assert!(!ranges[1].is_past);
    }

    #[test]
    fn test_pair_array_missing_end_synthesizes_one_day() {
        let now = utc(2026, 8, 1, 10);
        let mut adventure = adventure();
        adventure.dates = Some(Bson::Array(vec![Bson::Document(doc! {
            "startDate": bson_dt(utc(2026, 8, 20, 9)),
        })]));

        let ranges = DateService::resolve(&adventure, now);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].end_date, utc(2026, 8, 21, 9));
    }

    #[test]
    fn test_unparseable_start_substitutes_now() {
        let now = utc(2026, 8, 1, 10);
        let mut adventure = adventure();
        adventure.dates = Some(Bson::Array(vec![Bson::Document(doc! {
            "startDate": "not a date",
        })]));

        let ranges = DateService::resolve(&adventure, now);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].start_date, now);
        assert_eq!(ranges[0].end_date, now + Duration::days(1));
    }

    #[test]
    fn test_legacy_parallel_arrays_zip() {
        let now = utc(2026, 8, 1, 10);
        let mut adventure = adventure();
        adventure.dates = Some(Bson::Array(vec![
            bson_dt(utc(2026, 8, 10, 9)),
            bson_dt(utc(2026, 8, 24, 9)),
        ]));
        adventure.end_dates = Some(Bson::Array(vec![bson_dt(utc(2026, 8, 11, 17))]));

        let ranges = DateService::resolve(&adventure, now);
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].end_date, utc(2026, 8, 11, 17));
        // endDates shorter than dates: synthesized +1 day
        assert_eq!(ranges[1].end_date, utc(2026, 8, 25, 9));
    }

    #[test]
    fn test_empty_dates_array_falls_back_to_single_pair() {
        // A past single-date record with no endDate still resolves to one
        // past pair rather than nothing.
        let now = utc(2026, 8, 1, 10);
        let mut adventure = adventure();
        adventure.dates = Some(Bson::Array(vec![]));
        adventure.date = Some(bson_dt(utc(2024, 1, 1, 0)));

        let ranges = DateService::resolve(&adventure, now);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].start_date, utc(2024, 1, 1, 0));
        assert_eq!(ranges[0].end_date, utc(2024, 1, 2, 0));
        assert!(ranges[0].is_past);
    }

    #[test]
    fn test_single_pair_with_end_date() {
        let now = utc(2026, 8, 1, 10);
        let mut adventure = adventure();
        adventure.date = Some(bson_dt(utc(2026, 9, 1, 9)));
        adventure.end_date = Some(bson_dt(utc(2026, 9, 3, 17)));

        let ranges = DateService::resolve(&adventure, now);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].end_date, utc(2026, 9, 3, 17));
    }

    #[test]
    fn test_no_date_fields_resolves_empty() {
        let ranges = DateService::resolve(&adventure(), utc(2026, 8, 1, 10));
        assert!(ranges.is_empty());
    }

    #[test]
    fn test_reversed_pair_synthesizes_one_day_range() {
        let now = utc(2026, 8, 1, 10);
        let mut adventure = adventure();
        adventure.dates = Some(Bson::Array(vec![Bson::Document(doc! {
            "startDate": bson_dt(utc(2026, 8, 20, 9)),
            "endDate": bson_dt(utc(2026, 8, 18, 9)),
        })]));

        let ranges = DateService::resolve(&adventure, now);
        assert_eq!(ranges.len(), 1);
        assert!(ranges[0].end_date >= ranges[0].start_date);
        assert_eq!(ranges[0].end_date, utc(2026, 8, 21, 9));
    }

    #[test]
    fn test_string_dates_are_parsed() {
        let now = utc(2026, 8, 1, 10);
        let mut adventure = adventure();
        adventure.dates = Some(Bson::Array(vec![Bson::Document(doc! {
            "startDate": "2026-08-20",
            "endDate": "2026-08-21T17:00:00Z",
        })]));

        let ranges = DateService::resolve(&adventure, now);
        assert_eq!(ranges[0].start_date, utc(2026, 8, 20, 0));
        assert_eq!(ranges[0].end_date, utc(2026, 8, 21, 17));
    }

    #[test]
    fn test_same_day_cutoff_hour() {
        // Cutoff at 14: bookable at 13:00, closed at 15:00.
        let start = utc(2026, 8, 1, 9);
        assert!(!DateService::is_past(start, Some(14), utc(2026, 8, 1, 13)));
        assert!(DateService::is_past(start, Some(14), utc(2026, 8, 1, 15)));
        // Cutoff only applies to same-day dates.
        assert!(!DateService::is_past(utc(2026, 8, 2, 9), Some(14), utc(2026, 8, 1, 15)));
    }

    #[test]
    fn test_same_day_without_cutoff_is_bookable() {
        let start = utc(2026, 8, 1, 9);
        assert!(!DateService::is_past(start, None, utc(2026, 8, 1, 23)));
        assert!(DateService::is_past(start, None, utc(2026, 8, 2, 0)));
    }

    #[test]
    fn test_next_occurrence_prefers_future() {
        let now = utc(2026, 8, 1, 10);
        let ranges = vec![
            ResolvedDateRange {
                start_date: utc(2026, 7, 1, 9),
                end_date: utc(2026, 7, 2, 9),
                is_past: true,
            },
            ResolvedDateRange {
                start_date: utc(2026, 8, 20, 9),
                end_date: utc(2026, 8, 21, 9),
                is_past: false,
            },
            ResolvedDateRange {
                start_date: utc(2026, 9, 20, 9),
                end_date: utc(2026, 9, 21, 9),
                is_past: false,
            },
        ];

        let next = DateService::next_occurrence(&ranges, now).unwrap();
        assert_eq!(next.start_date, utc(2026, 8, 20, 9));
    }

    #[test]
    fn test_next_occurrence_falls_back_to_earliest_past() {
        let now = utc(2026, 8, 1, 10);
        let ranges = vec![
            ResolvedDateRange {
                start_date: utc(2026, 6, 1, 9),
                end_date: utc(2026, 6, 2, 9),
                is_past: true,
            },
            ResolvedDateRange {
                start_date: utc(2026, 5, 1, 9),
                end_date: utc(2026, 5, 2, 9),
                is_past: true,
            },
        ];

        let next = DateService::next_occurrence(&ranges, now).unwrap();
        assert_eq!(next.start_date, utc(2026, 5, 1, 9));
    }

    #[test]
    fn test_next_occurrence_empty() {
        assert!(DateService::next_occurrence(&[], utc(2026, 8, 1, 10)).is_none());
    }
}
