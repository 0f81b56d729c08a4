//! Conversions from decoded JSON into domain records.
//!
//! # Design
//! Mappers are total: they never fail and never fill in defaults. A field
//! that is missing or has an unexpected JSON type comes out as `None`.
//! Nested objects are mapped by composing mappers (`map_activity` calls
//! `map_facility`, which calls `map_address`), so an activity's facility is
//! always exactly what `map_facility` would produce for the same object.
//!
//! The one shape requirement lives in [`content`]: list responses must carry
//! a `content` array, otherwise the payload is a `Decode` error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::error::ApiError;
use crate::types::{Activity, Address, Category, Facility, Pagination, Type};

pub fn map_address(json: &Value) -> Address {
    Address {
        id: int(json, "id"),
        street: string(json, "street"),
        city: string(json, "city"),
        province: string(json, "province"),
        postal_code: string(json, "postalCode"),
        country: string(json, "country"),
    }
}

pub fn map_facility(json: &Value) -> Facility {
    Facility {
        id: int(json, "id"),
        title: string(json, "title"),
        phone: string(json, "phone"),
        email: string(json, "email"),
        url: string(json, "url"),
        address: object(json, "address").map(map_address),
        longitude: float(json, "longitude"),
        latitude: float(json, "latitude"),
        distance: float(json, "distance"),
    }
}

/// The API names the owning category's id `category`.
pub fn map_type(json: &Value) -> Type {
    Type {
        id: int(json, "id"),
        title: string(json, "title"),
        category_id: int(json, "category"),
    }
}

pub fn map_category(json: &Value) -> Category {
    Category {
        id: int(json, "id"),
        title: string(json, "title"),
    }
}

pub fn map_activity(json: &Value) -> Activity {
    Activity {
        id: int(json, "id"),
        title: string(json, "title"),
        category: string(json, "category"),
        reservation_url: string(json, "reservationURL"),
        is_available: json.get("isAvailable").and_then(Value::as_bool),
        start_time: json.get("startTime").and_then(timestamp),
        end_time: json.get("endTime").and_then(timestamp),
        min_age: float(json, "minAge"),
        max_age: float(json, "maxAge"),
        last_updated: json.get("lastUpdated").and_then(timestamp),
        facility: object(json, "facility").map(map_facility),
    }
}

/// Reads `first`, `last` and `number` from a page envelope. Every other
/// envelope field is ignored.
pub fn map_pagination(envelope: &Value) -> Pagination {
    Pagination {
        is_first_page: envelope.get("first").and_then(Value::as_bool),
        is_last_page: envelope.get("last").and_then(Value::as_bool),
        page_number: envelope
            .get("number")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok()),
    }
}

/// The `content` array of a page envelope.
pub fn content(envelope: &Value) -> Result<&[Value], ApiError> {
    envelope
        .get("content")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| ApiError::Decode("page envelope has no content array".to_string()))
}

/// Maps every element of the envelope's `content` array with `mapper`.
pub fn map_content<T>(envelope: &Value, mapper: fn(&Value) -> T) -> Result<Vec<T>, ApiError> {
    Ok(content(envelope)?.iter().map(mapper).collect())
}

/// Accepts RFC 3339, a zone-less ISO date-time (read as UTC), a bare date
/// (UTC midnight), or epoch milliseconds. Anything else is an invalid
/// instant.
pub fn timestamp(json: &Value) -> Option<DateTime<Utc>> {
    match json {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

fn int(json: &Value, key: &str) -> Option<i64> {
    json.get(key).and_then(Value::as_i64)
}

fn float(json: &Value, key: &str) -> Option<f64> {
    json.get(key).and_then(Value::as_f64)
}

fn string(json: &Value, key: &str) -> Option<String> {
    json.get(key).and_then(Value::as_str).map(str::to_string)
}

fn object<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    json.get(key).filter(|v| v.is_object())
}
