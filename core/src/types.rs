//! Domain records for the activeto API.
//!
//! # Design
//! Every field is optional. The mappers copy whatever the server sent and do
//! not substitute defaults, so a record built from a sparse payload is
//! partially populated rather than rejected. Consumers must tolerate `None`.
//!
//! Records serialize back to the API's camelCase field names, which lets a
//! mapped record be compared against the payload it came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: Option<i64>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// A recreational facility. `distance` is computed by the server relative to
/// the `lat`/`lng` of the request and is absent for unscoped queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
    pub address: Option<Address>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub distance: Option<f64>,
}

/// An activity type. Belongs to exactly one [`Category`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Type {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Option<i64>,
    pub title: Option<String>,
}

/// A scheduled activity with its facility embedded by value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "reservationURL")]
    pub reservation_url: Option<String>,
    pub is_available: Option<bool>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub min_age: Option<f64>,
    pub max_age: Option<f64>,
    pub last_updated: Option<DateTime<Utc>>,
    pub facility: Option<Facility>,
}

/// The three page-envelope fields the UI cares about. Totals are not modeled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(rename = "first")]
    pub is_first_page: Option<bool>,
    #[serde(rename = "last")]
    pub is_last_page: Option<bool>,
    #[serde(rename = "number")]
    pub page_number: Option<u32>,
}

/// A device position. `None` wherever a `Location` is optional means the
/// query is not scoped to a place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}
