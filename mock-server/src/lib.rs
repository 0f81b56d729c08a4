//! In-memory stand-in for the activeto REST API.
//!
//! Every list route answers with a page envelope. Facility `distance` is
//! computed from the request's `lat`/`lng` when both parse as numbers and is
//! `null` otherwise. Unknown ids are 404.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::debug;

mod fixtures;

pub use fixtures::seed;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: i64,
    pub street: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Facility {
    pub id: i64,
    pub title: String,
    pub phone: String,
    pub email: String,
    pub url: String,
    pub address: Address,
    pub longitude: f64,
    pub latitude: f64,
    pub distance: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: i64,
    pub title: String,
}

/// `category` is the owning category's id.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActivityType {
    pub id: i64,
    pub title: String,
    pub category: i64,
}

/// Stored form of an activity; the facility is embedded when serving.
#[derive(Clone, Debug)]
pub struct ActivityRecord {
    pub id: i64,
    pub title: String,
    pub type_id: i64,
    pub facility_id: i64,
    pub reservation_url: String,
    pub is_available: bool,
    pub start_time: String,
    pub end_time: String,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub last_updated: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: i64,
    pub title: String,
    pub category: String,
    #[serde(rename = "reservationURL")]
    pub reservation_url: String,
    pub is_available: bool,
    pub start_time: String,
    pub end_time: String,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub last_updated: String,
    pub facility: Facility,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub first: bool,
    pub last: bool,
    pub number: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub page: Option<usize>,
    pub size: Option<usize>,
    pub sort: Option<String>,
}

const DEFAULT_PAGE_SIZE: usize = 20;

impl PageQuery {
    fn origin(&self) -> Option<(f64, f64)> {
        let lat = self.lat.as_deref()?.parse().ok()?;
        let lng = self.lng.as_deref()?.parse().ok()?;
        Some((lat, lng))
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub types: Vec<ActivityType>,
    pub facilities: Vec<Facility>,
    pub activities: Vec<ActivityRecord>,
}

pub type Db = Arc<Catalog>;

pub fn app() -> Router {
    app_with(seed())
}

pub fn app_with(catalog: Catalog) -> Router {
    let db: Db = Arc::new(catalog);
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/{id}/types", get(types_by_category))
        .route("/types", get(list_types))
        .route("/types/{id}/activities", get(activities_by_type))
        .route("/activities/{id}", get(get_activity))
        .route("/facilities", get(list_facilities))
        .route("/facilities/{id}", get(get_facility))
        .route("/facilities/{id}/types", get(types_by_facility))
        .route(
            "/facilities/{id}/types/{type_id}/activities",
            get(activities_by_facility_and_type),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Slices `items` into the page the query asks for.
pub fn paginate<T>(items: Vec<T>, query: &PageQuery) -> Page<T> {
    let size = query.size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let number = query.page.unwrap_or(0);
    let total_elements = items.len();
    let total_pages = total_elements.div_ceil(size);
    let content: Vec<T> = items.into_iter().skip(number.saturating_mul(size)).take(size).collect();
    Page {
        content,
        first: number == 0,
        last: number + 1 >= total_pages,
        number,
        size,
        total_elements,
        total_pages,
    }
}

/// Great-circle distance in kilometres.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let (lat1, lng1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lng2) = (to.0.to_radians(), to.1.to_radians());
    let a = ((lat2 - lat1) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lng2 - lng1) / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

fn locate(facility: &Facility, query: &PageQuery) -> Facility {
    let mut facility = facility.clone();
    facility.distance = query
        .origin()
        .map(|origin| haversine_km(origin, (facility.latitude, facility.longitude)));
    facility
}

fn expand(db: &Catalog, record: &ActivityRecord, query: &PageQuery) -> Option<Activity> {
    let facility = db.facilities.iter().find(|f| f.id == record.facility_id)?;
    let activity_type = db.types.iter().find(|t| t.id == record.type_id)?;
    let category = db
        .categories
        .iter()
        .find(|c| c.id == activity_type.category)
        .map(|c| c.title.clone())
        .unwrap_or_default();
    Some(Activity {
        id: record.id,
        title: record.title.clone(),
        category,
        reservation_url: record.reservation_url.clone(),
        is_available: record.is_available,
        start_time: record.start_time.clone(),
        end_time: record.end_time.clone(),
        min_age: record.min_age,
        max_age: record.max_age,
        last_updated: record.last_updated.clone(),
        facility: locate(facility, query),
    })
}

fn activities_where(
    db: &Catalog,
    query: &PageQuery,
    keep: impl Fn(&ActivityRecord) -> bool,
) -> Vec<Activity> {
    db.activities
        .iter()
        .filter(|a| keep(a))
        .filter_map(|a| expand(db, a, query))
        .collect()
}

fn type_popularity(db: &Catalog, type_id: i64) -> usize {
    db.activities.iter().filter(|a| a.type_id == type_id).count()
}

async fn list_categories(State(db): State<Db>, Query(query): Query<PageQuery>) -> Json<Page<Category>> {
    Json(paginate(db.categories.clone(), &query))
}

async fn types_by_category(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<ActivityType>>, StatusCode> {
    if !db.categories.iter().any(|c| c.id == id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let types = db.types.iter().filter(|t| t.category == id).cloned().collect();
    Ok(Json(paginate(types, &query)))
}

async fn list_types(State(db): State<Db>, Query(query): Query<PageQuery>) -> Json<Page<ActivityType>> {
    let mut types = db.types.clone();
    if query.sort.as_deref() == Some("popular") {
        types.sort_by_key(|t| std::cmp::Reverse(type_popularity(&db, t.id)));
    }
    Json(paginate(types, &query))
}

async fn activities_by_type(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Activity>>, StatusCode> {
    if !db.types.iter().any(|t| t.id == id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let activities = activities_where(&db, &query, |a| a.type_id == id);
    Ok(Json(paginate(activities, &query)))
}

async fn get_activity(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Activity>, StatusCode> {
    db.activities
        .iter()
        .find(|a| a.id == id)
        .and_then(|a| expand(&db, a, &query))
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn list_facilities(
    State(db): State<Db>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Facility>>, StatusCode> {
    let mut facilities: Vec<Facility> = db.facilities.iter().map(|f| locate(f, &query)).collect();
    match query.sort.as_deref() {
        None | Some("title") => facilities.sort_by(|a, b| a.title.cmp(&b.title)),
        Some("distance") => facilities.sort_by(|a, b| {
            a.distance
                .unwrap_or(f64::INFINITY)
                .total_cmp(&b.distance.unwrap_or(f64::INFINITY))
        }),
        Some(other) => {
            debug!(sort = other, "unsupported facility sort");
            return Err(StatusCode::BAD_REQUEST);
        }
    }
    Ok(Json(paginate(facilities, &query)))
}

async fn get_facility(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Facility>, StatusCode> {
    db.facilities
        .iter()
        .find(|f| f.id == id)
        .map(|f| Json(locate(f, &query)))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn types_by_facility(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<ActivityType>>, StatusCode> {
    if !db.facilities.iter().any(|f| f.id == id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let types = db
        .types
        .iter()
        .filter(|t| {
            db.activities
                .iter()
                .any(|a| a.facility_id == id && a.type_id == t.id)
        })
        .cloned()
        .collect();
    Ok(Json(paginate(types, &query)))
}

async fn activities_by_facility_and_type(
    State(db): State<Db>,
    Path((id, type_id)): Path<(i64, i64)>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Activity>>, StatusCode> {
    if !db.facilities.iter().any(|f| f.id == id) || !db.types.iter().any(|t| t.id == type_id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let activities = activities_where(&db, &query, |a| a.facility_id == id && a.type_id == type_id);
    Ok(Json(paginate(activities, &query)))
}
