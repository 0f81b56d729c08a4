use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Activity, ActivityType, Category, Facility, Page};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_value(response: axum::response::Response) -> serde_json::Value {
    let bytes: bytes::Bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- categories ---

#[tokio::test]
async fn list_categories_is_a_page_envelope() {
    let resp = app().oneshot(get("/categories")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_value(resp).await;
    assert_eq!(json["first"], true);
    assert_eq!(json["last"], true);
    assert_eq!(json["number"], 0);
    assert_eq!(json["totalElements"], 3);
    let categories: Vec<Category> = serde_json::from_value(json["content"].clone()).unwrap();
    assert_eq!(categories[0].title, "Aquatics");
}

#[tokio::test]
async fn types_by_category_filters_on_category() {
    let resp = app().oneshot(get("/categories/2/types?lat=&lng=&size=10000")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: Page<ActivityType> = body_json(resp).await;
    assert_eq!(page.content.len(), 2);
    assert!(page.content.iter().all(|t| t.category == 2));
}

#[tokio::test]
async fn types_by_unknown_category_returns_404() {
    let resp = app().oneshot(get("/categories/99/types")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- types ---

#[tokio::test]
async fn popular_types_sorted_by_activity_count() {
    let resp = app().oneshot(get("/types?sort=popular")).await.unwrap();

    let page: Page<ActivityType> = body_json(resp).await;
    let ids: Vec<i64> = page.content.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![4, 1, 3, 2, 5]);
}

#[tokio::test]
async fn activities_by_type_embed_facility() {
    let resp = app().oneshot(get("/types/1/activities?size=100000")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: Page<Activity> = body_json(resp).await;
    assert_eq!(page.content.len(), 3);
    assert_eq!(page.content[0].facility.id, 7);
    assert_eq!(page.content[0].category, "Aquatics");
}

// --- activities ---

#[tokio::test]
async fn get_activity_by_id() {
    let resp = app().oneshot(get("/activities/5")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_value(resp).await;
    assert_eq!(json["title"], "Shinny 18+");
    assert_eq!(json["reservationURL"], "https://toronto.example/reserve/5");
    assert_eq!(json["facility"]["address"]["postalCode"], "M5H 2N1");
}

#[tokio::test]
async fn get_activity_not_found() {
    let resp = app().oneshot(get("/activities/999")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_activity_bad_id_returns_400() {
    let resp = app().oneshot(get("/activities/not-a-number")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- facilities ---

#[tokio::test]
async fn facilities_without_location_have_no_distance() {
    let resp = app().oneshot(get("/facilities?lat=&lng=&page=0&size=20&sort=title")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: Page<Facility> = body_json(resp).await;
    assert_eq!(page.content.len(), 4);
    assert!(page.content.iter().all(|f| f.distance.is_none()));
    let titles: Vec<&str> = page.content.iter().map(|f| f.title.as_str()).collect();
    let mut sorted = titles.clone();
    sorted.sort();
    assert_eq!(titles, sorted);
}

#[tokio::test]
async fn facilities_sorted_by_distance_from_location() {
    let resp = app()
        .oneshot(get("/facilities?lat=43.7386&lng=-79.2114&sort=distance"))
        .await
        .unwrap();

    let page: Page<Facility> = body_json(resp).await;
    assert_eq!(page.content[0].id, 9);
    assert_eq!(page.content[0].distance, Some(0.0));
    let distances: Vec<f64> = page.content.iter().map(|f| f.distance.unwrap()).collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn facilities_paginate() {
    let resp = app().oneshot(get("/facilities?page=1&size=3")).await.unwrap();

    let page: Page<Facility> = body_json(resp).await;
    assert_eq!(page.content.len(), 1);
    assert!(!page.first);
    assert!(page.last);
    assert_eq!(page.number, 1);
    assert_eq!(page.total_pages, 2);
}

#[tokio::test]
async fn facilities_unknown_sort_returns_400() {
    let resp = app().oneshot(get("/facilities?sort=rating")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_facility_not_found() {
    let resp = app().oneshot(get("/facilities/1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn types_by_facility_only_lists_offered_types() {
    let resp = app().oneshot(get("/facilities/7/types?size=1000")).await.unwrap();

    let page: Page<ActivityType> = body_json(resp).await;
    let ids: Vec<i64> = page.content.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn activities_by_facility_and_type() {
    let resp = app().oneshot(get("/facilities/8/types/4/activities?page=0")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: Page<Activity> = body_json(resp).await;
    assert_eq!(page.content.len(), 2);
    assert!(page.content.iter().all(|a| a.facility.id == 8 && a.title == "Family Skate"));
}

#[tokio::test]
async fn activities_by_unknown_type_in_facility_returns_404() {
    let resp = app().oneshot(get("/facilities/8/types/42/activities")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
