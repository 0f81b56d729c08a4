//! Request builder and response parser for the activeto API.
//!
//! # Design
//! `ActiveClient` holds only its [`ClientConfig`] and carries no mutable
//! state between calls. Every resource has a `build_*` method producing an
//! `HttpRequest`; all responses go through [`ActiveClient::parse_json`].
//! [`ActiveClient::fetch`] ties the two together over a [`Transport`].
//!
//! URLs are formed by concatenating path segments verbatim. The normalized
//! config puts a leading `/` on every resource path, and the builders insert
//! the `/` before each id themselves.

use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::query::QueryParams;

#[derive(Debug, Clone)]
pub struct ActiveClient {
    config: ClientConfig,
}

impl ActiveClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_config(ClientConfig::new(base_url))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config: config.normalized(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Joins `segments` as-is and appends `params` as the query string.
    pub fn build_fetch(
        &self,
        segments: &[&str],
        params: Option<&QueryParams>,
    ) -> Result<HttpRequest, ApiError> {
        let mut url = segments.concat();
        if let Some(params) = params.filter(|p| !p.is_empty()) {
            url.push('?');
            url.push_str(&params.to_query_string());
        }
        url::Url::parse(&url).map_err(|e| ApiError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: vec![("accept".to_string(), "application/json".to_string())],
        })
    }

    pub fn build_categories(&self, params: &QueryParams) -> Result<HttpRequest, ApiError> {
        let c = &self.config;
        self.build_fetch(&[c.base_url.as_str(), c.category_path.as_str()], Some(params))
    }

    pub fn build_types(&self, params: &QueryParams) -> Result<HttpRequest, ApiError> {
        let c = &self.config;
        self.build_fetch(&[c.base_url.as_str(), c.type_path.as_str()], Some(params))
    }

    pub fn build_types_by_category(
        &self,
        category_id: i64,
        params: &QueryParams,
    ) -> Result<HttpRequest, ApiError> {
        let c = &self.config;
        let id = category_id.to_string();
        self.build_fetch(
            &[c.base_url.as_str(), c.category_path.as_str(), "/", id.as_str(), c.type_path.as_str()],
            Some(params),
        )
    }

    pub fn build_activities_by_type(
        &self,
        type_id: i64,
        params: &QueryParams,
    ) -> Result<HttpRequest, ApiError> {
        let c = &self.config;
        let id = type_id.to_string();
        self.build_fetch(
            &[c.base_url.as_str(), c.type_path.as_str(), "/", id.as_str(), c.activity_path.as_str()],
            Some(params),
        )
    }

    pub fn build_activity(&self, id: i64, params: &QueryParams) -> Result<HttpRequest, ApiError> {
        let c = &self.config;
        let id = id.to_string();
        self.build_fetch(&[c.base_url.as_str(), c.activity_path.as_str(), "/", id.as_str()], Some(params))
    }

    pub fn build_facilities(&self, params: &QueryParams) -> Result<HttpRequest, ApiError> {
        let c = &self.config;
        self.build_fetch(&[c.base_url.as_str(), c.facility_path.as_str()], Some(params))
    }

    pub fn build_facility(&self, id: i64, params: &QueryParams) -> Result<HttpRequest, ApiError> {
        let c = &self.config;
        let id = id.to_string();
        self.build_fetch(&[c.base_url.as_str(), c.facility_path.as_str(), "/", id.as_str()], Some(params))
    }

    pub fn build_types_by_facility(
        &self,
        facility_id: i64,
        params: &QueryParams,
    ) -> Result<HttpRequest, ApiError> {
        let c = &self.config;
        let id = facility_id.to_string();
        self.build_fetch(
            &[c.base_url.as_str(), c.facility_path.as_str(), "/", id.as_str(), c.type_path.as_str()],
            Some(params),
        )
    }

    pub fn build_activities_by_facility_and_type(
        &self,
        facility_id: i64,
        type_id: i64,
        params: &QueryParams,
    ) -> Result<HttpRequest, ApiError> {
        let c = &self.config;
        let fid = facility_id.to_string();
        let tid = type_id.to_string();
        self.build_fetch(
            &[
                c.base_url.as_str(),
                c.facility_path.as_str(),
                "/",
                fid.as_str(),
                c.type_path.as_str(),
                "/",
                tid.as_str(),
                c.activity_path.as_str(),
            ],
            Some(params),
        )
    }

    pub fn parse_json(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_status(&response, 200)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// One GET round-trip: execute `request` and decode the JSON body.
    pub async fn fetch(
        &self,
        transport: &dyn Transport,
        request: HttpRequest,
    ) -> Result<Value, ApiError> {
        debug!(url = %request.url, method = request.method.as_str(), "fetching");
        let response = transport.execute(request).await?;
        self.parse_json(response)
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ActiveClient {
        ActiveClient::new("http://localhost:3000")
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_fetch_concatenates_segments_verbatim() {
        let req = client()
            .build_fetch(&["http://localhost:3000", "/types", "/", "4", "/activities"], None)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/types/4/activities");
    }

    #[test]
    fn build_types_by_category_carries_location_and_size() {
        let params = QueryParams::for_location(None).with("size", 10000);
        let req = client().build_types_by_category(5, &params).unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/categories/5/types?lat=&lng=&size=10000"
        );
    }

    #[test]
    fn build_activities_by_facility_and_type_nests_both_ids() {
        let req = client()
            .build_activities_by_facility_and_type(7, 12, &QueryParams::new().with("page", 1))
            .unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/facilities/7/types/12/activities?page=1"
        );
    }

    #[test]
    fn build_activity_and_facility_paths() {
        let c = client();
        let empty = QueryParams::new();
        assert_eq!(c.build_activity(3, &empty).unwrap().url, "http://localhost:3000/activities/3");
        assert_eq!(c.build_facility(7, &empty).unwrap().url, "http://localhost:3000/facilities/7");
        assert_eq!(
            c.build_types_by_facility(7, &empty).unwrap().url,
            "http://localhost:3000/facilities/7/types"
        );
    }

    #[test]
    fn scheme_less_base_is_normalized() {
        let c = ActiveClient::new("api.activeto.mollyzhang.dev/");
        let req = c.build_categories(&QueryParams::new()).unwrap();
        assert_eq!(req.url, "https://api.activeto.mollyzhang.dev/categories");
    }

    #[test]
    fn invalid_url_is_rejected() {
        let err = client().build_fetch(&["not a url"], None).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
    }

    #[test]
    fn parse_json_success() {
        let json = client().parse_json(ok(r#"{"content":[],"first":true}"#)).unwrap();
        assert_eq!(json["first"], true);
    }

    #[test]
    fn parse_json_not_found() {
        let response = HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: String::new(),
        };
        assert!(matches!(client().parse_json(response), Err(ApiError::NotFound)));
    }

    #[test]
    fn parse_json_server_error() {
        let response = HttpResponse {
            status: 500,
            headers: Vec::new(),
            body: "internal error".to_string(),
        };
        let err = client().parse_json(response).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    }

    #[test]
    fn parse_json_bad_body() {
        let err = client().parse_json(ok("not json")).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
