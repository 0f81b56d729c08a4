//! One pipeline per intent kind.
//!
//! # Design
//! Every pipeline follows the same stages: build a request from the run's
//! query snapshot, fetch, map, emit. Composite pipelines repeat
//! fetch-map-emit strictly in sequence, emitting each intermediate signal
//! before the next fetch starts. Ids needed by later stages come from the
//! intent, never from a fetched payload.
//!
//! Pipelines do not emit `Started` or a terminal event themselves; the
//! dispatcher owns the lifecycle. A failed stage returns its error with `?`
//! and the remaining stages never run.

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::client::ActiveClient;
use crate::dispatcher::Emitter;
use crate::error::ApiError;
use crate::geolocation::Geolocator;
use crate::http::{HttpRequest, Transport};
use crate::mappers::{
    map_activity, map_category, map_content, map_facility, map_pagination, map_type,
};
use crate::query::{LocationState, QueryParams};
use crate::signal::{Intent, Signal, DEFAULT_FACILITY_SORT};
use crate::types::{Activity, Pagination};

const TYPES_PAGE_SIZE: u32 = 10_000;
const FACILITY_TYPES_PAGE_SIZE: u32 = 1_000;
const ACTIVITIES_PAGE_SIZE: u32 = 100_000;
const FACILITIES_PAGE_SIZE: u32 = 20;

/// Immutable per-run context: the query snapshot taken when the run started
/// and the token that cancels it.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub params: QueryParams,
    pub token: CancellationToken,
}

impl RunContext {
    pub fn new(params: QueryParams) -> Self {
        Self {
            params,
            token: CancellationToken::new(),
        }
    }

    pub fn with_token(params: QueryParams, token: CancellationToken) -> Self {
        Self { params, token }
    }
}

/// The collaborators every pipeline needs.
pub struct Pipelines {
    client: ActiveClient,
    transport: Arc<dyn Transport>,
    geolocator: Arc<dyn Geolocator>,
    location: LocationState,
}

impl Pipelines {
    pub fn new(
        client: ActiveClient,
        transport: Arc<dyn Transport>,
        geolocator: Arc<dyn Geolocator>,
        location: LocationState,
    ) -> Self {
        Self {
            client,
            transport,
            geolocator,
            location,
        }
    }

    pub fn location(&self) -> &LocationState {
        &self.location
    }

    pub async fn run(&self, intent: Intent, ctx: &RunContext, emit: &Emitter) -> Result<(), ApiError> {
        match intent {
            Intent::GetLocation => self.get_location(ctx, emit).await,
            Intent::FetchAllCategories => self.fetch_all_categories(ctx, emit).await,
            Intent::FetchPopularTypes => self.fetch_popular_types(ctx, emit).await,
            Intent::FetchTypesByCategory { category_id } => {
                self.fetch_types_by_category(ctx, emit, category_id).await
            }
            Intent::FetchActivitiesByType { type_id, .. } => {
                let (activities, pagination) = self.activities_by_type(ctx, type_id).await?;
                emit.signal(Signal::SetActivities {
                    type_id,
                    activities,
                    pagination,
                })
            }
            Intent::FetchActivitiesByPopularType { type_id, .. } => {
                let (activities, pagination) = self.activities_by_type(ctx, type_id).await?;
                emit.signal(Signal::SetActivitiesForPopularType {
                    type_id,
                    activities,
                    pagination,
                })
            }
            Intent::FetchPopularTypesAndActivities { type_id, .. } => {
                self.fetch_popular_types(ctx, emit).await?;
                let (activities, pagination) = self.activities_by_type(ctx, type_id).await?;
                emit.signal(Signal::SetActivitiesForPopularType {
                    type_id,
                    activities,
                    pagination,
                })
            }
            Intent::FetchAllFacilities { page, sort_by } => {
                let params = ctx
                    .params
                    .clone()
                    .with("page", page)
                    .with("size", FACILITIES_PAGE_SIZE)
                    .with("sort", &sort_by);
                self.fetch_facilities(ctx, emit, &params, sort_by).await
            }
            Intent::FetchFacilityById { facility_id } => {
                let json = self
                    .fetch(ctx, self.client.build_facility(facility_id, &ctx.params))
                    .await?;
                emit.signal(Signal::SetFacility {
                    facility: map_facility(&json),
                })
            }
            Intent::FetchFacilityAndTypesByFacility { id } => {
                self.fetch_facility_and_types(ctx, emit, id).await
            }
            Intent::FetchTypesByFacility { facility_id } => {
                self.fetch_types_in_facility(ctx, emit, facility_id).await
            }
            Intent::FetchAllFacilitiesAndTypesByFacility { facility_id } => {
                let params = ctx.params.clone().with("size", FACILITIES_PAGE_SIZE);
                self.fetch_facilities(ctx, emit, &params, DEFAULT_FACILITY_SORT.to_string())
                    .await?;
                self.fetch_types_in_facility(ctx, emit, facility_id).await
            }
            Intent::FetchActivitiesByFacilityAndType {
                facility_id,
                category_name,
                type_id,
                page,
            } => {
                let params = ctx.params.clone().with("page", page);
                self.fetch_activities_in_facility(ctx, emit, &params, facility_id, category_name, type_id)
                    .await
            }
            Intent::FetchAllFacilitiesTypesAndActivities {
                facility_id,
                category_name,
                type_id,
            } => {
                let params = ctx.params.clone();
                self.fetch_facilities(ctx, emit, &params, DEFAULT_FACILITY_SORT.to_string())
                    .await?;
                self.fetch_types_in_facility(ctx, emit, facility_id).await?;
                self.fetch_activities_in_facility(ctx, emit, &params, facility_id, category_name, type_id)
                    .await
            }
        }
    }

    /// Resolves one activity straight to the caller. Nothing is emitted.
    pub async fn fetch_activity_by_id(&self, ctx: &RunContext, id: i64) -> Result<Activity, ApiError> {
        let json = self.fetch(ctx, self.client.build_activity(id, &ctx.params)).await?;
        Ok(map_activity(&json))
    }

    async fn fetch(
        &self,
        ctx: &RunContext,
        request: Result<HttpRequest, ApiError>,
    ) -> Result<Value, ApiError> {
        let request = request?;
        tokio::select! {
            biased;
            _ = ctx.token.cancelled() => Err(ApiError::Cancelled),
            result = self.client.fetch(self.transport.as_ref(), request) => result,
        }
    }

    async fn get_location(&self, ctx: &RunContext, emit: &Emitter) -> Result<(), ApiError> {
        let position = tokio::select! {
            biased;
            _ = ctx.token.cancelled() => return Err(ApiError::Cancelled),
            position = self.geolocator.current_position() => position,
        };
        let location = match position {
            Ok(location) => Some(location),
            Err(ApiError::GeolocationUnavailable) => None,
            Err(e) => return Err(e),
        };
        emit.commit_signal(|| self.location.set(location), Signal::SetLocation { location })
    }

    async fn fetch_all_categories(&self, ctx: &RunContext, emit: &Emitter) -> Result<(), ApiError> {
        let json = self.fetch(ctx, self.client.build_categories(&ctx.params)).await?;
        let categories = map_content(&json, map_category)?;
        emit.signal(Signal::SetCategories { categories })
    }

    async fn fetch_popular_types(&self, ctx: &RunContext, emit: &Emitter) -> Result<(), ApiError> {
        let params = ctx.params.clone().with("sort", "popular");
        let json = self.fetch(ctx, self.client.build_types(&params)).await?;
        let types = map_content(&json, map_type)?;
        emit.signal(Signal::SetPopularTypes { types })
    }

    async fn fetch_types_by_category(
        &self,
        ctx: &RunContext,
        emit: &Emitter,
        category_id: i64,
    ) -> Result<(), ApiError> {
        let params = ctx.params.clone().with("size", TYPES_PAGE_SIZE);
        let json = self
            .fetch(ctx, self.client.build_types_by_category(category_id, &params))
            .await?;
        let types = map_content(&json, map_type)?;
        emit.signal(Signal::SetTypes {
            category_id,
            types,
            pagination: map_pagination(&json),
        })
    }

    /// A type's activities come back as one oversized page; the intent's
    /// page number is not sent.
    async fn activities_by_type(
        &self,
        ctx: &RunContext,
        type_id: i64,
    ) -> Result<(Vec<Activity>, Pagination), ApiError> {
        let params = ctx.params.clone().with("size", ACTIVITIES_PAGE_SIZE);
        let json = self
            .fetch(ctx, self.client.build_activities_by_type(type_id, &params))
            .await?;
        let activities = map_content(&json, map_activity)?;
        Ok((activities, map_pagination(&json)))
    }

    async fn fetch_facilities(
        &self,
        ctx: &RunContext,
        emit: &Emitter,
        params: &QueryParams,
        sort_by: String,
    ) -> Result<(), ApiError> {
        let json = self.fetch(ctx, self.client.build_facilities(params)).await?;
        let facilities = map_content(&json, map_facility)?;
        emit.signal(Signal::SetFacilities {
            facilities,
            pagination: Some(map_pagination(&json)),
            sort_by,
        })
    }

    async fn fetch_facility_and_types(
        &self,
        ctx: &RunContext,
        emit: &Emitter,
        facility_id: i64,
    ) -> Result<(), ApiError> {
        let json = self
            .fetch(ctx, self.client.build_facility(facility_id, &ctx.params))
            .await?;
        emit.signal(Signal::SetFacilities {
            facilities: vec![map_facility(&json)],
            pagination: None,
            sort_by: DEFAULT_FACILITY_SORT.to_string(),
        })?;

        let params = ctx.params.clone().with("size", FACILITY_TYPES_PAGE_SIZE);
        let json = self
            .fetch(ctx, self.client.build_types_by_facility(facility_id, &params))
            .await?;
        // A facility without types answers with no content at all.
        let types = map_content(&json, map_type).unwrap_or_default();
        emit.signal(Signal::SetTypesInFacility { facility_id, types })
    }

    async fn fetch_types_in_facility(
        &self,
        ctx: &RunContext,
        emit: &Emitter,
        facility_id: i64,
    ) -> Result<(), ApiError> {
        let params = ctx.params.clone().with("size", TYPES_PAGE_SIZE);
        let json = self
            .fetch(ctx, self.client.build_types_by_facility(facility_id, &params))
            .await?;
        let types = map_content(&json, map_type)?;
        emit.signal(Signal::SetTypesInFacility { facility_id, types })
    }

    async fn fetch_activities_in_facility(
        &self,
        ctx: &RunContext,
        emit: &Emitter,
        params: &QueryParams,
        facility_id: i64,
        category_name: String,
        type_id: i64,
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .build_activities_by_facility_and_type(facility_id, type_id, params);
        let json = self.fetch(ctx, request).await?;
        let activities = map_content(&json, map_activity)?;
        emit.signal(Signal::SetActivitiesInFacilityWithType {
            facility_id,
            category_name,
            type_id,
            activities,
            pagination: map_pagination(&json),
        })
    }
}
