//! Inbound intents and outbound signals.
//!
//! # Design
//! An [`Intent`] is what the UI asks for. Each intent belongs to an
//! [`IntentKind`], and the kind decides the concurrency policy: most kinds
//! switch to the latest intent, the two facility-listing kinds queue.
//!
//! A pipeline run reports through [`PipelineEvent`]s: one `Started`, zero or
//! more `Signal`s carrying new state, then exactly one of `Succeeded`,
//! `Failed` or `Cancelled`. Signals mirror the state container's setters.

use crate::error::ApiError;
use crate::types::{Activity, Category, Facility, Location, Pagination, Type};

/// Sort key the combined facility pipelines report with their listings.
pub const DEFAULT_FACILITY_SORT: &str = "title";

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    GetLocation,
    FetchAllCategories,
    FetchPopularTypes,
    FetchTypesByCategory {
        category_id: i64,
    },
    FetchActivitiesByType {
        type_id: i64,
        page: u32,
    },
    FetchActivitiesByPopularType {
        type_id: i64,
        page: u32,
    },
    FetchPopularTypesAndActivities {
        type_id: i64,
        page: u32,
    },
    FetchAllFacilities {
        page: u32,
        sort_by: String,
    },
    FetchFacilityById {
        facility_id: i64,
    },
    FetchFacilityAndTypesByFacility {
        id: i64,
    },
    FetchTypesByFacility {
        facility_id: i64,
    },
    FetchAllFacilitiesAndTypesByFacility {
        facility_id: i64,
    },
    FetchActivitiesByFacilityAndType {
        facility_id: i64,
        category_name: String,
        type_id: i64,
        page: u32,
    },
    FetchAllFacilitiesTypesAndActivities {
        facility_id: i64,
        category_name: String,
        type_id: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    GetLocation,
    FetchAllCategories,
    FetchPopularTypes,
    FetchTypesByCategory,
    FetchActivitiesByType,
    FetchActivitiesByPopularType,
    FetchPopularTypesAndActivities,
    FetchAllFacilities,
    FetchFacilityById,
    FetchFacilityAndTypesByFacility,
    FetchTypesByFacility,
    FetchAllFacilitiesAndTypesByFacility,
    FetchActivitiesByFacilityAndType,
    FetchAllFacilitiesTypesAndActivities,
}

/// How a lane treats a new intent while a run of the same kind is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Cancel the in-flight run and start the new one.
    SwitchToLatest,
    /// Let the in-flight run finish, then run the new one.
    Queue,
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::GetLocation => IntentKind::GetLocation,
            Intent::FetchAllCategories => IntentKind::FetchAllCategories,
            Intent::FetchPopularTypes => IntentKind::FetchPopularTypes,
            Intent::FetchTypesByCategory { .. } => IntentKind::FetchTypesByCategory,
            Intent::FetchActivitiesByType { .. } => IntentKind::FetchActivitiesByType,
            Intent::FetchActivitiesByPopularType { .. } => IntentKind::FetchActivitiesByPopularType,
            Intent::FetchPopularTypesAndActivities { .. } => {
                IntentKind::FetchPopularTypesAndActivities
            }
            Intent::FetchAllFacilities { .. } => IntentKind::FetchAllFacilities,
            Intent::FetchFacilityById { .. } => IntentKind::FetchFacilityById,
            Intent::FetchFacilityAndTypesByFacility { .. } => {
                IntentKind::FetchFacilityAndTypesByFacility
            }
            Intent::FetchTypesByFacility { .. } => IntentKind::FetchTypesByFacility,
            Intent::FetchAllFacilitiesAndTypesByFacility { .. } => {
                IntentKind::FetchAllFacilitiesAndTypesByFacility
            }
            Intent::FetchActivitiesByFacilityAndType { .. } => {
                IntentKind::FetchActivitiesByFacilityAndType
            }
            Intent::FetchAllFacilitiesTypesAndActivities { .. } => {
                IntentKind::FetchAllFacilitiesTypesAndActivities
            }
        }
    }
}

impl IntentKind {
    pub fn policy(self) -> Policy {
        match self {
            IntentKind::FetchAllFacilities | IntentKind::FetchAllFacilitiesAndTypesByFacility => {
                Policy::Queue
            }
            _ => Policy::SwitchToLatest,
        }
    }
}

/// New state for the container. Every variant replaces what it names.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    SetLocation {
        location: Option<Location>,
    },
    SetCategories {
        categories: Vec<Category>,
    },
    SetPopularTypes {
        types: Vec<Type>,
    },
    SetTypes {
        category_id: i64,
        types: Vec<Type>,
        pagination: Pagination,
    },
    SetActivities {
        type_id: i64,
        activities: Vec<Activity>,
        pagination: Pagination,
    },
    SetActivitiesForPopularType {
        type_id: i64,
        activities: Vec<Activity>,
        pagination: Pagination,
    },
    SetFacilities {
        facilities: Vec<Facility>,
        pagination: Option<Pagination>,
        sort_by: String,
    },
    SetFacility {
        facility: Facility,
    },
    SetTypesInFacility {
        facility_id: i64,
        types: Vec<Type>,
    },
    SetActivitiesInFacilityWithType {
        facility_id: i64,
        category_name: String,
        type_id: i64,
        activities: Vec<Activity>,
        pagination: Pagination,
    },
}

/// Lifecycle of one pipeline run, as seen by the state container.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    Started(IntentKind),
    Signal(Signal),
    Succeeded(IntentKind),
    Failed(IntentKind, ApiError),
    Cancelled(IntentKind),
}
