//! Reference state container.
//!
//! # Design
//! `AppState` folds [`PipelineEvent`]s into the data the UI renders. Every
//! signal replaces the slot it names wholesale; nothing is merged. The busy
//! flag counts in-flight runs so overlapping pipelines keep it raised until
//! the last one ends, whether it succeeded, failed or was superseded.
//! Failures land in `last_error`, separate from the data slots.

use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::error::ApiError;
use crate::signal::{IntentKind, PipelineEvent, Signal};
use crate::types::{Activity, Category, Facility, Location, Pagination, Type};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacilityListing {
    pub facilities: Vec<Facility>,
    pub pagination: Option<Pagination>,
    pub sort_by: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacilityTypeActivities {
    pub category_name: String,
    pub activities: Paged<Activity>,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub location: Option<Location>,
    pub categories: Vec<Category>,
    pub popular_types: Vec<Type>,
    pub types_by_category: HashMap<i64, Paged<Type>>,
    pub activities_by_type: HashMap<i64, Paged<Activity>>,
    pub activities_for_popular_type: HashMap<i64, Paged<Activity>>,
    pub facilities: FacilityListing,
    pub facility: Option<Facility>,
    pub types_in_facility: HashMap<i64, Vec<Type>>,
    pub activities_in_facility: HashMap<(i64, i64), FacilityTypeActivities>,
    pub last_error: Option<(IntentKind, ApiError)>,
    in_flight: usize,
}

impl AppState {
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn apply(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::Started(_) => self.in_flight += 1,
            PipelineEvent::Succeeded(_) | PipelineEvent::Cancelled(_) => self.end_run(),
            PipelineEvent::Failed(kind, error) => {
                self.end_run();
                self.last_error = Some((kind, error));
            }
            PipelineEvent::Signal(signal) => self.apply_signal(signal),
        }
    }

    fn end_run(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    fn apply_signal(&mut self, signal: Signal) {
        match signal {
            Signal::SetLocation { location } => self.location = location,
            Signal::SetCategories { categories } => self.categories = categories,
            Signal::SetPopularTypes { types } => self.popular_types = types,
            Signal::SetTypes {
                category_id,
                types,
                pagination,
            } => {
                self.types_by_category.insert(
                    category_id,
                    Paged {
                        items: types,
                        pagination: Some(pagination),
                    },
                );
            }
            Signal::SetActivities {
                type_id,
                activities,
                pagination,
            } => {
                self.activities_by_type.insert(
                    type_id,
                    Paged {
                        items: activities,
                        pagination: Some(pagination),
                    },
                );
            }
            Signal::SetActivitiesForPopularType {
                type_id,
                activities,
                pagination,
            } => {
                self.activities_for_popular_type.insert(
                    type_id,
                    Paged {
                        items: activities,
                        pagination: Some(pagination),
                    },
                );
            }
            Signal::SetFacilities {
                facilities,
                pagination,
                sort_by,
            } => {
                self.facilities = FacilityListing {
                    facilities,
                    pagination,
                    sort_by,
                };
            }
            Signal::SetFacility { facility } => self.facility = Some(facility),
            Signal::SetTypesInFacility { facility_id, types } => {
                self.types_in_facility.insert(facility_id, types);
            }
            Signal::SetActivitiesInFacilityWithType {
                facility_id,
                category_name,
                type_id,
                activities,
                pagination,
            } => {
                self.activities_in_facility.insert(
                    (facility_id, type_id),
                    FacilityTypeActivities {
                        category_name,
                        activities: Paged {
                            items: activities,
                            pagination: Some(pagination),
                        },
                    },
                );
            }
        }
    }

    /// Applies every event already waiting on `events` without blocking.
    pub fn drain(&mut self, events: &mut mpsc::UnboundedReceiver<PipelineEvent>) -> usize {
        let mut applied = 0;
        while let Ok(event) = events.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_counts_overlapping_runs() {
        let mut state = AppState::default();
        state.apply(PipelineEvent::Started(IntentKind::FetchAllCategories));
        state.apply(PipelineEvent::Started(IntentKind::FetchPopularTypes));
        assert!(state.is_busy());
        state.apply(PipelineEvent::Succeeded(IntentKind::FetchAllCategories));
        assert!(state.is_busy());
        state.apply(PipelineEvent::Cancelled(IntentKind::FetchPopularTypes));
        assert!(!state.is_busy());
    }

    #[test]
    fn failure_clears_busy_and_records_error() {
        let mut state = AppState::default();
        state.apply(PipelineEvent::Started(IntentKind::FetchFacilityById));
        state.apply(PipelineEvent::Failed(IntentKind::FetchFacilityById, ApiError::NotFound));
        assert!(!state.is_busy());
        assert_eq!(
            state.last_error,
            Some((IntentKind::FetchFacilityById, ApiError::NotFound))
        );
    }

    #[test]
    fn set_types_replaces_previous_entry() {
        let mut state = AppState::default();
        let swim = Type {
            id: Some(1),
            title: Some("Swim".to_string()),
            category_id: Some(5),
        };
        state.apply(PipelineEvent::Signal(Signal::SetTypes {
            category_id: 5,
            types: vec![swim.clone(), swim.clone()],
            pagination: Pagination::default(),
        }));
        state.apply(PipelineEvent::Signal(Signal::SetTypes {
            category_id: 5,
            types: vec![swim],
            pagination: Pagination::default(),
        }));
        assert_eq!(state.types_by_category[&5].items.len(), 1);
    }

    #[test]
    fn drain_applies_pending_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(PipelineEvent::Signal(Signal::SetLocation {
            location: Some(Location { lat: 43.7, lng: -79.4 }),
        }))
        .unwrap();
        tx.send(PipelineEvent::Signal(Signal::SetCategories { categories: Vec::new() }))
            .unwrap();
        let mut state = AppState::default();
        assert_eq!(state.drain(&mut rx), 2);
        assert_eq!(state.location, Some(Location { lat: 43.7, lng: -79.4 }));
    }
}
