//! Platform location seam.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::types::Location;

/// One-shot current-position query.
///
/// Implementations return `GeolocationUnavailable` when the platform has no
/// location capability at all, and `GeolocationDenied` when it has one but
/// refuses or fails to produce a fix.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn current_position(&self) -> Result<Location, ApiError>;
}

/// A geolocator that always answers the same way. Useful for hosts that
/// resolve the position themselves (e.g. from a CLI flag) and for tests.
#[derive(Debug, Clone)]
pub struct FixedGeolocator {
    answer: Result<Location, ApiError>,
}

impl FixedGeolocator {
    pub fn at(location: Location) -> Self {
        Self {
            answer: Ok(location),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            answer: Err(ApiError::GeolocationUnavailable),
        }
    }

    pub fn denied(reason: &str) -> Self {
        Self {
            answer: Err(ApiError::GeolocationDenied(reason.to_string())),
        }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Location, ApiError> {
        self.answer.clone()
    }
}
