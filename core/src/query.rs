//! Query parameters and the shared location they are derived from.
//!
//! # Design
//! [`LocationState`] is the only shared mutable value in the client. It is a
//! `watch` channel so readers always see the latest location without locking
//! out writers. Pipelines never read it mid-run: they take one
//! [`QueryParams`] snapshot when they start and extend that copy per request
//! (`page`, `size`, `sort`), so every chained fetch in a run is scoped to the
//! same place.

use tokio::sync::watch;
use url::form_urlencoded;

use crate::types::Location;

/// Ordered key/value pairs. `set` replaces an existing key in place, so
/// `lat` and `lng` keep their position ahead of per-request extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters for `location`: both keys numeric, or both empty when the
    /// location is unknown.
    pub fn for_location(location: Option<Location>) -> Self {
        let (lat, lng) = match location {
            Some(loc) => (loc.lat.to_string(), loc.lng.to_string()),
            None => (String::new(), String::new()),
        };
        Self::new().with("lat", lat).with("lng", lng)
    }

    pub fn set(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    /// Copy with `key` set. The receiver is consumed, never shared state.
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// Process-wide current location.
#[derive(Debug, Clone)]
pub struct LocationState {
    tx: watch::Sender<Option<Location>>,
}

impl Default for LocationState {
    fn default() -> Self {
        Self::new(None)
    }
}

impl LocationState {
    pub fn new(initial: Option<Location>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> Option<Location> {
        *self.tx.borrow()
    }

    pub fn set(&self, location: Option<Location>) {
        self.tx.send_replace(location);
    }

    /// Immutable parameters for one pipeline run.
    pub fn snapshot(&self) -> QueryParams {
        QueryParams::for_location(self.current())
    }
}
