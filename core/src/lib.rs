//! Data-fetching and state-synchronization core for the activeto client.
//!
//! # Overview
//! UI intents go into a [`Dispatcher`]. Each intent kind runs a pipeline
//! that fetches from the activeto REST API, maps the JSON into domain
//! records, and reports [`PipelineEvent`]s to the state container
//! ([`AppState`] is a ready-made one).
//!
//! # Design
//! - `ActiveClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values; a [`Transport`] does the I/O, so URL composition and decoding
//!   are testable without a network.
//! - Mappers are total and never substitute defaults.
//! - Location lives in a single [`LocationState`]; each run snapshots it once.
//! - Most intent kinds switch to the latest intent, facility listings queue.

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod geolocation;
pub mod http;
pub mod mappers;
pub mod pipeline;
pub mod query;
pub mod signal;
pub mod store;
pub mod types;

pub use client::ActiveClient;
pub use config::ClientConfig;
pub use dispatcher::{Dispatcher, Emitter};
pub use error::ApiError;
pub use geolocation::{FixedGeolocator, Geolocator};
pub use http::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use pipeline::{Pipelines, RunContext};
pub use query::{LocationState, QueryParams};
pub use signal::{Intent, IntentKind, PipelineEvent, Policy, Signal};
pub use store::AppState;
pub use types::{Activity, Address, Category, Facility, Location, Pagination, Type};
