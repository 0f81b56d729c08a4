//! Error types for the activeto client core.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the facility/activity does not exist" from "the server returned an
//! unexpected status." All other non-2xx responses land in `HttpError` with
//! the raw status code and body for debugging.
//!
//! `Cancelled` is internal plumbing for switch-to-latest lanes: a superseded
//! run unwinds with it, and the dispatcher never reports it as a failure.

use thiserror::Error;

/// Errors produced while fetching, decoding, or locating.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The request never completed (connection refused, reset, TLS, ...).
    #[error("network failure: {0}")]
    Network(String),

    /// The response body was not JSON, or not the expected envelope shape.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The composed URL could not be parsed.
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The platform has no location capability.
    #[error("geolocation is unavailable on this platform")]
    GeolocationUnavailable,

    /// The platform refused or failed to produce a position.
    #[error("geolocation failed: {0}")]
    GeolocationDenied(String),

    /// The run was superseded by a newer intent of the same kind.
    #[error("superseded by a newer request")]
    Cancelled,
}
