//! Client core for the SparkPost Message Events API.
//!
//! # Overview
//! Builds authenticated `HttpRequest` values, checks `HttpResponse` values
//! and decodes the polymorphic event records the API returns into the
//! closed `Event` type. Network IO is delegated to a `Transport`; the
//! `blocking` feature (on by default) provides one backed by `ureq`.
//!
//! # Design
//! - Handles (`ApiClient`, `MessageEvents`) hold only config; every call
//!   returns its own result and nothing is cached on the handle.
//! - Each operation is split into `build_*` and `parse_*` so the IO
//!   boundary is explicit. `MessageEvents::samples` chains them through a
//!   transport.
//! - Records are dispatched on their `type` field through a fixed registry.
//!   Unknown types are skipped and reported in `EventBatch::skipped`; a
//!   record whose type cannot be found, or whose payload does not fit its
//!   type, fails the whole batch.

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod events;
pub mod http;
pub mod message_events;
pub mod registry;
#[cfg(feature = "blocking")]
pub mod transport;

pub use client::{assert_json, check_response, parse_json, ApiClient};
pub use config::Config;
pub use decode::{decode_envelope, decode_events, EventBatch, SkippedRecord};
pub use error::{ApiError, ErrorDetail};
pub use events::Event;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use message_events::MessageEvents;
#[cfg(feature = "blocking")]
pub use transport::UreqTransport;
