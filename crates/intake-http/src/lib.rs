#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]

//! HTTP side of the upload intake: the network [`intake_core::Transport`] and a
//! small client for the endpoint's auxiliary routes.
//!
//! # Design
//! - One `reqwest::Client` per adapter with a client-wide timeout.
//! - Upload failures never escape as errors; they become rejected outcomes.
//! - Auxiliary routes (`/health`, `/files`) return `HttpError` instead.
//!
//! Layout: `transport.rs` (multipart upload), `endpoint.rs` (health + listing),
//! `error.rs` (client errors), `routes.rs` (route joining).

pub mod endpoint;
pub mod error;
pub mod transport;
mod routes;

pub use endpoint::{EndpointClient, FileListing, HealthStatus, StoredFile};
pub use error::{HttpError, HttpResult};
pub use transport::{DEFAULT_REQUEST_TIMEOUT, HttpTransport, UPLOAD_FIELD};
