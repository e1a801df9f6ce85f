#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]

//! Layered configuration for the upload intake.
//!
//! Layout: `model.rs` (typed settings), `defaults.rs` (baseline values),
//! `loader.rs` (YAML + environment + flag layering), `validate.rs` (checks),
//! `error.rs` (`ConfigError`).

mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    ConfigLoader, ConfigOverrides, ENV_ALLOWED_TYPES, ENV_CONFIG, ENV_ENDPOINT, ENV_MAX_BYTES,
    ENV_TIMEOUT_SECS, ENV_TRANSPORT,
};
pub use model::{IntakeConfig, NotificationSettings, PolicySettings, TransportMode};
