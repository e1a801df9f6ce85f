//! Command handlers grouped by concern.

pub(crate) mod check;
pub(crate) mod endpoint;
pub(crate) mod policy;
pub(crate) mod upload;
