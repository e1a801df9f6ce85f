//! Candidate, outcome, and policy types for a single upload submission.
//!
//! # Design
//! - Pure data carriers; behaviour lives in `validate.rs`, `session.rs`, and the transports.
//! - Only declared metadata is modelled. File contents are never inspected.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default upper bound for an upload (50 MiB).
pub const DEFAULT_MAX_BYTE_SIZE: u64 = 50 * 1024 * 1024;

/// Media types accepted by default. `image/jpg` is a non-standard spelling some
/// browsers still report for `.jpg` files.
pub const DEFAULT_ALLOWED_MEDIA_TYPES: [&str; 4] =
    ["image/png", "image/jpeg", "image/jpg", "application/pdf"];

const OCTET_STREAM: &str = "application/octet-stream";

/// Metadata for a file proposed by the user, as declared by the selection surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFile {
    /// File name without directory components.
    pub name: String,
    /// Declared size in bytes.
    pub byte_size: u64,
    /// Declared media type (never content-sniffed).
    pub declared_media_type: String,
}

impl CandidateFile {
    /// Build a candidate from its declared metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, byte_size: u64, declared_media_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            byte_size,
            declared_media_type: declared_media_type.into(),
        }
    }
}

/// Where the bytes of a selected file come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilePayload {
    /// Bytes already held in memory.
    Bytes(Vec<u8>),
    /// A file on disk, read only when a transport needs the contents.
    Path(PathBuf),
}

impl FilePayload {
    /// Load the payload bytes.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error when a path-backed payload cannot be read.
    pub async fn read(&self) -> io::Result<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes.clone()),
            Self::Path(path) => tokio::fs::read(path).await,
        }
    }
}

/// A candidate together with the means to obtain its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Declared metadata.
    pub candidate: CandidateFile,
    /// Byte source.
    pub payload: FilePayload,
}

impl SelectedFile {
    /// Wrap in-memory bytes; the declared size is the buffer length.
    #[must_use]
    pub fn in_memory(
        name: impl Into<String>,
        declared_media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        let byte_size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        Self {
            candidate: CandidateFile::new(name, byte_size, declared_media_type),
            payload: FilePayload::Bytes(bytes),
        }
    }

    /// Describe a file on disk, declaring its media type from the extension
    /// unless `declared_media_type` overrides it. Only metadata is read here.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the path cannot be inspected or is not a regular file.
    pub async fn from_path(path: &Path, declared_media_type: Option<&str>) -> io::Result<Self> {
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' is not a regular file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media_type = declared_media_type
            .map_or_else(|| media_type_for_path(path).to_string(), str::to_string);
        Ok(Self {
            candidate: CandidateFile::new(name, metadata.len(), media_type),
            payload: FilePayload::Path(path.to_path_buf()),
        })
    }
}

/// The files delivered by one drop or picker interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    files: Vec<SelectedFile>,
}

impl Selection {
    /// Wrap whatever the surface delivered.
    #[must_use]
    pub const fn new(files: Vec<SelectedFile>) -> Self {
        Self { files }
    }

    /// A selection carrying exactly one file.
    #[must_use]
    pub fn single(file: SelectedFile) -> Self {
        Self { files: vec![file] }
    }

    /// A selection carrying no files.
    #[must_use]
    pub const fn empty() -> Self {
        Self { files: Vec::new() }
    }

    /// Number of files delivered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the interaction delivered nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Keep the first file and discard the rest.
    #[must_use]
    pub fn into_first(self) -> Option<SelectedFile> {
        self.files.into_iter().next()
    }
}

/// Record of an accepted upload, as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Stored file name.
    pub filename: String,
    /// Stored size in bytes.
    pub byte_size: u64,
    /// Stored media type.
    pub content_type: String,
}

impl From<&CandidateFile> for LedgerEntry {
    fn from(candidate: &CandidateFile) -> Self {
        Self {
            filename: candidate.name.clone(),
            byte_size: candidate.byte_size,
            content_type: candidate.declared_media_type.clone(),
        }
    }
}

/// Why a submission was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionKind {
    /// Declared media type outside the allowed set.
    UnsupportedFormat,
    /// Declared size above the policy limit.
    SizeExceeded,
    /// The endpoint answered but declined the file.
    Endpoint {
        /// HTTP status when the endpoint answered with a failure status.
        status: Option<u16>,
    },
    /// No response could be obtained from the endpoint.
    Unreachable,
    /// The local payload could not be read.
    Unreadable,
}

impl RejectionKind {
    /// Stable label used in logs, events, and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat => "unsupported_format",
            Self::SizeExceeded => "size_exceeded",
            Self::Endpoint { .. } => "endpoint",
            Self::Unreachable => "unreachable",
            Self::Unreadable => "unreadable",
        }
    }
}

/// A rejected submission's classification and user-facing reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// Classification.
    #[serde(flatten)]
    pub kind: RejectionKind,
    /// Text shown to the user.
    pub reason: String,
}

impl Rejection {
    /// Build a rejection.
    #[must_use]
    pub fn new(kind: RejectionKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

/// Terminal result of one submission. Produced once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UploadOutcome {
    /// The file was accepted and belongs in the ledger.
    Accepted(LedgerEntry),
    /// The file was rejected; only a notification is raised.
    Rejected(Rejection),
}

impl UploadOutcome {
    /// Shorthand for a rejected outcome.
    #[must_use]
    pub fn rejected(kind: RejectionKind, reason: impl Into<String>) -> Self {
        Self::Rejected(Rejection::new(kind, reason))
    }

    /// Whether the outcome is `Accepted`.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// `accepted` or `rejected`.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Accepted(_) => "accepted",
            Self::Rejected(_) => "rejected",
        }
    }

    /// The rejection, if any.
    #[must_use]
    pub const fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }
}

/// Type and size policy applied before any transport call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    allowed_media_types: BTreeSet<String>,
    max_byte_size: u64,
}

impl ValidationPolicy {
    /// Build a policy. Media types are stored trimmed and lowercased.
    #[must_use]
    pub fn new<I, S>(allowed_media_types: I, max_byte_size: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_media_types: allowed_media_types
                .into_iter()
                .map(|value| normalize_media_type(value.as_ref()))
                .filter(|value| !value.is_empty())
                .collect(),
            max_byte_size,
        }
    }

    /// Whether the declared media type is in the allowed set.
    #[must_use]
    pub fn allows(&self, media_type: &str) -> bool {
        self.allowed_media_types
            .contains(&normalize_media_type(media_type))
    }

    /// Allowed media types in sorted order.
    pub fn allowed_media_types(&self) -> impl Iterator<Item = &str> {
        self.allowed_media_types.iter().map(String::as_str)
    }

    /// Inclusive size limit in bytes.
    #[must_use]
    pub const fn max_byte_size(&self) -> u64 {
        self.max_byte_size
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_MEDIA_TYPES, DEFAULT_MAX_BYTE_SIZE)
    }
}

fn normalize_media_type(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

/// Declared media type for a path, derived from its extension the way a
/// browser labels a picked file.
#[must_use]
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "pdf" => "application/pdf",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        "dwg" => "image/vnd.dwg",
        "dxf" => "image/vnd.dxf",
        "zip" => "application/zip",
        "txt" => "text/plain",
        "json" => "application/json",
        _ => OCTET_STREAM,
    }
}
