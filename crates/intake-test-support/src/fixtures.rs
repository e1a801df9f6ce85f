//! Selected-file builders and endpoint helpers.

use std::net::TcpListener;

use intake_core::SelectedFile;
use url::Url;

/// One mebibyte.
pub const MIB: usize = 1024 * 1024;

/// In-memory PNG selection of `byte_size` zero bytes.
#[must_use]
pub fn png(name: &str, byte_size: usize) -> SelectedFile {
    SelectedFile::in_memory(name, "image/png", vec![0; byte_size])
}

/// In-memory PDF selection of `byte_size` zero bytes.
#[must_use]
pub fn pdf(name: &str, byte_size: usize) -> SelectedFile {
    SelectedFile::in_memory(name, "application/pdf", vec![0; byte_size])
}

/// In-memory ZIP selection; never allowed by the default policy.
#[must_use]
pub fn zip(name: &str, byte_size: usize) -> SelectedFile {
    SelectedFile::in_memory(name, "application/zip", vec![0; byte_size])
}

/// Base URL on a loopback port with nothing listening, for connection-refused cases.
///
/// # Errors
///
/// Returns an error if no ephemeral port can be reserved.
pub fn unreachable_endpoint() -> anyhow::Result<Url> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(Url::parse(&format!("http://127.0.0.1:{port}/"))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_declare_media_types() {
        assert_eq!(png("a.png", 3).candidate.declared_media_type, "image/png");
        assert_eq!(pdf("a.pdf", 3).candidate.declared_media_type, "application/pdf");
        assert_eq!(zip("a.zip", 3).candidate.byte_size, 3);
    }

    #[test]
    fn unreachable_endpoint_is_loopback() -> anyhow::Result<()> {
        let url = unreachable_endpoint()?;
        assert_eq!(url.host_str(), Some("127.0.0.1"));
        assert!(url.port().is_some());
        Ok(())
    }
}
