//! User-facing message texts.

/// Shown when the declared media type is not in the allowed set.
pub const UNSUPPORTED_FORMAT: &str =
    "지원하지 않는 파일 형식입니다. PNG, JPG, PDF 파일만 업로드 가능합니다.";

/// Fallback when the endpoint declines without a usable `detail`.
pub const UPLOAD_ERROR: &str = "파일 업로드 중 오류가 발생했습니다.";

/// Shown when no response could be obtained from the endpoint.
pub const SERVER_UNREACHABLE: &str =
    "서버에 연결할 수 없습니다. 백엔드 서버가 실행 중인지 확인해 주세요.";

/// Shown when the local payload could not be read before sending.
pub const FILE_UNREADABLE: &str = "파일을 읽을 수 없습니다.";

const BYTES_PER_MIB: u64 = 1024 * 1024;

/// Size-limit message for a limit expressed in bytes.
#[must_use]
pub fn size_exceeded(max_byte_size: u64) -> String {
    format!("파일 크기가 {}를 초과합니다.", format_limit(max_byte_size))
}

/// Success notification for an accepted upload.
#[must_use]
pub fn upload_succeeded(filename: &str) -> String {
    format!("파일 \"{filename}\"이 성공적으로 업로드되었습니다.")
}

fn format_limit(bytes: u64) -> String {
    if bytes >= BYTES_PER_MIB && bytes % BYTES_PER_MIB == 0 {
        format!("{}MB", bytes / BYTES_PER_MIB)
    } else {
        format!("{bytes}B")
    }
}
