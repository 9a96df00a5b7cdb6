use std::path::PathBuf;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_IO: &str = "CC-ERR-IO-001";
pub const ERR_NOT_A_FILE: &str = "CC-ERR-IO-002";
pub const ERR_PARSE: &str = "CC-ERR-PARSE-001";
pub const ERR_UNRESOLVABLE_IDENTITY: &str = "CC-ERR-IDENTITY-001";
pub const ERR_UNEXPECTED_SHAPE: &str = "CC-ERR-SHAPE-001";
pub const ERR_MALFORMED_LOCATION: &str = "CC-ERR-LOCATION-001";
pub const ERR_INVALID_LINE: &str = "CC-ERR-LOCATION-002";
pub const ERR_LINE_OUT_OF_RANGE: &str = "CC-ERR-LOCATION-003";
pub const ERR_CONFIG: &str = "CC-ERR-CONFIG-001";

/// Fatal errors raised by a scan or a back-patch.
///
/// Best-effort misses (an unresolved tag symbol, a detector that does not
/// match, missing repository metadata) never surface here; they degrade to
/// placeholder values inside the report.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a regular file", .0.display())]
    NotAFile(PathBuf),

    #[error("failed to parse {path}: {}", .messages.join("; "))]
    Parse { path: String, messages: Vec<String> },

    /// The identity fallback chain ran out of rules for this node shape.
    #[error("unresolvable identity for {kind} node `{text}`")]
    UnresolvableIdentity { kind: String, text: String },

    #[error("unexpected {kind} shape `{text}`: {expected}")]
    UnexpectedShape {
        kind: String,
        text: String,
        expected: &'static str,
    },

    #[error("malformed source location `{0}`, expected <path>#L<start>[-<end>]")]
    MalformedLocation(String),

    #[error("invalid line number `{line}` in source location `{location}`")]
    InvalidLine { location: String, line: String },

    #[error("line {line} is past the end of {} ({line_count} lines)", .path.display())]
    LineOutOfRange {
        path: PathBuf,
        line: u32,
        line_count: u32,
    },

    #[error("invalid scan options: {0}")]
    Config(#[from] serde_json::Error),
}

impl ScanError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable diagnostic code for the error category.
    pub fn code(&self) -> &'static str {
        match self {
            ScanError::Io { .. } => ERR_IO,
            ScanError::NotAFile(_) => ERR_NOT_A_FILE,
            ScanError::Parse { .. } => ERR_PARSE,
            ScanError::UnresolvableIdentity { .. } => ERR_UNRESOLVABLE_IDENTITY,
            ScanError::UnexpectedShape { .. } => ERR_UNEXPECTED_SHAPE,
            ScanError::MalformedLocation(_) => ERR_MALFORMED_LOCATION,
            ScanError::InvalidLine { .. } => ERR_INVALID_LINE,
            ScanError::LineOutOfRange { .. } => ERR_LINE_OUT_OF_RANGE,
            ScanError::Config(_) => ERR_CONFIG,
        }
    }
}

#[cfg(feature = "napi")]
impl From<ScanError> for napi::Error {
    fn from(error: ScanError) -> Self {
        napi::Error::from_reason(format!("[{}] {}", error.code(), error))
    }
}
