//! Error types for the peakgrid library.

use thiserror::Error;

/// Broad class of a [`PeakGridError`].
///
/// Callers use this to decide how to report a failure; all classes are fatal
/// for a run, but only [`ErrorKind::TransientNetwork`] is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad grid settings or missing credential, detected before any I/O.
    Config,
    /// The peak name matched neither a canonical name nor an alias.
    NotFound,
    /// The provider rejected the API key.
    Auth,
    /// The provider refused the request for quota, billing or API enablement.
    QuotaOrPermission,
    /// Connection failure, timeout, or a provider-side hiccup.
    TransientNetwork,
    /// The provider answered, but not with something usable.
    InvalidResponse,
    /// Plot rendering failed.
    Render,
    /// Local I/O failure.
    Io,
}

/// Errors that can occur while resolving peaks and sampling elevation grids.
#[derive(Error, Debug)]
pub enum PeakGridError {
    /// IO error when writing output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Grid must have at least two samples per side.
    #[error("Invalid grid size: {size} (need at least 2 samples per side)")]
    InvalidGridSize { size: usize },

    /// Grid half-width must be a positive, finite number of degrees.
    #[error("Invalid grid half-width: {half_width}° (must be positive)")]
    InvalidHalfWidth { half_width: f64 },

    /// Batches must carry at least one location.
    #[error("Invalid batch size: {size} (must be at least 1)")]
    InvalidBatchSize { size: usize },

    /// No API key was configured.
    #[error(
        "GOOGLE_MAPS_API_KEY is not set. Add GOOGLE_MAPS_API_KEY=your_api_key \
         to a .env file or export it in your shell"
    )]
    MissingApiKey,

    /// Unknown peak name.
    #[error("'{name}' is not a known peak. Available peaks: {}", .available.join(", "))]
    PeakNotFound {
        name: String,
        available: Vec<String>,
    },

    /// The provider rejected the API key.
    #[error("Elevation API rejected the API key: {message}. Check GOOGLE_MAPS_API_KEY")]
    Auth { message: String },

    /// The provider denied the request for a reason other than the key itself.
    #[error(
        "Elevation API denied the request ({status}): {message}. \
         Make sure the Elevation API and billing are enabled for this key"
    )]
    QuotaOrPermission { status: String, message: String },

    /// Network-level failure or temporary provider outage.
    #[error("Network error talking to the elevation provider: {reason}")]
    TransientNetwork { reason: String },

    /// The provider's answer could not be used.
    #[error("Invalid response from the elevation provider: {reason}")]
    InvalidResponse { reason: String },

    /// Drawing the plot failed.
    #[error("Rendering failed: {reason}")]
    Render { reason: String },
}

impl PeakGridError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PeakGridError::Io(_) => ErrorKind::Io,
            PeakGridError::InvalidGridSize { .. }
            | PeakGridError::InvalidHalfWidth { .. }
            | PeakGridError::InvalidBatchSize { .. }
            | PeakGridError::MissingApiKey => ErrorKind::Config,
            PeakGridError::PeakNotFound { .. } => ErrorKind::NotFound,
            PeakGridError::Auth { .. } => ErrorKind::Auth,
            PeakGridError::QuotaOrPermission { .. } => ErrorKind::QuotaOrPermission,
            PeakGridError::TransientNetwork { .. } => ErrorKind::TransientNetwork,
            PeakGridError::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            PeakGridError::Render { .. } => ErrorKind::Render,
        }
    }

    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::TransientNetwork
    }
}

impl From<reqwest::Error> for PeakGridError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PeakGridError::InvalidResponse {
                reason: err.to_string(),
            }
        } else {
            PeakGridError::TransientNetwork {
                reason: err.to_string(),
            }
        }
    }
}

/// Result type alias using [`PeakGridError`].
pub type Result<T> = std::result::Result<T, PeakGridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PeakGridError::InvalidGridSize { size: 1 };
        assert!(err.to_string().contains('1'));

        let err = PeakGridError::PeakNotFound {
            name: "Mont Blanc".to_string(),
            available: vec!["Everest".to_string(), "K2".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Mont Blanc"));
        assert!(msg.contains("Everest, K2"));

        let err = PeakGridError::MissingApiKey;
        assert!(err.to_string().contains("GOOGLE_MAPS_API_KEY"));
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            PeakGridError::InvalidHalfWidth { half_width: 0.0 }.kind(),
            ErrorKind::Config
        );
        assert_eq!(PeakGridError::MissingApiKey.kind(), ErrorKind::Config);
        assert_eq!(
            PeakGridError::Auth {
                message: "bad key".into()
            }
            .kind(),
            ErrorKind::Auth
        );
        assert!(PeakGridError::TransientNetwork {
            reason: "timeout".into()
        }
        .is_transient());
        assert!(!PeakGridError::QuotaOrPermission {
            status: "OVER_QUERY_LIMIT".into(),
            message: String::new(),
        }
        .is_transient());
    }
}
