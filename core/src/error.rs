use thiserror::Error;

/// Why a single call to the recipe API produced no usable data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("API authentication failed. Please check your API key. (HTTP {status})")]
    Auth { status: u16 },

    #[error("The requested resource was not found.")]
    NotFound,

    #[error("Too many requests. Please try again later.")]
    RateLimited,

    #[error("API service is temporarily unavailable. (HTTP {status})")]
    ServiceUnavailable { status: u16 },

    #[error("HTTP error {status}")]
    UnknownHttp { status: u16 },

    #[error("Network error: {0}")]
    Transport(String),
}

impl ApiError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    /// Short stable name, used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "auth",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::ServiceUnavailable { .. } => "service_unavailable",
            Self::UnknownHttp { .. } => "unknown_http",
            Self::Transport(_) => "transport",
        }
    }
}

/// Classify an HTTP status. Success codes pass, everything else maps to exactly one
/// [`ApiError`].
pub fn classify_status(status: u16) -> Result<(), ApiError> {
    match status {
        200..=299 => Ok(()),
        401 | 403 => Err(ApiError::Auth { status }),
        404 => Err(ApiError::NotFound),
        429 => Err(ApiError::RateLimited),
        500 | 502 | 503 | 504 => Err(ApiError::ServiceUnavailable { status }),
        _ => Err(ApiError::UnknownHttp { status }),
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid meal slot '{day}/{slot}'. Day must be Monday-Sunday, slot one of: breakfast, lunch, dinner")]
    InvalidSlot { day: String, slot: String },

    #[error("Stored value under '{key}' is corrupt: {reason}")]
    StorageCorrupt { key: String, reason: String },
}
