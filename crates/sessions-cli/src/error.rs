//! Error categories reported to the user and mapped to exit codes.

use std::fmt;

use sessions_api::ApiError;
use sessions_core::DataError;

/// Which stage of a run failed, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed or missing activity data.
    Data,
    /// The service could not be reached.
    Transport,
    /// The service rejected a request.
    Api,
    /// Configuration, local I/O, or anything else.
    Other,
}

impl ErrorCategory {
    /// Classifies an error by the first typed cause in its chain.
    pub fn classify(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if cause.is::<DataError>() || cause.is::<serde_json::Error>() {
                return Self::Data;
            }
            if let Some(api) = cause.downcast_ref::<ApiError>() {
                return match api {
                    ApiError::Transport(_) => Self::Transport,
                    ApiError::Status { .. } => Self::Api,
                    ApiError::InvalidResponse(_) => Self::Data,
                    ApiError::InvalidApiKey { .. }
                    | ApiError::InvalidBaseUrl { .. }
                    | ApiError::ClientBuild(_) => Self::Other,
                };
            }
        }
        Self::Other
    }

    /// Process exit status, following the sysexits convention.
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Data => 65,      // EX_DATAERR
            Self::Transport => 69, // EX_UNAVAILABLE
            Self::Api => 70,       // EX_SOFTWARE
            Self::Other => 1,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Data => "data error",
            Self::Transport => "transport error",
            Self::Api => "api error",
            Self::Other => "error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
