// Consistent exit codes for the bookmemory CLI.
//
//   0  = success
//   1  = general error
//   2  = usage/validation error (HTTP 400, 422)
//   11 = authentication error (HTTP 401, 403)
//   13 = network error
//   14 = not found (HTTP 404)

use std::process;

use bookmemory_client::config::ConfigError;
use bookmemory_client::error::ApiError;

/// Named exit codes for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Error = 1,
    Usage = 2,
    Auth = 11,
    Network = 13,
    NotFound = 14,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Map an anyhow error to an exit code by inspecting the error chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(api_err) = cause.downcast_ref::<ApiError>() {
                return Self::from_api_error(api_err);
            }
            if cause.downcast_ref::<ConfigError>().is_some() {
                return Self::Usage;
            }
        }
        Self::Error
    }

    pub fn from_api_error(err: &ApiError) -> Self {
        match err {
            ApiError::Http { status, .. } => Self::from_status(*status),
            ApiError::Network(_) => Self::Network,
            ApiError::InvalidArgument(_) => Self::Usage,
            ApiError::Decode(_) => Self::Error,
        }
    }

    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => Self::Usage,
            401 | 403 => Self::Auth,
            404 => Self::NotFound,
            _ => Self::Error,
        }
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code.code() as u8)
    }
}
