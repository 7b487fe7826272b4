// error.rs

use thiserror::Error;

/// Failures raised at the remote gateway edge.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Bad credentials or a sign-up conflict, as reported by the auth endpoint.
    #[error("{message}")]
    Auth { message: String },
    /// The request never completed (connection, TLS, timeout).
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The backend answered with a non-success status.
    #[error("{op} failed: HTTP {status} - {body}")]
    Status {
        op: &'static str,
        status: u16,
        body: String,
    },
    /// The response body was not the JSON shape we expect.
    #[error("could not decode {op} response: {source}")]
    Decode {
        op: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// A row came back without a field the typed entity requires.
    #[error("{op} returned a row without {field}")]
    MissingField {
        op: &'static str,
        field: &'static str,
    },
    /// An insert reported success but returned no representation row.
    #[error("{op} returned no rows")]
    NoRows { op: &'static str },
}

impl GatewayError {
    pub fn is_auth(&self) -> bool {
        matches!(self, GatewayError::Auth { .. })
    }
}

/// Application-level failures surfaced to the user as notices.
///
/// Validation and ownership errors are raised before any remote call is
/// issued; gateway errors wrap whatever came back from the backend. None of
/// these are retried - the user re-initiates the action.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("you can only {action} your own {kind}")]
    Ownership {
        action: &'static str,
        kind: &'static str,
    },
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }
}
