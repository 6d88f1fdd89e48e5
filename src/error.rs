//! Error types for the PingOne MFA adapter.

use crate::diagnostics::{AttributePath, Diagnostic, Diagnostics};
use crate::wire::P1Error;
use std::fmt;
use thiserror::Error;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// User-facing error classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    ImportIdentifier,
    ResourceNotFound,
    EnvironmentNotFound,
    Authorization,
    Transient,
    ServerValidation,
    DataIntegrity,
    Configuration,
    Cancelled,
}

/// A failed API call: which operation, the HTTP status if one was
/// received, and the parsed PingOne error body if there was one.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiFailure {
    pub operation: String,
    pub status: Option<u16>,
    pub body: Option<P1Error>,
    pub message: String,
}

impl ApiFailure {
    pub fn new(operation: impl Into<String>, status: Option<u16>, body: Option<P1Error>) -> Self {
        let message = body
            .as_ref()
            .and_then(|b| b.message.clone())
            .unwrap_or_else(|| match status {
                Some(code) => format!("HTTP {}", code),
                None => "no response".to_string(),
            });
        Self {
            operation: operation.into(),
            status,
            body,
            message,
        }
    }

    pub fn transport(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: None,
            body: None,
            message: message.into(),
        }
    }

    pub fn code_is(&self, code: &str) -> bool {
        self.body.as_ref().is_some_and(|b| b.code_is(code))
    }

    pub fn summary(&self) -> String {
        format!("Error when calling `{}`: {}", self.operation, self.message)
    }

    pub fn detail(&self) -> String {
        match &self.body {
            Some(body) => body.render_details(),
            None => self.message.clone(),
        }
    }

    /// Attribute path reported by the server, if any.
    pub fn target(&self) -> Option<&str> {
        self.body.as_ref().and_then(P1Error::first_target)
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// Plan failed local validation; no call was made
    #[error("Validation failed: {0}")]
    Validation(Diagnostics),

    /// A required configuration value was null or unknown at apply time
    #[error("Invalid data at {path}: {message}")]
    InvalidData {
        path: AttributePath,
        message: String,
    },

    /// Import identifier did not parse
    #[error("Unexpected Import Identifier: {0}")]
    ImportIdentifier(String),

    #[error("Requested resource not found: {0}")]
    ResourceNotFound(ApiFailure),

    #[error("Environment not found: {0}")]
    EnvironmentNotFound(String),

    #[error("Authorization error: {0}")]
    Authorization(ApiFailure),

    /// Retry budget exhausted
    #[error("Transient error: {0}")]
    Transient(ApiFailure),

    #[error("Server validation error: {0}")]
    ServerValidation(ApiFailure),

    /// Server returned nothing where a record was required
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Timed out: {0}")]
    Timeout(String),
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    pub fn invalid_data(path: &AttributePath, message: impl Into<String>) -> Self {
        Error::InvalidData {
            path: path.clone(),
            message: message.into(),
        }
    }

    pub fn missing_data(what: &str) -> Self {
        Error::DataIntegrity(format!(
            "Cannot convert the {} to state as the data object is nil.  Please report this to the provider maintainers.",
            what
        ))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) | Error::InvalidData { .. } => ErrorKind::Validation,
            Error::ImportIdentifier(_) => ErrorKind::ImportIdentifier,
            Error::ResourceNotFound(_) => ErrorKind::ResourceNotFound,
            Error::EnvironmentNotFound(_) => ErrorKind::EnvironmentNotFound,
            Error::Authorization(_) => ErrorKind::Authorization,
            Error::Transient(_) | Error::Network(_) | Error::Timeout(_) => ErrorKind::Transient,
            Error::ServerValidation(_) => ErrorKind::ServerValidation,
            Error::DataIntegrity(_) | Error::Json(_) => ErrorKind::DataIntegrity,
            Error::Io(_) | Error::Config(_) => ErrorKind::Configuration,
            Error::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// True for the two "gone" classes that drop a resource from state.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ResourceNotFound | ErrorKind::EnvironmentNotFound
        )
    }

    /// Render as user-facing diagnostics.
    pub fn to_diagnostics(&self) -> Diagnostics {
        match self {
            Error::Validation(diags) => diags.clone(),
            Error::InvalidData { path, message } => {
                Diagnostic::error("Invalid data", message.clone())
                    .with_path(path.clone())
                    .into()
            }
            Error::ImportIdentifier(detail) => {
                Diagnostic::error("Unexpected Import Identifier", detail.clone()).into()
            }
            Error::ResourceNotFound(failure) => resource_not_found_warning(Some(failure)).into(),
            Error::EnvironmentNotFound(environment_id) => Diagnostic::warning(
                "Environment not found",
                format!(
                    "The environment {} cannot be found in the PingOne service.  Resources that belong to it are removed from state.",
                    environment_id
                ),
            )
            .into(),
            Error::Authorization(failure) | Error::Transient(failure) => {
                Diagnostic::error(failure.summary(), failure.detail()).into()
            }
            Error::ServerValidation(failure) => {
                let diag = Diagnostic::error(failure.summary(), failure.detail());
                match failure.target() {
                    Some(target) => diag.with_path(AttributePath::root(target)).into(),
                    None => diag.into(),
                }
            }
            Error::DataIntegrity(detail) => {
                Diagnostic::error("Data object missing", detail.clone()).into()
            }
            other => Diagnostic::error("Unexpected error", other.to_string()).into(),
        }
    }
}

/// Warning emitted when a resource has disappeared from the service.
pub fn resource_not_found_warning(failure: Option<&ApiFailure>) -> Diagnostic {
    let mut detail = String::from(
        "The requested resource configuration cannot be found in the PingOne service.  If the requested resource is managed in state, it may have been removed outside of this tool.",
    );
    if let Some(message) = failure
        .and_then(|f| f.body.as_ref())
        .and_then(|b| b.message.as_deref())
    {
        detail.push_str(&format!("\nAPI error: {}", message));
    }
    Diagnostic::warning("Requested resource not found", detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let failure = ApiFailure::new("ReadOneDeviceAuthenticationPolicy", Some(404), None);
        assert_eq!(
            Error::ResourceNotFound(failure.clone()).kind(),
            ErrorKind::ResourceNotFound
        );
        assert!(Error::EnvironmentNotFound("env".into()).is_not_found());
        assert_eq!(Error::Transient(failure).kind(), ErrorKind::Transient);
        assert_eq!(Error::Cancelled.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn test_not_found_renders_as_warning_with_api_message() {
        let body = P1Error {
            code: Some("NOT_FOUND".into()),
            message: Some("Unable to find policy".into()),
            ..Default::default()
        };
        let failure = ApiFailure::new("ReadOneDeviceAuthenticationPolicy", Some(404), Some(body));
        let diags = Error::ResourceNotFound(failure).to_diagnostics();
        assert!(!diags.has_error());
        assert!(diags.mentions("API error: Unable to find policy"));
    }

    #[test]
    fn test_server_validation_carries_target_path() {
        let body: P1Error = serde_json::from_str(
            r#"{"code":"INVALID_DATA","message":"bad","details":[{"target":"name","message":"must not be blank"}]}"#,
        )
        .unwrap();
        let failure = ApiFailure::new("CreateDeviceAuthenticationPolicies", Some(400), Some(body));
        let diags = Error::ServerValidation(failure).to_diagnostics();
        let first = diags.iter().next().unwrap();
        assert_eq!(first.path.as_ref().unwrap().to_string(), "name");
        assert_eq!(first.summary, "Error when calling `CreateDeviceAuthenticationPolicies`: bad");
    }
}
