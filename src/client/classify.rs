//! Maps a failed API response to an error class.

use crate::error::{ApiFailure, Error};
use crate::wire::error::{CODE_CONSTRAINT_VIOLATION, CODE_NOT_FOUND};
use crate::wire::P1Error;

/// Message PingOne returns while a fresh role assignment is still
/// propagating. Retried like any other transient failure.
pub const PERMISSION_PROPAGATION_MESSAGE: &str =
    "The actor attempting to perform the request is not authorized.";

/// Detail message returned when deleting the environment's default policy.
pub const DEFAULT_POLICY_DELETE_MESSAGE: &str = "remove default device authentication policy";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Read,
    Update,
    Delete,
}

impl OperationKind {
    pub fn retries(&self) -> bool {
        matches!(self, OperationKind::Create | OperationKind::Read)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Transient,
    ResourceNotFound,
    Authorization,
    ServerValidation,
}

pub fn classify(status: Option<u16>, body: Option<&P1Error>, kind: OperationKind) -> Class {
    let Some(status) = status else {
        return Class::Transient;
    };

    match status {
        404 => Class::ResourceNotFound,
        429 | 500..=599 => Class::Transient,
        403 if kind.retries() && is_permission_propagation(body) => Class::Transient,
        401 | 403 => Class::Authorization,
        _ if body.is_some_and(|b| b.code_is(CODE_NOT_FOUND)) => Class::ResourceNotFound,
        _ => Class::ServerValidation,
    }
}

fn is_permission_propagation(body: Option<&P1Error>) -> bool {
    body.is_some_and(|b| b.message_str().starts_with(PERMISSION_PROPAGATION_MESSAGE))
}

/// Statuses after which the environment itself is probed. A missing
/// environment turns any of them into [`Error::EnvironmentNotFound`].
pub fn needs_environment_probe(status: Option<u16>) -> bool {
    matches!(status, Some(400 | 401 | 403))
}

pub fn to_error(failure: ApiFailure, kind: OperationKind) -> Error {
    match classify(failure.status, failure.body.as_ref(), kind) {
        Class::Transient => Error::Transient(failure),
        Class::ResourceNotFound => Error::ResourceNotFound(failure),
        Class::Authorization => Error::Authorization(failure),
        Class::ServerValidation => Error::ServerValidation(failure),
    }
}

/// The API refused to delete the environment's default policy.
pub fn is_default_policy_delete_refusal(error: &Error) -> bool {
    let Error::ServerValidation(failure) = error else {
        return false;
    };
    failure.code_is(CODE_CONSTRAINT_VIOLATION)
        && failure
            .body
            .as_ref()
            .and_then(|b| b.details.first())
            .and_then(|d| d.message.as_deref())
            .is_some_and(|m| m.to_lowercase().contains(DEFAULT_POLICY_DELETE_MESSAGE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::P1ErrorDetail;

    fn body(code: &str, message: &str) -> P1Error {
        P1Error {
            code: Some(code.into()),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_classes() {
        use OperationKind::*;
        assert_eq!(classify(None, None, Read), Class::Transient);
        assert_eq!(classify(Some(503), None, Update), Class::Transient);
        assert_eq!(classify(Some(429), None, Create), Class::Transient);
        assert_eq!(classify(Some(404), None, Delete), Class::ResourceNotFound);
        assert_eq!(classify(Some(401), None, Read), Class::Authorization);
        assert_eq!(classify(Some(400), None, Create), Class::ServerValidation);
    }

    #[test]
    fn test_permission_propagation_is_transient_on_create_and_read_only() {
        let b = body("ACCESS_FAILED", PERMISSION_PROPAGATION_MESSAGE);
        assert_eq!(classify(Some(403), Some(&b), OperationKind::Create), Class::Transient);
        assert_eq!(classify(Some(403), Some(&b), OperationKind::Read), Class::Transient);
        assert_eq!(classify(Some(403), Some(&b), OperationKind::Update), Class::Authorization);

        let other = body("ACCESS_FAILED", "Forbidden");
        assert_eq!(classify(Some(403), Some(&other), OperationKind::Read), Class::Authorization);
    }

    #[test]
    fn test_probe_statuses() {
        assert!(needs_environment_probe(Some(400)));
        assert!(needs_environment_probe(Some(403)));
        assert!(!needs_environment_probe(Some(404)));
        assert!(!needs_environment_probe(None));
    }

    #[test]
    fn test_default_policy_delete_refusal() {
        let mut b = body(CODE_CONSTRAINT_VIOLATION, "Constraint violation");
        b.details.push(P1ErrorDetail {
            code: Some("CONSTRAINT_VIOLATION".into()),
            message: Some("Cannot remove default device authentication policy".into()),
            ..Default::default()
        });
        let failure = ApiFailure::new("DeleteDeviceAuthenticationPolicy", Some(400), Some(b));
        assert!(is_default_policy_delete_refusal(&to_error(failure, OperationKind::Delete)));

        let plain = ApiFailure::new("DeleteDeviceAuthenticationPolicy", Some(400), None);
        assert!(!is_default_policy_delete_refusal(&to_error(plain, OperationKind::Delete)));
    }
}
