//! Resource lifecycle controllers.
//!
//! Each resource flavor implements [`Resource`]: the five host entry points
//! (create, read, update, delete, import) plus its schema and an optional
//! plan hook. Operations never panic or return bare errors to the host;
//! every outcome is a [`Response`] carrying the new state and diagnostics.

pub mod device_policies;
pub mod device_policy;
pub mod device_policy_default;
pub mod device_policy_migration;
pub mod fido2_policy;
pub mod import;
pub mod mfa_settings;
pub mod push_credential;
pub mod schema;

use crate::diagnostics::{AttributePath, Diagnostics};
use crate::error::{Error, Result};
use crate::transcode::required;
use crate::value::Value;
use async_trait::async_trait;
use schema::ResourceSchema;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use uuid::Uuid;

/// Per-operation context: the cancellation token propagated into every
/// HTTP call and poll, and an id for correlating log lines.
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub cancel: CancellationToken,
    pub request_id: Uuid,
}

impl OperationContext {
    pub fn new() -> Self {
        Self::with_cancel(CancellationToken::new())
    }

    pub fn with_cancel(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            request_id: Uuid::new_v4(),
        }
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a lifecycle operation.
///
/// `state: None` without error diagnostics means the resource is gone and
/// the host should drop it. With errors, the host keeps its prior state.
#[derive(Debug, Clone)]
pub struct Response<S> {
    pub state: Option<S>,
    pub diagnostics: Diagnostics,
}

impl<S> Response<S> {
    pub fn new(state: Option<S>, diagnostics: Diagnostics) -> Self {
        Self { state, diagnostics }
    }

    /// Fold an operation result and the diagnostics gathered along the way.
    pub fn finish(result: Result<Option<S>>, mut diagnostics: Diagnostics) -> Self {
        match result {
            Ok(state) => Self::new(state, diagnostics),
            Err(e) => {
                diagnostics.extend(e.to_diagnostics());
                Self::new(None, diagnostics)
            }
        }
    }

    pub fn has_error(&self) -> bool {
        self.diagnostics.has_error()
    }

    pub fn is_removed(&self) -> bool {
        self.state.is_none() && !self.has_error()
    }
}

#[async_trait]
pub trait Resource: Send + Sync {
    type State: Clone + Send + Sync;

    fn type_name(&self) -> &'static str;

    fn schema(&self) -> ResourceSchema;

    /// Plan-time validation. No network calls except the reads some
    /// cross-resource checks need.
    async fn validate(&self, plan: &Self::State) -> Diagnostics;

    async fn create(&self, ctx: &OperationContext, plan: &Self::State) -> Response<Self::State>;

    async fn read(&self, ctx: &OperationContext, state: &Self::State) -> Response<Self::State>;

    async fn update(
        &self,
        ctx: &OperationContext,
        plan: &Self::State,
        state: &Self::State,
    ) -> Response<Self::State>;

    async fn delete(&self, ctx: &OperationContext, state: &Self::State) -> Response<Self::State>;

    /// Import state from an identifier string. The result is passed to
    /// [`Resource::read`] by the host.
    fn import(&self, id: &str) -> Result<Self::State>;

    /// Called when the host computes a plan. `plan: None` means destroy.
    fn modify_plan(&self, _plan: Option<&Self::State>, _state: Option<&Self::State>) -> Diagnostics {
        Diagnostics::new()
    }
}

pub(crate) fn required_id(value: &Value<String>, attribute: &str) -> Result<String> {
    required(value, &AttributePath::root(attribute)).cloned()
}

/// Read-side not-found handling shared by every resource: warn, and drop.
pub(crate) fn drop_if_not_found<S>(
    result: Result<S>,
    resource: &str,
    diags: &mut Diagnostics,
) -> Result<Option<S>> {
    match result {
        Ok(state) => Ok(Some(state)),
        Err(e) if e.is_not_found() => {
            warn!("{} no longer exists, removing from state: {}", resource, e);
            diags.extend(e.to_diagnostics());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Delete-side: a resource that is already gone counts as deleted.
pub(crate) fn deleted_if_not_found(result: Result<()>, diags: &mut Diagnostics) -> Result<()> {
    match result {
        Err(e) if e.is_not_found() => {
            diags.extend(e.to_diagnostics());
            Ok(())
        }
        other => other,
    }
}

/// Span field value for an environment id that may not be known yet.
pub(crate) fn env_field(value: &Value<String>) -> &str {
    value.get().map(String::as_str).unwrap_or_default()
}

pub(crate) fn cancelled_check(ctx: &OperationContext) -> Result<()> {
    if ctx.cancel.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiFailure;

    #[test]
    fn test_finish_folds_errors() {
        let ok: Response<u8> = Response::finish(Ok(Some(1)), Diagnostics::new());
        assert_eq!(ok.state, Some(1));
        assert!(!ok.is_removed());

        let err: Response<u8> = Response::finish(
            Err(Error::Authorization(ApiFailure::new("op", Some(403), None))),
            Diagnostics::new(),
        );
        assert!(err.has_error());
        assert!(!err.is_removed());
    }

    #[test]
    fn test_not_found_drops_with_warning() {
        let mut diags = Diagnostics::new();
        let result: Result<Option<u8>> = drop_if_not_found(
            Err(Error::ResourceNotFound(ApiFailure::new("op", Some(404), None))),
            "thing",
            &mut diags,
        );
        assert_eq!(result.unwrap(), None);
        assert!(diags.mentions("Requested resource not found"));
        assert!(!diags.has_error());
    }
}
