//! `pingone_mfa_settings`: the per-environment MFA settings singleton.
//!
//! There is nothing to create or delete on the service side. Create and
//! Update both PUT the settings; Delete resets them to service defaults.

use super::import::ImportFormat;
use super::schema::{AttributeType as T, ResourceSchema};
use super::*;
use crate::client::classify::OperationKind;
use crate::client::ApiClient;
use crate::model::{MfaSettingsConfig, MAX_ALLOWED_DEVICES_DEFAULT};
use crate::transcode::mfa_settings::{expand, to_state};
use crate::validate::{self, ensure_valid};
use std::sync::Arc;
use tracing::{info, instrument};

pub const TYPE_NAME: &str = "pingone_mfa_settings";
pub const IMPORT_FORMAT: ImportFormat = ImportFormat::new(&["environment_id"]);

pub struct MfaSettingsResource {
    client: Arc<ApiClient>,
}

impl MfaSettingsResource {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    fn check_plan(plan: &MfaSettingsConfig) -> Result<(MfaSettingsConfig, Diagnostics)> {
        let mut planned = plan.clone();
        planned.apply_defaults();
        let warnings = ensure_valid(validate::mfa_settings::validate(&planned))?;
        Ok((planned, warnings))
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = env_field(&plan.environment_id)))]
    async fn put_settings(
        &self,
        ctx: &OperationContext,
        plan: &MfaSettingsConfig,
        kind: OperationKind,
        diags: &mut Diagnostics,
    ) -> Result<MfaSettingsConfig> {
        let (planned, warnings) = Self::check_plan(plan)?;
        diags.extend(warnings);
        let environment_id = required_id(&planned.environment_id, "environment_id")?;

        let body = expand(&planned)?;
        cancelled_check(ctx)?;
        let settings = self
            .client
            .update_mfa_settings(&environment_id, &body, kind, &ctx.cancel)
            .await?;
        info!("Applied MFA settings to environment {}", environment_id);

        Ok(to_state(&settings, &environment_id))
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = env_field(&state.environment_id)))]
    async fn read_settings(
        &self,
        ctx: &OperationContext,
        state: &MfaSettingsConfig,
        diags: &mut Diagnostics,
    ) -> Result<Option<MfaSettingsConfig>> {
        let environment_id = required_id(&state.environment_id, "environment_id")?;
        let result = self.client.read_mfa_settings(&environment_id, &ctx.cancel).await;
        Ok(drop_if_not_found(result, TYPE_NAME, diags)?.map(|s| to_state(&s, &environment_id)))
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = env_field(&state.environment_id)))]
    async fn reset_settings(
        &self,
        ctx: &OperationContext,
        state: &MfaSettingsConfig,
        diags: &mut Diagnostics,
    ) -> Result<()> {
        let environment_id = required_id(&state.environment_id, "environment_id")?;
        let result = self.client.reset_mfa_settings(&environment_id, &ctx.cancel).await;
        deleted_if_not_found(result, diags)
    }
}

#[async_trait]
impl Resource for MfaSettingsResource {
    type State = MfaSettingsConfig;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(TYPE_NAME, "Manages the MFA settings of a PingOne environment.")
            .computed("id", T::String, "Same as `environment_id`.")
            .required("environment_id", T::String, "The ID of the environment.")
            .required("pairing", T::Object, "Device pairing settings.")
            .optional_computed("pairing.max_allowed_devices", T::Int, "Devices a user may pair, 1 to 15.")
            .default_value(MAX_ALLOWED_DEVICES_DEFAULT)
            .required("pairing.pairing_key_format", T::String, "`NUMERIC` or `ALPHANUMERIC`.")
            .optional("lockout", T::Object, "Lockout after repeated failures.")
            .required("lockout.failure_count", T::Int, "Failures before lockout.")
            .optional("lockout.duration_seconds", T::Int, "How long a user stays locked out.")
            .optional_computed("phone_extensions.enabled", T::Bool, "Whether phone extensions are allowed.")
            .default_value(false)
            .optional_computed("users.mfa_enabled", T::Bool, "Whether MFA is enabled for new users.")
            .default_value(true)
    }

    async fn validate(&self, plan: &MfaSettingsConfig) -> Diagnostics {
        match Self::check_plan(plan) {
            Ok((_, warnings)) => warnings,
            Err(e) => e.to_diagnostics(),
        }
    }

    async fn create(&self, ctx: &OperationContext, plan: &MfaSettingsConfig) -> Response<MfaSettingsConfig> {
        let mut diags = Diagnostics::new();
        let result = self.put_settings(ctx, plan, OperationKind::Create, &mut diags).await;
        Response::finish(result.map(Some), diags)
    }

    async fn read(&self, ctx: &OperationContext, state: &MfaSettingsConfig) -> Response<MfaSettingsConfig> {
        let mut diags = Diagnostics::new();
        let result = self.read_settings(ctx, state, &mut diags).await;
        Response::finish(result, diags)
    }

    async fn update(
        &self,
        ctx: &OperationContext,
        plan: &MfaSettingsConfig,
        _state: &MfaSettingsConfig,
    ) -> Response<MfaSettingsConfig> {
        let mut diags = Diagnostics::new();
        let result = self.put_settings(ctx, plan, OperationKind::Update, &mut diags).await;
        Response::finish(result.map(Some), diags)
    }

    async fn delete(&self, ctx: &OperationContext, state: &MfaSettingsConfig) -> Response<MfaSettingsConfig> {
        let mut diags = Diagnostics::new();
        let result = self.reset_settings(ctx, state, &mut diags).await;
        Response::finish(result.map(|_| None), diags)
    }

    fn import(&self, id: &str) -> Result<MfaSettingsConfig> {
        let parts = IMPORT_FORMAT.parse(id)?;
        Ok(MfaSettingsConfig {
            id: Value::Present(parts[0].clone()),
            environment_id: Value::Present(parts[0].clone()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    fn resource() -> MfaSettingsResource {
        MfaSettingsResource::new(Arc::new(ApiClient::new(&ClientConfig::default()).unwrap()))
    }

    #[test]
    fn test_import_by_environment() {
        let state = resource().import("0c0a4c39-3b4e-4b0e-9a5e-3e6f6f6f6f6f").unwrap();
        assert_eq!(state.id, state.environment_id);
    }

    #[tokio::test]
    async fn test_missing_pairing_is_rejected_before_any_call() {
        let plan = MfaSettingsConfig {
            environment_id: Value::Present("0c0a4c39-3b4e-4b0e-9a5e-3e6f6f6f6f6f".into()),
            ..Default::default()
        };
        let diags = resource().validate(&plan).await;
        assert!(diags.mentions("The argument pairing is required."));
    }
}
