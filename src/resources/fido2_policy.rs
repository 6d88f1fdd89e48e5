//! `pingone_mfa_fido2_policy`

use super::import::ImportFormat;
use super::schema::{AttributeType as T, ResourceSchema};
use super::*;
use crate::client::ApiClient;
use crate::diagnostics::Diagnostic;
use crate::model::{Fido2PolicyConfig, USER_PRESENCE_TIMEOUT_DURATION_DEFAULT, USER_PRESENCE_TIMEOUT_UNIT_DEFAULT};
use crate::transcode::fido2_policy::{expand, to_state};
use crate::validate::{self, ensure_valid};
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const TYPE_NAME: &str = "pingone_mfa_fido2_policy";
pub const IMPORT_FORMAT: ImportFormat = ImportFormat::new(&["environment_id", "fido2_policy_id"]);

const CODE_CONSTRAINT_VIOLATION: &str = "CONSTRAINT_VIOLATION";

fn default_policy_delete_warning() -> Diagnostic {
    Diagnostic::warning(
        "Cannot delete the default MFA FIDO2 policy",
        "The environment's default FIDO2 policy cannot be deleted.  The policy has been removed from state but has been left in place in the PingOne service.",
    )
}

fn check_plan(plan: &Fido2PolicyConfig) -> Result<(Fido2PolicyConfig, Diagnostics)> {
    let mut planned = plan.clone();
    planned.apply_defaults();
    let warnings = ensure_valid(validate::fido2_policy::validate(&planned))?;
    Ok((planned, warnings))
}

pub struct Fido2PolicyResource {
    client: Arc<ApiClient>,
}

impl Fido2PolicyResource {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = env_field(&plan.environment_id)))]
    async fn create_policy(
        &self,
        ctx: &OperationContext,
        plan: &Fido2PolicyConfig,
        diags: &mut Diagnostics,
    ) -> Result<Fido2PolicyConfig> {
        let (planned, warnings) = check_plan(plan)?;
        diags.extend(warnings);
        let environment_id = required_id(&planned.environment_id, "environment_id")?;

        let body = expand(&planned)?;
        cancelled_check(ctx)?;
        let created = self
            .client
            .create_fido2_policy(&environment_id, &body, &ctx.cancel)
            .await?;
        info!("Created FIDO2 policy {:?} in {}", created.id, environment_id);

        to_state(&created, &environment_id)
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = env_field(&state.environment_id)))]
    async fn read_policy(
        &self,
        ctx: &OperationContext,
        state: &Fido2PolicyConfig,
        diags: &mut Diagnostics,
    ) -> Result<Option<Fido2PolicyConfig>> {
        let environment_id = required_id(&state.environment_id, "environment_id")?;
        let id = required_id(&state.id, "id")?;

        let result = self.client.read_fido2_policy(&environment_id, &id, &ctx.cancel).await;
        match drop_if_not_found(result, TYPE_NAME, diags)? {
            Some(policy) => to_state(&policy, &environment_id).map(Some),
            None => Ok(None),
        }
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = env_field(&state.environment_id)))]
    async fn update_policy(
        &self,
        ctx: &OperationContext,
        plan: &Fido2PolicyConfig,
        state: &Fido2PolicyConfig,
        diags: &mut Diagnostics,
    ) -> Result<Fido2PolicyConfig> {
        let (planned, warnings) = check_plan(plan)?;
        diags.extend(warnings);
        let environment_id = required_id(&state.environment_id, "environment_id")?;
        let id = required_id(&state.id, "id")?;

        let mut body = expand(&planned)?;
        body.id = Some(id.clone());
        let updated = self
            .client
            .update_fido2_policy(&environment_id, &id, &body, &ctx.cancel)
            .await?;

        to_state(&updated, &environment_id)
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = env_field(&state.environment_id)))]
    async fn delete_policy(
        &self,
        ctx: &OperationContext,
        state: &Fido2PolicyConfig,
        diags: &mut Diagnostics,
    ) -> Result<()> {
        if state.default.copied().unwrap_or(false) {
            warn!("Leaving the default FIDO2 policy {:?} in place", state.id.get());
            diags.push(default_policy_delete_warning());
            return Ok(());
        }

        let environment_id = required_id(&state.environment_id, "environment_id")?;
        let id = required_id(&state.id, "id")?;

        match self.client.delete_fido2_policy(&environment_id, &id, &ctx.cancel).await {
            Err(Error::ServerValidation(failure)) if failure.code_is(CODE_CONSTRAINT_VIOLATION) => {
                warn!("FIDO2 policy {} refused deletion: {}", id, failure);
                diags.push(default_policy_delete_warning());
                Ok(())
            }
            other => deleted_if_not_found(other, diags),
        }
    }
}

#[async_trait]
impl Resource for Fido2PolicyResource {
    type State = Fido2PolicyConfig;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(TYPE_NAME, "Manages a FIDO2 policy in a PingOne environment.")
            .computed("id", T::String, "The ID of the FIDO2 policy.")
            .required("environment_id", T::String, "The ID of the environment the policy belongs to.")
            .required("name", T::String, "A unique name for the policy.")
            .optional("description", T::String, "A description of the policy.")
            .computed("default", T::Bool, "Whether this is the environment's default FIDO2 policy.")
            .required("attestation_requirements", T::String, "`DIRECT` or `NONE`.")
            .required("authenticator_attachment", T::String, "`PLATFORM`, `CROSS_PLATFORM` or `BOTH`.")
            .required("backup_eligibility.allow", T::Bool, "Whether backup-eligible credentials may be registered.")
            .required("backup_eligibility.enforce_during_authentication", T::Bool, "Enforce the backup setting at authentication.")
            .required("device_display_name", T::String, "Display name given to new FIDO2 devices.")
            .required("discoverable_credentials", T::String, "`REQUIRED`, `PREFERRED` or `DISCOURAGED`.")
            .required("mds_authenticators_requirements.option", T::String, "`NONE`, `GLOBAL`, `CERTIFIED`, `AUDIT_ONLY` or `SPECIFIC`.")
            .required("mds_authenticators_requirements.enforce_during_authentication", T::Bool, "Enforce the MDS requirement at authentication.")
            .optional("mds_authenticators_requirements.allowed_authenticator_ids", T::Set, "Authenticators allowed when `option` is `SPECIFIC`.")
            .required("relying_party_id", T::String, "The domain of the relying party.")
            .required("user_display_name_attributes.attributes", T::List, "User attributes shown as the display name; must include `username`.")
            .optional_computed("user_presence_timeout", T::Object, "How long to wait for user presence.")
            .default_value(format!(
                "{} {}",
                USER_PRESENCE_TIMEOUT_DURATION_DEFAULT, USER_PRESENCE_TIMEOUT_UNIT_DEFAULT
            ))
            .required("user_verification.option", T::String, "`REQUIRED`, `PREFERRED` or `DISCOURAGED`.")
            .required("user_verification.enforce_during_authentication", T::Bool, "Enforce user verification at authentication.")
            .computed("created_at", T::String, "When the policy was created.")
            .computed("updated_at", T::String, "When the policy was last updated.")
    }

    async fn validate(&self, plan: &Fido2PolicyConfig) -> Diagnostics {
        match check_plan(plan) {
            Ok((_, warnings)) => warnings,
            Err(e) => e.to_diagnostics(),
        }
    }

    async fn create(&self, ctx: &OperationContext, plan: &Fido2PolicyConfig) -> Response<Fido2PolicyConfig> {
        let mut diags = Diagnostics::new();
        let result = self.create_policy(ctx, plan, &mut diags).await;
        Response::finish(result.map(Some), diags)
    }

    async fn read(&self, ctx: &OperationContext, state: &Fido2PolicyConfig) -> Response<Fido2PolicyConfig> {
        let mut diags = Diagnostics::new();
        let result = self.read_policy(ctx, state, &mut diags).await;
        Response::finish(result, diags)
    }

    async fn update(
        &self,
        ctx: &OperationContext,
        plan: &Fido2PolicyConfig,
        state: &Fido2PolicyConfig,
    ) -> Response<Fido2PolicyConfig> {
        let mut diags = Diagnostics::new();
        let result = self.update_policy(ctx, plan, state, &mut diags).await;
        Response::finish(result.map(Some), diags)
    }

    async fn delete(&self, ctx: &OperationContext, state: &Fido2PolicyConfig) -> Response<Fido2PolicyConfig> {
        let mut diags = Diagnostics::new();
        let result = self.delete_policy(ctx, state, &mut diags).await;
        Response::finish(result.map(|_| None), diags)
    }

    fn import(&self, id: &str) -> Result<Fido2PolicyConfig> {
        let parts = IMPORT_FORMAT.parse(id)?;
        Ok(Fido2PolicyConfig {
            environment_id: Value::Present(parts[0].clone()),
            id: Value::Present(parts[1].clone()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    fn resource() -> Fido2PolicyResource {
        Fido2PolicyResource::new(Arc::new(ApiClient::new(&ClientConfig::default()).unwrap()))
    }

    #[tokio::test]
    async fn test_default_policy_delete_skips_api() {
        let state = Fido2PolicyConfig {
            environment_id: Value::Present("0c0a4c39-3b4e-4b0e-9a5e-3e6f6f6f6f6f".into()),
            id: Value::Present("5a1b2c3d-0000-4000-8000-00000000beef".into()),
            default: Value::Present(true),
            ..Default::default()
        };
        let response = resource().delete(&OperationContext::new(), &state).await;
        assert!(response.is_removed());
        assert!(response.diagnostics.mentions("Cannot delete the default MFA FIDO2 policy"));
    }

    #[tokio::test]
    async fn test_invalid_plan_makes_no_call() {
        let plan = Fido2PolicyConfig {
            environment_id: Value::Present("0c0a4c39-3b4e-4b0e-9a5e-3e6f6f6f6f6f".into()),
            name: Value::Present("fido".into()),
            relying_party_id: Value::Present("not a domain".into()),
            ..Default::default()
        };
        let response = resource().create(&OperationContext::new(), &plan).await;
        assert!(response.has_error());
        assert!(response.state.is_none());
    }

    #[test]
    fn test_schema_user_presence_default() {
        let schema = resource().schema();
        assert_eq!(
            schema.attribute("user_presence_timeout").unwrap().default.as_deref(),
            Some("2 MINUTES")
        );
        assert!(schema.attribute("relying_party_id").unwrap().flags.required);
    }
}
