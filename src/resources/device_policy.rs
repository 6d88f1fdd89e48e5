//! `pingone_mfa_device_policy`: a regular MFA device policy.

use super::import::ImportFormat;
use super::schema::{AttributeType as T, ResourceSchema};
use super::*;
use crate::appref::{ApplicationLookup, CachedApplicationLookup};
use crate::client::classify::is_default_policy_delete_refusal;
use crate::client::ApiClient;
use crate::diagnostics::Diagnostic;
use crate::model::defaults::*;
use crate::model::{DevicePolicyConfig, PolicyType, POLICY_TYPE_PINGONE_MFA};
use crate::transcode::device_policy::{expand, infer_policy_type, to_state};
use crate::validate::{self, ensure_valid};
use std::sync::Arc;
use tracing::{info, instrument};

pub const TYPE_NAME: &str = "pingone_mfa_device_policy";
pub const IMPORT_FORMAT: ImportFormat = ImportFormat::new(&["environment_id", "mfa_device_policy_id"]);

/// Warning shown whenever the default policy would be deleted.
pub(crate) fn default_policy_delete_warning() -> Diagnostic {
    Diagnostic::warning(
        "Cannot delete the default MFA device policy",
        "Due to API restrictions, the provider cannot delete the default MFA device policy for an environment.  The policy has been removed from state but has been left in place in the PingOne service.",
    )
}

/// Fill plan defaults and run every validator, including the
/// application cross-reference. Returns the defaulted plan and any
/// warnings; validation errors become [`Error::Validation`].
pub(crate) async fn check_plan(
    plan: &DevicePolicyConfig,
    applications: &Arc<dyn ApplicationLookup>,
    cancel: &CancellationToken,
) -> Result<(DevicePolicyConfig, Diagnostics)> {
    let mut planned = plan.clone();
    planned
        .policy_type
        .or_default_with(|| POLICY_TYPE_PINGONE_MFA.to_string());
    planned.apply_defaults();

    let mut diags = validate::device_policy::validate(&planned);
    if let Some(environment_id) = planned.environment_id.get() {
        let lookup = CachedApplicationLookup::new(applications.clone());
        diags.extend(validate::applications::validate(&planned, environment_id, &lookup, cancel).await?);
    }

    let warnings = ensure_valid(diags)?;
    Ok((planned, warnings))
}

pub(crate) fn planned_policy_type(plan: &DevicePolicyConfig) -> PolicyType {
    plan.policy_type().unwrap_or(PolicyType::PingoneMfa)
}

/// Schema shared by both device policy flavors.
pub(crate) fn device_policy_schema(type_name: &str, description: &str, default_flavor: bool) -> ResourceSchema {
    let schema = ResourceSchema::new(type_name, description)
        .computed("id", T::String, "The ID of the MFA device policy.")
        .required("environment_id", T::String, "The ID of the environment the policy belongs to.");

    let schema = if default_flavor {
        schema.required("policy_type", T::String, "One of `pingone_mfa` or `pingid`.")
    } else {
        schema
            .optional_computed("policy_type", T::String, "One of `pingone_mfa` or `pingid`.")
            .default_value(POLICY_TYPE_PINGONE_MFA)
    };

    let mut schema = schema
        .required("name", T::String, "A unique name for the policy.")
        .computed("default", T::Bool, "Whether this is the environment's default policy.")
        .optional_computed("authentication.device_selection", T::String, "How devices are offered during authentication.")
        .default_value(DEVICE_SELECTION_DEFAULT)
        .optional_computed("new_device_notification", T::String, "Notification sent when a new device is paired.")
        .default_value(NEW_DEVICE_NOTIFICATION_DEFAULT)
        .optional_computed("ignore_user_lock", T::Bool, "Whether user lock is ignored for MFA.")
        .default_value(false)
        .optional("notifications_policy.id", T::String, "Notification policy to use for this policy.")
        .optional_computed("remember_me.web.enabled", T::Bool, "Whether remember-me is enabled for web sessions.")
        .default_value(false)
        .optional_computed("remember_me.web.life_time", T::Object, "How long a browser is remembered.")
        .default_value(format!("{} MINUTES", REMEMBER_ME_LIFE_TIME_DEFAULT));

    for factor in ["sms", "voice", "email"] {
        schema = schema
            .required(factor, T::Object, "Offline OTP factor settings.")
            .required(&format!("{factor}.enabled"), T::Bool, "Whether the factor is enabled.")
            .optional_computed(&format!("{factor}.pairing_disabled"), T::Bool, "Stop new pairings.")
            .default_value(false)
            .optional_computed(&format!("{factor}.otp.lifetime"), T::Object, "OTP lifetime.")
            .default_value(format!("{} MINUTES", OFFLINE_OTP_LIFETIME_DEFAULT))
            .optional_computed(&format!("{factor}.otp.failure.count"), T::Int, "Allowed OTP failures.")
            .default_value(OFFLINE_OTP_FAILURE_COUNT_DEFAULT)
            .optional_computed(&format!("{factor}.otp.otp_length"), T::Int, "OTP length, 6 to 10.")
            .default_value(OFFLINE_OTP_LENGTH_DEFAULT);
    }

    schema = schema
        .required("mobile", T::Object, "Mobile application factor settings.")
        .required("mobile.enabled", T::Bool, "Whether mobile applications are enabled.")
        .optional_computed("mobile.otp.failure.count", T::Int, "Allowed OTP failures.")
        .default_value(MOBILE_OTP_FAILURE_COUNT_DEFAULT)
        .optional("mobile.applications", T::Map, "Per-application settings keyed by application ID.")
        .optional("mobile.applications.*.integrity_detection", T::String, "`permissive` or `restrictive`.")
        .optional_computed("mobile.applications.*.push_limit.count", T::Int, "Push requests allowed per period, 1 to 50.")
        .default_value(PUSH_LIMIT_COUNT_DEFAULT)
        .optional("mobile.applications.*.push_timeout", T::Object, "Push timeout, in SECONDS.")
        .optional("mobile.applications.*.new_request_duration_configuration", T::Object, "PingID request timeouts.")
        .optional("mobile.applications.*.ip_pairing_configuration", T::Object, "PingID IP pairing restrictions.")
        .required("totp", T::Object, "TOTP factor settings.")
        .required("totp.enabled", T::Bool, "Whether TOTP is enabled.")
        .optional("totp.uri_parameters", T::Map, "Extra parameters for the TOTP key URI.")
        .optional("fido2", T::Object, "FIDO2 factor settings.")
        .required("fido2.enabled", T::Bool, "Whether FIDO2 is enabled when the block is set.")
        .optional("fido2.fido2_policy_id", T::String, "FIDO2 policy to apply; the environment default when empty.");

    for factor in ["desktop", "yubikey", "oath_token"] {
        schema = schema
            .optional(factor, T::Object, "PingID device factor settings.")
            .optional(&format!("{factor}.enabled"), T::Bool, "Whether the factor is enabled.")
            .optional(&format!("{factor}.pairing_key_lifetime"), T::Object, "Pairing key lifetime.");
    }

    schema.computed("updated_at", T::String, "When the policy was last updated.")
}

pub struct DevicePolicyResource {
    client: Arc<ApiClient>,
    applications: Arc<dyn ApplicationLookup>,
}

impl DevicePolicyResource {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let applications: Arc<dyn ApplicationLookup> = client.clone();
        Self {
            client,
            applications,
        }
    }

    pub fn with_application_lookup(mut self, applications: Arc<dyn ApplicationLookup>) -> Self {
        self.applications = applications;
        self
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = env_field(&plan.environment_id)))]
    async fn create_policy(
        &self,
        ctx: &OperationContext,
        plan: &DevicePolicyConfig,
        diags: &mut Diagnostics,
    ) -> Result<DevicePolicyConfig> {
        cancelled_check(ctx)?;
        let (planned, warnings) = check_plan(plan, &self.applications, &ctx.cancel).await?;
        diags.extend(warnings);
        let environment_id = required_id(&planned.environment_id, "environment_id")?;

        let body = expand(&planned)?;
        cancelled_check(ctx)?;
        let created = self
            .client
            .create_device_policy(&environment_id, &body, &ctx.cancel)
            .await?;
        info!("Created MFA device policy {:?} in {}", created.id, environment_id);

        to_state(&created, &environment_id, planned_policy_type(&planned))
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = env_field(&state.environment_id)))]
    async fn read_policy(
        &self,
        ctx: &OperationContext,
        state: &DevicePolicyConfig,
        diags: &mut Diagnostics,
    ) -> Result<Option<DevicePolicyConfig>> {
        let environment_id = required_id(&state.environment_id, "environment_id")?;
        let id = required_id(&state.id, "id")?;

        let result = self
            .client
            .read_device_policy(&environment_id, &id, &ctx.cancel)
            .await;
        let Some(policy) = drop_if_not_found(result, TYPE_NAME, diags)? else {
            return Ok(None);
        };

        let policy_type = state
            .policy_type()
            .unwrap_or_else(|| infer_policy_type(&policy));
        to_state(&policy, &environment_id, policy_type).map(Some)
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = env_field(&plan.environment_id)))]
    async fn update_policy(
        &self,
        ctx: &OperationContext,
        plan: &DevicePolicyConfig,
        state: &DevicePolicyConfig,
        diags: &mut Diagnostics,
    ) -> Result<DevicePolicyConfig> {
        let (planned, warnings) = check_plan(plan, &self.applications, &ctx.cancel).await?;
        diags.extend(warnings);

        if let (Some(before), Some(after)) = (state.policy_type(), planned.policy_type()) {
            if before != after {
                let mut invalid = Diagnostics::new();
                invalid.add_error_at(
                    &AttributePath::root("policy_type"),
                    "Policy type cannot be changed",
                    format!(
                        "The policy type of an existing policy cannot change from \"{}\" to \"{}\".  The policy must be replaced.",
                        before, after
                    ),
                );
                return Err(Error::Validation(invalid));
            }
        }

        let environment_id = required_id(&state.environment_id, "environment_id")?;
        let id = required_id(&state.id, "id")?;

        let mut body = expand(&planned)?;
        body.id = Some(id.clone());
        let updated = self
            .client
            .update_device_policy(&environment_id, &id, &body, &ctx.cancel)
            .await?;

        to_state(&updated, &environment_id, planned_policy_type(&planned))
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = env_field(&state.environment_id)))]
    async fn delete_policy(
        &self,
        ctx: &OperationContext,
        state: &DevicePolicyConfig,
        diags: &mut Diagnostics,
    ) -> Result<()> {
        let environment_id = required_id(&state.environment_id, "environment_id")?;
        let id = required_id(&state.id, "id")?;

        match self
            .client
            .delete_device_policy(&environment_id, &id, &ctx.cancel)
            .await
        {
            Err(e) if is_default_policy_delete_refusal(&e) => {
                diags.push(default_policy_delete_warning());
                Ok(())
            }
            other => deleted_if_not_found(other, diags),
        }
    }
}

#[async_trait]
impl Resource for DevicePolicyResource {
    type State = DevicePolicyConfig;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        device_policy_schema(TYPE_NAME, "Manages an MFA device policy in a PingOne environment.", false)
    }

    async fn validate(&self, plan: &DevicePolicyConfig) -> Diagnostics {
        match check_plan(plan, &self.applications, &CancellationToken::new()).await {
            Ok((_, warnings)) => warnings,
            Err(e) => e.to_diagnostics(),
        }
    }

    async fn create(&self, ctx: &OperationContext, plan: &DevicePolicyConfig) -> Response<DevicePolicyConfig> {
        let mut diags = Diagnostics::new();
        let result = self.create_policy(ctx, plan, &mut diags).await;
        Response::finish(result.map(Some), diags)
    }

    async fn read(&self, ctx: &OperationContext, state: &DevicePolicyConfig) -> Response<DevicePolicyConfig> {
        let mut diags = Diagnostics::new();
        let result = self.read_policy(ctx, state, &mut diags).await;
        Response::finish(result, diags)
    }

    async fn update(
        &self,
        ctx: &OperationContext,
        plan: &DevicePolicyConfig,
        state: &DevicePolicyConfig,
    ) -> Response<DevicePolicyConfig> {
        let mut diags = Diagnostics::new();
        let result = self.update_policy(ctx, plan, state, &mut diags).await;
        Response::finish(result.map(Some), diags)
    }

    async fn delete(&self, ctx: &OperationContext, state: &DevicePolicyConfig) -> Response<DevicePolicyConfig> {
        let mut diags = Diagnostics::new();
        let result = self.delete_policy(ctx, state, &mut diags).await;
        Response::finish(result.map(|_| None), diags)
    }

    fn import(&self, id: &str) -> Result<DevicePolicyConfig> {
        let parts = IMPORT_FORMAT.parse(id)?;
        Ok(DevicePolicyConfig {
            environment_id: Value::Present(parts[0].clone()),
            id: Value::Present(parts[1].clone()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appref::testing::StaticLookup;
    use crate::config::ClientConfig;

    fn resource() -> DevicePolicyResource {
        let client = Arc::new(ApiClient::new(&ClientConfig::default()).unwrap());
        DevicePolicyResource::new(client).with_application_lookup(Arc::new(StaticLookup::default()))
    }

    #[test]
    fn test_import_round_trip() {
        let id = "0c0a4c39-3b4e-4b0e-9a5e-3e6f6f6f6f6f/5a1b2c3d-0000-4000-8000-00000000beef";
        let state = resource().import(id).unwrap();
        let formatted = IMPORT_FORMAT.format(&[
            state.environment_id.get().unwrap().as_str(),
            state.id.get().unwrap().as_str(),
        ]);
        assert_eq!(formatted, id);
        assert!(resource().import("nope").is_err());
    }

    #[test]
    fn test_schema_defaults() {
        let schema = resource().schema();
        let policy_type = schema.attribute("policy_type").unwrap();
        assert!(policy_type.flags.optional);
        assert_eq!(policy_type.default.as_deref(), Some("pingone_mfa"));
        assert_eq!(
            schema.attribute("sms.otp.lifetime").unwrap().default.as_deref(),
            Some("30 MINUTES")
        );
    }

    #[tokio::test]
    async fn test_create_with_enabled_desktop_on_pingone_mfa_makes_no_call() {
        let plan = DevicePolicyConfig::from_toml(
            r#"
            environment_id = "0c0a4c39-3b4e-4b0e-9a5e-3e6f6f6f6f6f"
            policy_type = "pingone_mfa"
            name = "p1"
            [sms]
            enabled = true
            [voice]
            enabled = true
            [email]
            enabled = true
            [mobile]
            enabled = false
            [totp]
            enabled = true
            [desktop]
            enabled = true
            "#,
        )
        .unwrap();

        let response = resource().create(&OperationContext::new(), &plan).await;
        assert!(response.state.is_none());
        assert!(response.diagnostics.mentions("Invalid argument combination"));
        assert!(!response.diagnostics.mentions("Missing Configuration"));
    }

    #[test]
    fn test_schema_marks_factor_blocks_required() {
        let schema = resource().schema();
        for path in [
            "sms", "sms.enabled", "voice", "voice.enabled", "email", "email.enabled", "mobile",
            "mobile.enabled", "totp", "totp.enabled", "fido2.enabled",
        ] {
            assert!(schema.attribute(path).unwrap().flags.required, "{path}");
        }
        assert!(!schema.attribute("fido2").unwrap().flags.required);
        assert!(!schema.attribute("desktop").unwrap().flags.required);
    }
}
