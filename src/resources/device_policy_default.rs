//! `pingone_mfa_device_policy_default`: the environment's default policy.
//!
//! PingOne creates exactly one default policy per environment and refuses
//! to delete it. This resource adopts that policy instead of creating one:
//! Create and Update locate it and overwrite it with the planned settings,
//! and Delete only drops it from state.

use super::device_policy::{check_plan, default_policy_delete_warning, device_policy_schema, planned_policy_type};
use super::import::ImportFormat;
use super::schema::ResourceSchema;
use super::*;
use crate::appref::ApplicationLookup;
use crate::client::ApiClient;
use crate::config::LocatorConfig;
use crate::locator::DefaultPolicyLocator;
use crate::model::DevicePolicyConfig;
use crate::transcode::device_policy::{expand_default, infer_policy_type, to_state};
use crate::wire::DeviceAuthenticationPolicy;
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub const TYPE_NAME: &str = "pingone_mfa_device_policy_default";
pub const IMPORT_FORMAT: ImportFormat = ImportFormat::new(&["environment_id"]);

const NOT_FOUND_SUMMARY: &str = "Default MFA Device Policy Not Found";

pub struct DefaultDevicePolicyResource {
    client: Arc<ApiClient>,
    applications: Arc<dyn ApplicationLookup>,
    locator: DefaultPolicyLocator,
}

impl DefaultDevicePolicyResource {
    pub fn new(client: Arc<ApiClient>, locator: LocatorConfig) -> Self {
        let applications: Arc<dyn ApplicationLookup> = client.clone();
        Self {
            client,
            applications,
            locator: DefaultPolicyLocator::new(locator),
        }
    }

    pub fn with_application_lookup(mut self, applications: Arc<dyn ApplicationLookup>) -> Self {
        self.applications = applications;
        self
    }

    /// The default policy to act on. A policy id already in state is reused
    /// while it is still the default; otherwise the locator searches.
    async fn find_default(
        &self,
        ctx: &OperationContext,
        environment_id: &str,
        known_id: Option<&String>,
        warn_on_not_found: bool,
        diags: &mut Diagnostics,
    ) -> Result<Option<DeviceAuthenticationPolicy>> {
        if let Some(id) = known_id {
            match self.client.read_device_policy(environment_id, id, &ctx.cancel).await {
                Ok(policy) if policy.is_default() => return Ok(Some(policy)),
                Ok(_) => debug!("Policy {} is no longer the default, locating", id),
                Err(Error::ResourceNotFound(_)) => debug!("Policy {} is gone, locating", id),
                Err(e) => return Err(e),
            }
        }

        self.locator
            .locate(&self.client, environment_id, warn_on_not_found, diags, &ctx.cancel)
            .await
    }

    fn require_policy_type(plan: &DevicePolicyConfig) -> Result<()> {
        if plan.policy_type.is_absent() {
            let mut diags = Diagnostics::new();
            diags.add_error_at(
                &AttributePath::root("policy_type"),
                "Missing required argument",
                "The argument \"policy_type\" is required, but no definition was found.",
            );
            return Err(Error::Validation(diags));
        }
        Ok(())
    }

    /// Locate, then PUT the planned settings over the default policy.
    async fn overwrite(
        &self,
        ctx: &OperationContext,
        plan: &DevicePolicyConfig,
        known_id: Option<&String>,
        not_found_detail: &str,
        diags: &mut Diagnostics,
    ) -> Result<Option<DevicePolicyConfig>> {
        Self::require_policy_type(plan)?;
        let (planned, warnings) = check_plan(plan, &self.applications, &ctx.cancel).await?;
        diags.extend(warnings);
        let environment_id = required_id(&planned.environment_id, "environment_id")?;

        let Some(current) = self
            .find_default(ctx, &environment_id, known_id, false, diags)
            .await?
        else {
            diags.add_error(NOT_FOUND_SUMMARY, not_found_detail);
            return Ok(None);
        };
        let id = current
            .id
            .clone()
            .ok_or_else(|| Error::missing_data("default device authentication policy id"))?;

        let mut body = expand_default(&planned)?;
        body.id = Some(id.clone());
        cancelled_check(ctx)?;
        let updated = self
            .client
            .update_device_policy(&environment_id, &id, &body, &ctx.cancel)
            .await?;
        info!("Overwrote default MFA device policy {} in {}", id, environment_id);

        to_state(&updated, &environment_id, planned_policy_type(&planned)).map(Some)
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = env_field(&state.environment_id)))]
    async fn read_default(
        &self,
        ctx: &OperationContext,
        state: &DevicePolicyConfig,
        diags: &mut Diagnostics,
    ) -> Result<Option<DevicePolicyConfig>> {
        let environment_id = required_id(&state.environment_id, "environment_id")?;

        let found = self
            .find_default(ctx, &environment_id, state.id.get(), true, diags)
            .await;
        let Some(policy) = drop_if_not_found(found, TYPE_NAME, diags)?.flatten() else {
            return Ok(None);
        };

        let policy_type = state
            .policy_type()
            .unwrap_or_else(|| infer_policy_type(&policy));
        to_state(&policy, &environment_id, policy_type).map(Some)
    }

    /// Give back the notification policy before leaving the default policy
    /// behind, so that the notification policy itself can be deleted.
    async fn release_notifications_policy(
        &self,
        ctx: &OperationContext,
        state: &DevicePolicyConfig,
        diags: &mut Diagnostics,
    ) -> Result<()> {
        let has_notifications_policy = state
            .notifications_policy
            .get()
            .and_then(|n| n.id.get())
            .is_some_and(|id| !id.is_empty());
        if !has_notifications_policy {
            return Ok(());
        }

        let environment_id = required_id(&state.environment_id, "environment_id")?;
        let id = required_id(&state.id, "id")?;

        let current = match self.client.read_device_policy(&environment_id, &id, &ctx.cancel).await {
            Ok(current) => current,
            Err(e) if e.is_not_found() => return deleted_if_not_found(Err(e), diags),
            Err(e) => return Err(e),
        };

        let mut body = serde_json::to_value(current.without_computed())?;
        body["default"] = serde_json::Value::Bool(true);
        body["notificationsPolicy"] = serde_json::Value::Null;

        let result = self
            .client
            .update_device_policy_raw(&environment_id, &id, body, &ctx.cancel)
            .await
            .map(|_| ());
        deleted_if_not_found(result, diags)
    }
}

#[async_trait]
impl Resource for DefaultDevicePolicyResource {
    type State = DevicePolicyConfig;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        device_policy_schema(
            TYPE_NAME,
            "Manages the default MFA device policy of a PingOne environment.",
            true,
        )
    }

    async fn validate(&self, plan: &DevicePolicyConfig) -> Diagnostics {
        let checked = match Self::require_policy_type(plan) {
            Ok(()) => check_plan(plan, &self.applications, &CancellationToken::new())
                .await
                .map(|(_, w)| w),
            Err(e) => Err(e),
        };
        checked.unwrap_or_else(|e| e.to_diagnostics())
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = env_field(&plan.environment_id)))]
    async fn create(&self, ctx: &OperationContext, plan: &DevicePolicyConfig) -> Response<DevicePolicyConfig> {
        let mut diags = Diagnostics::new();
        let result = self
            .overwrite(
                ctx,
                plan,
                None,
                "Cannot find the default MFA device policy for the environment.",
                &mut diags,
            )
            .await;
        Response::finish(result, diags)
    }

    async fn read(&self, ctx: &OperationContext, state: &DevicePolicyConfig) -> Response<DevicePolicyConfig> {
        let mut diags = Diagnostics::new();
        let result = self.read_default(ctx, state, &mut diags).await;
        Response::finish(result, diags)
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = env_field(&plan.environment_id)))]
    async fn update(
        &self,
        ctx: &OperationContext,
        plan: &DevicePolicyConfig,
        state: &DevicePolicyConfig,
    ) -> Response<DevicePolicyConfig> {
        let mut diags = Diagnostics::new();
        let result = self
            .overwrite(
                ctx,
                plan,
                state.id.get(),
                "The default MFA device policy could not be found to update.",
                &mut diags,
            )
            .await;
        Response::finish(result, diags)
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = env_field(&state.environment_id)))]
    async fn delete(&self, ctx: &OperationContext, state: &DevicePolicyConfig) -> Response<DevicePolicyConfig> {
        let mut diags = Diagnostics::new();
        let result = self.release_notifications_policy(ctx, state, &mut diags).await;
        if result.is_ok() {
            diags.push(default_policy_delete_warning());
        }
        Response::finish(result.map(|_| None), diags)
    }

    fn import(&self, id: &str) -> Result<DevicePolicyConfig> {
        let parts = IMPORT_FORMAT.parse(id)?;
        Ok(DevicePolicyConfig {
            environment_id: Value::Present(parts[0].clone()),
            ..Default::default()
        })
    }

    fn modify_plan(&self, plan: Option<&DevicePolicyConfig>, state: Option<&DevicePolicyConfig>) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if plan.is_none() && state.is_some() {
            diags.push(default_policy_delete_warning());
        }
        diags
    }
}
