//! `pingone_mfa_policies`: bulk FIDO2 migration of device policies.
//!
//! Create posts the migration once. The service keeps no migration
//! object, so Read, Update and Delete never call the API and import is
//! not supported.

use super::schema::{AttributeType as T, ResourceSchema};
use super::*;
use crate::client::ApiClient;
use crate::model::DevicePolicyMigrationConfig;
use crate::transcode::device_policy_migration::{expand, to_state};
use crate::validate::{self, ensure_valid};
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub const TYPE_NAME: &str = "pingone_mfa_policies";

pub struct DevicePolicyMigrationResource {
    client: Arc<ApiClient>,
}

impl DevicePolicyMigrationResource {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    fn check_plan(plan: &DevicePolicyMigrationConfig) -> Result<Diagnostics> {
        ensure_valid(validate::device_policy_migration::validate(plan))
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = env_field(&plan.environment_id)))]
    async fn migrate(
        &self,
        ctx: &OperationContext,
        plan: &DevicePolicyMigrationConfig,
        diags: &mut Diagnostics,
    ) -> Result<DevicePolicyMigrationConfig> {
        diags.extend(Self::check_plan(plan)?);
        let environment_id = required_id(&plan.environment_id, "environment_id")?;

        let body = expand(plan)?;
        cancelled_check(ctx)?;
        self.client
            .migrate_device_policies(&environment_id, &body, &ctx.cancel)
            .await?;
        info!(
            "Migrated {} MFA device policies to FIDO2 in {}",
            body.migrate_data.len(),
            environment_id
        );

        Ok(to_state(plan))
    }
}

#[async_trait]
impl Resource for DevicePolicyMigrationResource {
    type State = DevicePolicyMigrationConfig;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(
            TYPE_NAME,
            "Resource to create and manage bulk settings of MFA device policies in a PingOne environment.",
        )
        .computed("id", T::String, "The ID of this resource.")
        .required("environment_id", T::String, "The ID of the environment to configure MFA device policies in.")
        .required("migrate_data", T::Set, "A set of objects that describe MFA Device policies to migrate.")
        .required(
            "migrate_data.*.device_authentication_policy_id",
            T::String,
            "The ID of an MFA Device policy to migrate.",
        )
        .optional(
            "migrate_data.*.fido2_policy_id",
            T::String,
            "The ID of a FIDO2 policy to assign to the new FIDO2 device type.",
        )
    }

    async fn validate(&self, plan: &DevicePolicyMigrationConfig) -> Diagnostics {
        Self::check_plan(plan).unwrap_or_else(|e| e.to_diagnostics())
    }

    async fn create(
        &self,
        ctx: &OperationContext,
        plan: &DevicePolicyMigrationConfig,
    ) -> Response<DevicePolicyMigrationConfig> {
        let mut diags = Diagnostics::new();
        let result = self.migrate(ctx, plan, &mut diags).await;
        Response::finish(result.map(Some), diags)
    }

    async fn read(
        &self,
        _ctx: &OperationContext,
        state: &DevicePolicyMigrationConfig,
    ) -> Response<DevicePolicyMigrationConfig> {
        Response::finish(Ok(Some(state.clone())), Diagnostics::new())
    }

    /// Any change to `migrate_data` replaces the resource, so an in-place
    /// update only carries the existing id forward.
    async fn update(
        &self,
        _ctx: &OperationContext,
        plan: &DevicePolicyMigrationConfig,
        state: &DevicePolicyMigrationConfig,
    ) -> Response<DevicePolicyMigrationConfig> {
        let updated = DevicePolicyMigrationConfig {
            id: state.id.clone(),
            ..plan.clone()
        };
        Response::finish(Ok(Some(to_state(&updated))), Diagnostics::new())
    }

    async fn delete(
        &self,
        _ctx: &OperationContext,
        state: &DevicePolicyMigrationConfig,
    ) -> Response<DevicePolicyMigrationConfig> {
        debug!("Dropping {} {:?} from state only", TYPE_NAME, state.id);
        Response::finish(Ok(None), Diagnostics::new())
    }

    fn import(&self, id: &str) -> Result<DevicePolicyMigrationConfig> {
        Err(Error::ImportIdentifier(format!(
            "Resource {} does not support import (\"{}\").",
            TYPE_NAME, id
        )))
    }
}
