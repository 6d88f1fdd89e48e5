//! `pingone_mfa_application_push_credential`
//!
//! Credential secrets are write-only. Read only confirms the credential
//! still exists and keeps the secrets already in state.

use super::import::ImportFormat;
use super::schema::{AttributeType as T, ResourceSchema};
use super::*;
use crate::client::ApiClient;
use crate::model::PushCredentialConfig;
use crate::transcode::push_credential::{expand, to_state};
use crate::validate::{self, ensure_valid};
use std::sync::Arc;
use tracing::{info, instrument};

pub const TYPE_NAME: &str = "pingone_mfa_application_push_credential";
pub const IMPORT_FORMAT: ImportFormat =
    ImportFormat::new(&["environment_id", "application_id", "push_credential_id"]);

pub struct PushCredentialResource {
    client: Arc<ApiClient>,
}

impl PushCredentialResource {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    fn check_plan(plan: &PushCredentialConfig) -> Result<Diagnostics> {
        ensure_valid(validate::push_credential::validate(plan))
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = env_field(&plan.environment_id)))]
    async fn create_credential(
        &self,
        ctx: &OperationContext,
        plan: &PushCredentialConfig,
        diags: &mut Diagnostics,
    ) -> Result<PushCredentialConfig> {
        diags.extend(Self::check_plan(plan)?);
        let environment_id = required_id(&plan.environment_id, "environment_id")?;
        let application_id = required_id(&plan.application_id, "application_id")?;

        let body = expand(plan)?;
        cancelled_check(ctx)?;
        let created = self
            .client
            .create_push_credential(&environment_id, &application_id, &body, &ctx.cancel)
            .await?;
        info!(
            "Created {} push credential {} for application {}",
            created.credential_type, created.id, application_id
        );

        Ok(to_state(&created, plan))
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = env_field(&state.environment_id)))]
    async fn read_credential(
        &self,
        ctx: &OperationContext,
        state: &PushCredentialConfig,
        diags: &mut Diagnostics,
    ) -> Result<Option<PushCredentialConfig>> {
        let environment_id = required_id(&state.environment_id, "environment_id")?;
        let application_id = required_id(&state.application_id, "application_id")?;
        let id = required_id(&state.id, "id")?;

        let result = self
            .client
            .read_push_credential(&environment_id, &application_id, &id, &ctx.cancel)
            .await;
        Ok(drop_if_not_found(result, TYPE_NAME, diags)?.map(|response| to_state(&response, state)))
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = env_field(&state.environment_id)))]
    async fn update_credential(
        &self,
        ctx: &OperationContext,
        plan: &PushCredentialConfig,
        state: &PushCredentialConfig,
        diags: &mut Diagnostics,
    ) -> Result<PushCredentialConfig> {
        diags.extend(Self::check_plan(plan)?);
        let environment_id = required_id(&state.environment_id, "environment_id")?;
        let application_id = required_id(&state.application_id, "application_id")?;
        let id = required_id(&state.id, "id")?;

        let body = expand(plan)?;
        let updated = self
            .client
            .update_push_credential(&environment_id, &application_id, &id, &body, &ctx.cancel)
            .await?;

        Ok(to_state(&updated, plan))
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = env_field(&state.environment_id)))]
    async fn delete_credential(
        &self,
        ctx: &OperationContext,
        state: &PushCredentialConfig,
        diags: &mut Diagnostics,
    ) -> Result<()> {
        let environment_id = required_id(&state.environment_id, "environment_id")?;
        let application_id = required_id(&state.application_id, "application_id")?;
        let id = required_id(&state.id, "id")?;

        let result = self
            .client
            .delete_push_credential(&environment_id, &application_id, &id, &ctx.cancel)
            .await;
        deleted_if_not_found(result, diags)
    }
}

#[async_trait]
impl Resource for PushCredentialResource {
    type State = PushCredentialConfig;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(TYPE_NAME, "Manages a push notification credential of a PingOne native application.")
            .computed("id", T::String, "The ID of the push credential.")
            .required("environment_id", T::String, "The ID of the environment.")
            .required("application_id", T::String, "The ID of the native application.")
            .optional("fcm", T::Object, "Firebase Cloud Messaging credentials.")
            .required("fcm.google_service_account_credentials", T::String, "Service account key JSON.")
            .sensitive()
            .optional("apns", T::Object, "Apple Push Notification service credentials.")
            .required("apns.key", T::String, "The APNs key ID.")
            .sensitive()
            .required("apns.team_id", T::String, "The Apple team ID.")
            .required("apns.token_signing_key", T::String, "The APNs authentication token signing key.")
            .sensitive()
            .optional("hms", T::Object, "Huawei Mobile Services credentials.")
            .required("hms.client_id", T::String, "The OAuth 2.0 client ID.")
            .required("hms.client_secret", T::String, "The OAuth 2.0 client secret.")
            .sensitive()
    }

    async fn validate(&self, plan: &PushCredentialConfig) -> Diagnostics {
        Self::check_plan(plan).unwrap_or_else(|e| e.to_diagnostics())
    }

    async fn create(&self, ctx: &OperationContext, plan: &PushCredentialConfig) -> Response<PushCredentialConfig> {
        let mut diags = Diagnostics::new();
        let result = self.create_credential(ctx, plan, &mut diags).await;
        Response::finish(result.map(Some), diags)
    }

    async fn read(&self, ctx: &OperationContext, state: &PushCredentialConfig) -> Response<PushCredentialConfig> {
        let mut diags = Diagnostics::new();
        let result = self.read_credential(ctx, state, &mut diags).await;
        Response::finish(result, diags)
    }

    async fn update(
        &self,
        ctx: &OperationContext,
        plan: &PushCredentialConfig,
        state: &PushCredentialConfig,
    ) -> Response<PushCredentialConfig> {
        let mut diags = Diagnostics::new();
        let result = self.update_credential(ctx, plan, state, &mut diags).await;
        Response::finish(result.map(Some), diags)
    }

    async fn delete(&self, ctx: &OperationContext, state: &PushCredentialConfig) -> Response<PushCredentialConfig> {
        let mut diags = Diagnostics::new();
        let result = self.delete_credential(ctx, state, &mut diags).await;
        Response::finish(result.map(|_| None), diags)
    }

    fn import(&self, id: &str) -> Result<PushCredentialConfig> {
        let parts = IMPORT_FORMAT.parse(id)?;
        Ok(PushCredentialConfig {
            environment_id: Value::Present(parts[0].clone()),
            application_id: Value::Present(parts[1].clone()),
            id: Value::Present(parts[2].clone()),
            ..Default::default()
        })
    }
}
