//! `pingone_mfa_device_policies` data source: the ids of every device
//! authentication policy in an environment.

use super::*;
use crate::client::ApiClient;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

pub const TYPE_NAME: &str = "pingone_mfa_device_policies";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DevicePoliciesState {
    pub environment_id: String,
    pub ids: Vec<String>,
}

pub struct DevicePoliciesDataSource {
    client: Arc<ApiClient>,
}

impl DevicePoliciesDataSource {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn schema(&self) -> ResourceSchema {
        use schema::AttributeType as T;
        ResourceSchema::new(TYPE_NAME, "Lists the MFA device policies of a PingOne environment.")
            .required("environment_id", T::String, "The ID of the environment.")
            .computed("ids", T::List, "The IDs of the device policies, in API order.")
    }

    #[instrument(skip_all, fields(resource = TYPE_NAME, request_id = %ctx.request_id, environment_id = %environment_id))]
    pub async fn read(&self, ctx: &OperationContext, environment_id: &str) -> Response<DevicePoliciesState> {
        let result = self.list(ctx, environment_id).await;
        Response::finish(result.map(Some), Diagnostics::new())
    }

    async fn list(&self, ctx: &OperationContext, environment_id: &str) -> Result<DevicePoliciesState> {
        let policies = self
            .client
            .list_device_policies(environment_id, &ctx.cancel)
            .await?;
        let ids: Vec<String> = policies.into_iter().filter_map(|p| p.id).collect();
        debug!("Found {} device policies", ids.len());

        Ok(DevicePoliciesState {
            environment_id: environment_id.to_string(),
            ids,
        })
    }
}
