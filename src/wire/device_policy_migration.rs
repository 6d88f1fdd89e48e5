//! FIDO2 migration request for device authentication policies.

use serde::{Deserialize, Serialize};

/// Content type that turns a POST to the device policy collection into a
/// FIDO2 migration instead of a policy create.
pub const FIDO2_MIGRATE_CONTENT_TYPE: &str =
    "application/vnd.pingidentity.deviceAuthenticationPolicy.fido2.migrate+json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePolicyMigrateData {
    pub device_authentication_policy_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fido2_policy_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePolicyMigration {
    pub migrate_data: Vec<DevicePolicyMigrateData>,
}
