//! Configuration model of the bulk FIDO2 migration of device policies.

use crate::value::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrateDataConfig {
    pub device_authentication_policy_id: Value<String>,
    pub fido2_policy_id: Value<String>,
}

/// One-shot migration. Nothing is read back from the service, so state is
/// the plan plus a locally generated id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevicePolicyMigrationConfig {
    pub id: Value<String>,
    pub environment_id: Value<String>,
    pub migrate_data: Value<Vec<MigrateDataConfig>>,
}

impl DevicePolicyMigrationConfig {
    pub fn from_toml(text: &str) -> crate::error::Result<Self> {
        toml::from_str(text).map_err(|e| crate::error::Error::Config(e.to_string()))
    }
}
