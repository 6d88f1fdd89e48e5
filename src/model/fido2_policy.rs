//! Configuration model of a FIDO2 policy.

use super::device_policy::TimePeriodConfig;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const USER_PRESENCE_TIMEOUT_DURATION_DEFAULT: i32 = 2;
pub const USER_PRESENCE_TIMEOUT_UNIT_DEFAULT: &str = "MINUTES";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupEligibilityConfig {
    pub allow: Value<bool>,
    pub enforce_during_authentication: Value<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MdsAuthenticatorsRequirementsConfig {
    pub allowed_authenticator_ids: Value<BTreeSet<String>>,
    pub enforce_during_authentication: Value<bool>,
    pub option: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubAttributeConfig {
    pub name: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayNameAttributeConfig {
    pub name: Value<String>,
    pub sub_attributes: Value<Vec<SubAttributeConfig>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserDisplayNameAttributesConfig {
    pub attributes: Value<Vec<DisplayNameAttributeConfig>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserVerificationConfig {
    pub enforce_during_authentication: Value<bool>,
    pub option: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fido2PolicyConfig {
    pub id: Value<String>,
    pub environment_id: Value<String>,
    pub name: Value<String>,
    pub description: Value<String>,
    pub default: Value<bool>,
    pub attestation_requirements: Value<String>,
    pub authenticator_attachment: Value<String>,
    pub backup_eligibility: Value<BackupEligibilityConfig>,
    pub device_display_name: Value<String>,
    pub discoverable_credentials: Value<String>,
    pub mds_authenticators_requirements: Value<MdsAuthenticatorsRequirementsConfig>,
    pub relying_party_id: Value<String>,
    pub user_display_name_attributes: Value<UserDisplayNameAttributesConfig>,
    pub user_presence_timeout: Value<TimePeriodConfig>,
    pub user_verification: Value<UserVerificationConfig>,
}

impl Fido2PolicyConfig {
    pub fn apply_defaults(&mut self) {
        self.user_presence_timeout
            .or_default_with(TimePeriodConfig::default);
        if let Some(timeout) = self.user_presence_timeout.get_mut() {
            timeout
                .duration
                .or_default_with(|| USER_PRESENCE_TIMEOUT_DURATION_DEFAULT);
            timeout
                .time_unit
                .or_default_with(|| USER_PRESENCE_TIMEOUT_UNIT_DEFAULT.to_string());
        }
    }
}
