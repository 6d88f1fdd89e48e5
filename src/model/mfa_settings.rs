//! Configuration model of environment MFA settings.

use crate::value::Value;
use serde::{Deserialize, Serialize};

pub const MAX_ALLOWED_DEVICES_DEFAULT: i32 = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingSettingsConfig {
    pub max_allowed_devices: Value<i32>,
    pub pairing_key_format: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockoutSettingsConfig {
    pub failure_count: Value<i32>,
    pub duration_seconds: Value<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneExtensionsConfig {
    pub enabled: Value<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsersSettingsConfig {
    pub mfa_enabled: Value<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MfaSettingsConfig {
    pub id: Value<String>,
    pub environment_id: Value<String>,
    pub pairing: Value<PairingSettingsConfig>,
    pub lockout: Value<LockoutSettingsConfig>,
    pub phone_extensions: Value<PhoneExtensionsConfig>,
    pub users: Value<UsersSettingsConfig>,
}

impl MfaSettingsConfig {
    pub fn apply_defaults(&mut self) {
        if let Some(pairing) = self.pairing.get_mut() {
            pairing
                .max_allowed_devices
                .or_default_with(|| MAX_ALLOWED_DEVICES_DEFAULT);
        }
        self.phone_extensions.or_default_with(|| PhoneExtensionsConfig {
            enabled: Value::Present(false),
        });
        self.users.or_default_with(|| UsersSettingsConfig {
            mfa_enabled: Value::Present(true),
        });
    }
}
