//! Environment-wide `mfaSettings` record.

use super::device_policy::ObjectReference;
use super::enums::PairingKeyFormat;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaSettingsPairing {
    pub max_allowed_devices: i32,
    pub pairing_key_format: PairingKeyFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaSettingsLockout {
    pub failure_count: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MfaSettingsPhoneExtensions {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaSettingsUsers {
    pub mfa_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<ObjectReference>,
    pub pairing: MfaSettingsPairing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lockout: Option<MfaSettingsLockout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_extensions: Option<MfaSettingsPhoneExtensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<MfaSettingsUsers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
