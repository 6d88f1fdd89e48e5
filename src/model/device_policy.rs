//! Configuration model of an MFA device policy.
//!
//! Every attribute is a [`Value`] so that absent, unknown and set remain
//! distinct through planning and transcoding. Enum-valued attributes are
//! kept as strings here and checked against their closed sets by the
//! validators.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const POLICY_TYPE_PINGONE_MFA: &str = "pingone_mfa";
pub const POLICY_TYPE_PINGID: &str = "pingid";

/// Discriminator selecting which factor blocks are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyType {
    PingoneMfa,
    Pingid,
}

impl PolicyType {
    pub const ALL: [PolicyType; 2] = [PolicyType::PingoneMfa, PolicyType::Pingid];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyType::PingoneMfa => POLICY_TYPE_PINGONE_MFA,
            PolicyType::Pingid => POLICY_TYPE_PINGID,
        }
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyType {
    type Err = crate::wire::UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            POLICY_TYPE_PINGONE_MFA => Ok(PolicyType::PingoneMfa),
            POLICY_TYPE_PINGID => Ok(PolicyType::Pingid),
            other => Err(crate::wire::UnknownVariant {
                type_name: "PolicyType",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimePeriodConfig {
    pub duration: Value<i32>,
    pub time_unit: Value<String>,
}

impl TimePeriodConfig {
    pub fn new(duration: i32, time_unit: &str) -> Self {
        Self {
            duration: Value::Present(duration),
            time_unit: Value::Present(time_unit.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnabledConfig {
    pub enabled: Value<bool>,
}

impl EnabledConfig {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Value::Present(enabled),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticationConfig {
    pub device_selection: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtpFailureConfig {
    pub count: Value<i32>,
    pub cool_down: Value<TimePeriodConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfflineOtpConfig {
    pub lifetime: Value<TimePeriodConfig>,
    pub failure: Value<OtpFailureConfig>,
    pub otp_length: Value<i32>,
}

/// SMS, voice and email factors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfflineDeviceConfig {
    pub enabled: Value<bool>,
    pub otp: Value<OfflineOtpConfig>,
    pub pairing_disabled: Value<bool>,
    pub prompt_for_nickname_on_pairing: Value<bool>,
}

/// An `otp` block that only carries failure handling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureOtpConfig {
    pub failure: Value<OtpFailureConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceAuthorizationConfig {
    pub enabled: Value<bool>,
    pub extra_verification: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpPairingConfig {
    pub any_ip_address: Value<bool>,
    pub only_these_ip_addresses: Value<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewRequestDurationConfig {
    pub device_timeout: Value<TimePeriodConfig>,
    pub total_timeout: Value<TimePeriodConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub enabled: Value<bool>,
    pub number_matching: Value<EnabledConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushLimitConfig {
    pub count: Value<i32>,
    pub lock_duration: Value<TimePeriodConfig>,
    pub time_period: Value<TimePeriodConfig>,
}

/// Per-application settings, keyed by application id in
/// [`MobileConfig::applications`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MobileApplicationConfig {
    pub auto_enrollment: Value<EnabledConfig>,
    pub biometrics_enabled: Value<bool>,
    pub device_authorization: Value<DeviceAuthorizationConfig>,
    pub integrity_detection: Value<String>,
    pub ip_pairing_configuration: Value<IpPairingConfig>,
    pub new_request_duration_configuration: Value<NewRequestDurationConfig>,
    pub otp: Value<EnabledConfig>,
    pub pairing_disabled: Value<bool>,
    pub pairing_key_lifetime: Value<TimePeriodConfig>,
    pub push: Value<PushConfig>,
    pub push_limit: Value<PushLimitConfig>,
    pub push_timeout: Value<TimePeriodConfig>,
    #[serde(rename = "type")]
    pub app_type: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MobileConfig {
    pub enabled: Value<bool>,
    pub otp: Value<FailureOtpConfig>,
    pub prompt_for_nickname_on_pairing: Value<bool>,
    pub applications: Value<BTreeMap<String, MobileApplicationConfig>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TotpConfig {
    pub enabled: Value<bool>,
    pub otp: Value<FailureOtpConfig>,
    pub pairing_disabled: Value<bool>,
    pub prompt_for_nickname_on_pairing: Value<bool>,
    pub uri_parameters: Value<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fido2FactorConfig {
    pub enabled: Value<bool>,
    pub fido2_policy_id: Value<String>,
    pub pairing_disabled: Value<bool>,
    pub prompt_for_nickname_on_pairing: Value<bool>,
}

/// Desktop, Yubikey and OATH token factors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PingIdDeviceConfig {
    pub enabled: Value<bool>,
    pub otp: Value<FailureOtpConfig>,
    pub pairing_disabled: Value<bool>,
    pub pairing_key_lifetime: Value<TimePeriodConfig>,
    pub prompt_for_nickname_on_pairing: Value<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RememberMeWebConfig {
    pub enabled: Value<bool>,
    pub life_time: Value<TimePeriodConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RememberMeConfig {
    pub web: Value<RememberMeWebConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsPolicyConfig {
    pub id: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevicePolicyConfig {
    pub id: Value<String>,
    pub environment_id: Value<String>,
    pub policy_type: Value<String>,
    pub name: Value<String>,
    pub default: Value<bool>,
    pub authentication: Value<AuthenticationConfig>,
    pub new_device_notification: Value<String>,
    pub ignore_user_lock: Value<bool>,
    pub notifications_policy: Value<NotificationsPolicyConfig>,
    pub remember_me: Value<RememberMeConfig>,
    pub sms: Value<OfflineDeviceConfig>,
    pub voice: Value<OfflineDeviceConfig>,
    pub email: Value<OfflineDeviceConfig>,
    pub mobile: Value<MobileConfig>,
    pub totp: Value<TotpConfig>,
    pub fido2: Value<Fido2FactorConfig>,
    pub desktop: Value<PingIdDeviceConfig>,
    pub yubikey: Value<PingIdDeviceConfig>,
    pub oath_token: Value<PingIdDeviceConfig>,
    pub updated_at: Value<String>,
}

impl DevicePolicyConfig {
    /// Parsed discriminator. `None` when absent, unknown or not one of
    /// the two policy types.
    pub fn policy_type(&self) -> Option<PolicyType> {
        self.policy_type.get().and_then(|s| s.parse().ok())
    }

    pub fn mobile_applications(&self) -> impl Iterator<Item = (&String, &MobileApplicationConfig)> {
        self.mobile
            .get()
            .and_then(|m| m.applications.get())
            .into_iter()
            .flat_map(|apps| apps.iter())
    }

    /// Whether a PingID-only factor block is present and enabled.
    pub fn pingid_factor_enabled(block: &Value<PingIdDeviceConfig>) -> bool {
        block
            .get()
            .and_then(|b| b.enabled.copied())
            .unwrap_or(false)
    }

    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_toml(text: &str) -> crate::error::Result<Self> {
        toml::from_str(text).map_err(|e| crate::error::Error::Config(e.to_string()))
    }
}
