//! `DeviceAuthenticationPolicy` and its nested records.

use super::enums::{
    DeviceSelection, ExtraVerification, IntegrityDetection, MobileApplicationType,
    NewDeviceNotification, TimeUnit,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePeriod {
    pub duration: i32,
    pub time_unit: TimeUnit,
}

impl TimePeriod {
    pub fn new(duration: i32, time_unit: TimeUnit) -> Self {
        Self {
            duration,
            time_unit,
        }
    }

    pub fn as_seconds(&self) -> i64 {
        i64::from(self.duration) * self.time_unit.seconds()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectReference {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enabled {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authentication {
    pub device_selection: DeviceSelection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpFailure {
    pub count: i32,
    pub cool_down: TimePeriod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineDeviceOtp {
    pub lifetime: TimePeriod,
    pub failure: OtpFailure,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp_length: Option<i32>,
}

/// Shape shared by the SMS, voice and email factors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineDevice {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<OfflineDeviceOtp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairing_disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_for_nickname_on_pairing: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureOtp {
    pub failure: OtpFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAuthorization {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_verification: Option<ExtraVerification>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpPairingConfiguration {
    /// The API spells this field `anyIPAdress`.
    #[serde(
        rename = "anyIPAdress",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub any_ip_address: Option<bool>,
    #[serde(
        rename = "onlyTheseIpAddresses",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub only_these_ip_addresses: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequestDurationConfiguration {
    pub device_timeout: TimePeriod,
    pub total_timeout: TimePeriod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobilePush {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_matching: Option<Enabled>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushLimit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_duration: Option<TimePeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_period: Option<TimePeriod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileApplication {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub app_type: Option<MobileApplicationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_enrollment: Option<Enabled>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biometrics_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_authorization: Option<DeviceAuthorization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity_detection: Option<IntegrityDetection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_pairing_configuration: Option<IpPairingConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_request_duration_configuration: Option<NewRequestDurationConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<Enabled>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairing_disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairing_key_lifetime: Option<TimePeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<MobilePush>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_limit: Option<PushLimit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_timeout: Option<TimePeriod>,
}

impl MobileApplication {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            app_type: None,
            auto_enrollment: None,
            biometrics_enabled: None,
            device_authorization: None,
            integrity_detection: None,
            ip_pairing_configuration: None,
            new_request_duration_configuration: None,
            otp: None,
            pairing_disabled: None,
            pairing_key_lifetime: None,
            push: None,
            push_limit: None,
            push_timeout: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mobile {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<FailureOtp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applications: Option<Vec<MobileApplication>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_for_nickname_on_pairing: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totp {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<FailureOtp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairing_disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_for_nickname_on_pairing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_parameters: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fido2 {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fido2_policy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairing_disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_for_nickname_on_pairing: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingIdOtpFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cool_down: Option<TimePeriod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingIdDeviceOtp {
    pub failure: PingIdOtpFailure,
}

/// Shape shared by the desktop, Yubikey and OATH token factors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingIdDevice {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<PingIdDeviceOtp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairing_disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairing_key_lifetime: Option<TimePeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_for_nickname_on_pairing: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RememberMeWeb {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_time: Option<TimePeriod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RememberMe {
    pub web: RememberMeWeb,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAuthenticationPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<ObjectReference>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Authentication>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_device_notification: Option<NewDeviceNotification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_user_lock: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications_policy: Option<ObjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remember_me: Option<RememberMe>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms: Option<OfflineDevice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<OfflineDevice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<OfflineDevice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<Mobile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totp: Option<Totp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fido2: Option<Fido2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop: Option<PingIdDevice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yubikey: Option<PingIdDevice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oath_token: Option<PingIdDevice>,
    #[serde(rename = "default", default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_sign_on_policy: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DeviceAuthenticationPolicy {
    pub fn is_default(&self) -> bool {
        self.default.unwrap_or(false)
    }

    /// Strip the fields the server computes, leaving only what a client
    /// would send.
    pub fn without_computed(&self) -> Self {
        Self {
            id: None,
            environment: None,
            default: None,
            for_sign_on_policy: None,
            created_at: None,
            updated_at: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedDevicePolicies {
    #[serde(default)]
    pub device_authentication_policies: Vec<DeviceAuthenticationPolicy>,
}

/// One page of `GET /environments/{envId}/deviceAuthenticationPolicies`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DevicePolicyPage {
    #[serde(rename = "_embedded", default)]
    pub embedded: EmbeddedDevicePolicies,
    #[serde(rename = "_links", default)]
    pub links: PageLinks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl DevicePolicyPage {
    pub fn next_href(&self) -> Option<&str> {
        self.links.next.as_ref().map(|l| l.href.as_str())
    }
}
