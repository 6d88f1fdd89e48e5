//! `FIDO2Policy` wire record.

use super::device_policy::{ObjectReference, TimePeriod};
use super::enums::{
    AttestationRequirements, AuthenticatorAttachment, DiscoverableCredentials,
    MdsAuthenticatorsOption, UserVerificationOption,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupEligibility {
    pub allow: bool,
    pub enforce_during_authentication: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MdsAuthenticatorsRequirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_authenticators: Option<Vec<ObjectReference>>,
    pub enforce_during_authentication: bool,
    pub option: MdsAuthenticatorsOption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedAttribute {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDisplayNameAttribute {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_attributes: Option<Vec<NamedAttribute>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDisplayNameAttributes {
    pub attributes: Vec<UserDisplayNameAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVerification {
    pub enforce_during_authentication: bool,
    pub option: UserVerificationOption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fido2Policy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<ObjectReference>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "default", default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    pub attestation_requirements: AttestationRequirements,
    pub authenticator_attachment: AuthenticatorAttachment,
    pub backup_eligibility: BackupEligibility,
    pub device_display_name: String,
    pub discoverable_credentials: DiscoverableCredentials,
    pub mds_authenticators_requirements: MdsAuthenticatorsRequirements,
    pub relying_party_id: String,
    pub user_display_name_attributes: UserDisplayNameAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_presence_timeout: Option<TimePeriod>,
    pub user_verification: UserVerification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
