//! Configuration model of an application push credential.

use crate::value::Value;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FcmCredentialConfig {
    #[serde(skip_serializing)]
    pub google_service_account_credentials: Value<SecretString>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApnsCredentialConfig {
    #[serde(skip_serializing)]
    pub key: Value<SecretString>,
    pub team_id: Value<String>,
    #[serde(skip_serializing)]
    pub token_signing_key: Value<SecretString>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HmsCredentialConfig {
    pub client_id: Value<String>,
    #[serde(skip_serializing)]
    pub client_secret: Value<SecretString>,
}

/// Exactly one of `fcm`, `apns` or `hms` must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PushCredentialConfig {
    pub id: Value<String>,
    pub environment_id: Value<String>,
    pub application_id: Value<String>,
    pub fcm: Value<FcmCredentialConfig>,
    pub apns: Value<ApnsCredentialConfig>,
    pub hms: Value<HmsCredentialConfig>,
}

impl PushCredentialConfig {
    pub fn configured_blocks(&self) -> Vec<&'static str> {
        let mut blocks = Vec::new();
        if !self.fcm.is_absent() {
            blocks.push("fcm");
        }
        if !self.apns.is_absent() {
            blocks.push("apns");
        }
        if !self.hms.is_absent() {
            blocks.push("hms");
        }
        blocks
    }
}
