//! Application push credential request and response records.

use super::enums::PushCredentialType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body. The API never echoes the secret fields back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum PushCredentialRequest {
    #[serde(rename = "FCM_HTTP_V1")]
    Fcm {
        google_service_account_credentials: String,
    },
    #[serde(rename = "APNS")]
    Apns {
        key: String,
        team_id: String,
        token_signing_key: String,
    },
    #[serde(rename = "HMS")]
    Hms {
        client_id: String,
        client_secret: String,
    },
}

impl PushCredentialRequest {
    pub fn credential_type(&self) -> PushCredentialType {
        match self {
            PushCredentialRequest::Fcm { .. } => PushCredentialType::FcmHttpV1,
            PushCredentialRequest::Apns { .. } => PushCredentialType::Apns,
            PushCredentialRequest::Hms { .. } => PushCredentialType::Hms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushCredentialResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub credential_type: PushCredentialType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_request_body() {
        let body = PushCredentialRequest::Apns {
            key: "k".into(),
            team_id: "t".into(),
            token_signing_key: "s".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["type"], "APNS");
        assert_eq!(json["teamId"], "t");
        assert_eq!(json["tokenSigningKey"], "s");
    }
}
