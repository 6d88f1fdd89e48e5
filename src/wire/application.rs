//! The subset of the management API `Application` record read for
//! cross-reference checks. Unknown fields are ignored.

use serde::{Deserialize, Serialize};

pub const PROTOCOL_OPENID_CONNECT: &str = "OPENID_CONNECT";
pub const TYPE_NATIVE_APP: &str = "NATIVE_APP";
pub const TYPE_CUSTOM_APP: &str = "CUSTOM_APP";
pub const INTEGRITY_DETECTION_ENABLED: &str = "ENABLED";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationIntegrityDetection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationMobile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub huawei_app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity_detection: Option<ApplicationIntegrityDetection>,
}

impl ApplicationMobile {
    pub fn has_identifier(&self) -> bool {
        [&self.bundle_id, &self.package_name, &self.huawei_app_id]
            .iter()
            .any(|v| v.as_deref().is_some_and(|s| !s.is_empty()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub app_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<ApplicationMobile>,
}

impl Application {
    pub fn is_oidc(&self) -> bool {
        self.protocol.as_deref() == Some(PROTOCOL_OPENID_CONNECT)
    }

    pub fn is_native_app(&self) -> bool {
        matches!(
            self.app_type.as_deref(),
            Some(TYPE_NATIVE_APP) | Some(TYPE_CUSTOM_APP)
        )
    }

    pub fn has_mobile_config(&self) -> bool {
        self.mobile.as_ref().is_some_and(ApplicationMobile::has_identifier)
    }

    pub fn integrity_detection_enabled(&self) -> bool {
        self.mobile
            .as_ref()
            .and_then(|m| m.integrity_detection.as_ref())
            .and_then(|i| i.mode.as_deref())
            == Some(INTEGRITY_DETECTION_ENABLED)
    }
}
