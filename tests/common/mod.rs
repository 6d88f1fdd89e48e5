//! Shared wiremock fixtures for the lifecycle tests.

#![allow(dead_code)]

use pingone_mfa::config::{ClientConfig, LocatorConfig, RetryConfig};
use pingone_mfa::ApiClient;
use serde_json::{json, Value as Json};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const ENV: &str = "0c0a4c39-3b4e-4b0e-9a5e-3e6f6f6f6f6f";
pub const POLICY: &str = "5a1b2c3d-0000-4000-8000-00000000beef";
pub const DEFAULT_POLICY: &str = "d0d0d0d0-0000-4000-8000-000000000000";
pub const APP: &str = "a1b2c3d4-0000-4000-8000-000000000001";

pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        initial_delay_ms: 10,
        max_delay_ms: 50,
        multiplier: 2.0,
        max_elapsed_secs: 2,
    }
}

pub fn fast_locator() -> LocatorConfig {
    LocatorConfig {
        timeout_secs: 5,
        delay_secs: 0,
        min_timeout_secs: 0,
        continuous_target_occurrence: 2,
        not_found_checks: 3,
    }
}

pub fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::default()
        .with_base_url(server.uri())
        .with_access_token("test-token")
        .with_retry(fast_retry())
        .with_locator(fast_locator())
}

pub fn client(server: &MockServer) -> Arc<ApiClient> {
    Arc::new(ApiClient::new(&config(server)).unwrap())
}

pub fn policies_path() -> String {
    format!("/environments/{}/deviceAuthenticationPolicies", ENV)
}

pub fn policy_path(id: &str) -> String {
    format!("{}/{}", policies_path(), id)
}

pub fn policy_json(id: &str, name: &str, default: bool) -> Json {
    json!({
        "id": id,
        "environment": { "id": ENV },
        "name": name,
        "default": default,
        "authentication": { "deviceSelection": "DEFAULT_TO_FIRST" },
        "newDeviceNotification": "NONE",
        "sms": {
            "enabled": true,
            "pairingDisabled": false,
            "otp": {
                "lifetime": { "duration": 30, "timeUnit": "MINUTES" },
                "failure": { "count": 3, "coolDown": { "duration": 0, "timeUnit": "MINUTES" } },
                "otpLength": 6
            }
        }
    })
}

pub fn page_json(policies: Vec<Json>, next: Option<String>) -> Json {
    let mut page = json!({
        "_embedded": { "deviceAuthenticationPolicies": policies },
        "_links": {},
        "count": 0
    });
    if let Some(next) = next {
        page["_links"]["next"] = json!({ "href": next });
    }
    page
}

pub fn p1_error(code: &str, message: &str, detail_message: Option<&str>) -> Json {
    let mut body = json!({
        "id": "0f6c3c4e-1111-4000-8000-000000000000",
        "code": code,
        "message": message,
    });
    if let Some(detail) = detail_message {
        body["details"] = json!([{ "code": code, "message": detail }]);
    }
    body
}

/// The environment exists. Needed whenever a 400/401/403 triggers the
/// environment probe.
pub async fn mount_environment(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/environments/{}", ENV)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": ENV })))
        .mount(server)
        .await;
}

/// Replies with the request body, plus the given id and server-side fields.
pub struct Echo {
    pub id: String,
}

impl Echo {
    pub fn with_id(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

impl Respond for Echo {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut body: Json = serde_json::from_slice(&request.body).unwrap_or_else(|_| json!({}));
        body["id"] = json!(self.id);
        body["environment"] = json!({ "id": ENV });
        body["updatedAt"] = json!("2024-05-01T10:00:00Z");
        ResponseTemplate::new(200).set_body_json(body)
    }
}
