//! PingOne management API client.
//!
//! One [`ApiClient`] is shared by every resource operation in the process.
//! Each call is wrapped by the retry strategy for its [`OperationKind`],
//! classified into an [`Error`] on failure, and raced against the
//! operation's cancellation token.

pub mod classify;
pub mod retry;

use crate::appref::ApplicationLookup;
use crate::config::ClientConfig;
use crate::error::{ApiFailure, Error, Result};
use crate::wire::{
    Application, DeviceAuthenticationPolicy, DevicePolicyMigration, DevicePolicyPage, Fido2Policy,
    MfaSettings, P1Error, PushCredentialRequest, PushCredentialResponse, FIDO2_MIGRATE_CONTENT_TYPE,
};
use async_trait::async_trait;
use classify::{needs_environment_probe, OperationKind};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use retry::RetryStrategy;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

/// One API request, described before it is sent so that it can be
/// replayed by the retry loop.
struct Call {
    operation: &'static str,
    method: Method,
    url: Url,
    body: Option<serde_json::Value>,
    /// Overrides `application/json` for vendor media types.
    content_type: Option<&'static str>,
    kind: OperationKind,
    environment_id: String,
}

pub struct ApiClient {
    http: Client,
    base_url: Url,
    access_token: Option<SecretString>,
    retry: RetryStrategy,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        // タイムアウト設定付きのHTTPクライアントを作成
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url()?,
            access_token: config.access_token.clone(),
            retry: RetryStrategy::from_config(&config.retry),
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{}{}", base, path))
            .map_err(|e| Error::Config(format!("invalid request URL {}{}: {}", base, path, e)))
    }

    fn call(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        kind: OperationKind,
        environment_id: &str,
    ) -> Result<Call> {
        Ok(Call {
            operation,
            method,
            url: self.url(path)?,
            body: None,
            content_type: None,
            kind,
            environment_id: environment_id.to_string(),
        })
    }

    /// Send once. `Ok(None)` for an empty success body.
    async fn attempt(&self, call: &Call) -> Result<Option<String>> {
        let mut request = self.http.request(call.method.clone(), call.url.clone());
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(body) = &call.body {
            if let Some(content_type) = call.content_type {
                request = request.header(CONTENT_TYPE, content_type);
            }
            request = request.json(body);
        }

        debug!("{} {} ({})", call.method, call.url, call.operation);
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() || e.is_connect() => {
                if e.is_timeout() {
                    warn!("Request timeout on {}: {}", call.operation, e);
                } else {
                    warn!("Connection error on {}: {}", call.operation, e);
                }
                return Err(Error::Transient(ApiFailure::transport(call.operation, e.to_string())));
            }
            Err(e) => return Err(Error::Network(e)),
        };

        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            return Ok((!text.trim().is_empty()).then_some(text));
        }

        let body = serde_json::from_str::<P1Error>(&text).ok();
        let failure = ApiFailure::new(call.operation, Some(status.as_u16()), body);
        let error = classify::to_error(failure, call.kind);
        if matches!(error, Error::Transient(_)) {
            warn!("HTTP error {} on {}, retrying...", status, call.operation);
        }
        Err(error)
    }

    async fn execute(&self, call: Call, cancel: &CancellationToken) -> Result<Option<String>> {
        let strategy = if call.kind.retries() {
            &self.retry
        } else {
            &RetryStrategy::None
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            outcome = strategy.execute(|| self.attempt(&call)) => outcome,
        };

        match outcome {
            Err(error) if needs_environment_probe(status_of(&error)) => {
                Err(self.probe_environment(&call.environment_id, error, cancel).await)
            }
            other => other,
        }
    }

    /// Turn a permission-scoped failure into `EnvironmentNotFound` when the
    /// environment is gone. Any probe failure keeps the original error.
    async fn probe_environment(
        &self,
        environment_id: &str,
        original: Error,
        cancel: &CancellationToken,
    ) -> Error {
        match self.environment_exists(environment_id, cancel).await {
            Ok(false) => {
                warn!("Environment {} not found while handling: {}", environment_id, original);
                Error::EnvironmentNotFound(environment_id.to_string())
            }
            Ok(true) => original,
            Err(Error::Cancelled) => Error::Cancelled,
            Err(e) => {
                debug!("Environment probe failed: {}", e);
                original
            }
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        call: Call,
        cancel: &CancellationToken,
    ) -> Result<Option<T>> {
        match self.execute(call, cancel).await? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn send_expecting<T: DeserializeOwned>(
        &self,
        call: Call,
        what: &str,
        cancel: &CancellationToken,
    ) -> Result<T> {
        self.send(call, cancel)
            .await?
            .ok_or_else(|| Error::missing_data(what))
    }

    fn with_body<B: Serialize>(mut call: Call, body: &B) -> Result<Call> {
        call.body = Some(serde_json::to_value(body)?);
        Ok(call)
    }

    /// `GET /environments/{id}`: `false` on 404.
    pub async fn environment_exists(
        &self,
        environment_id: &str,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let call = self.call(
            "ReadOneEnvironment",
            Method::GET,
            &format!("/environments/{}", environment_id),
            OperationKind::Read,
            environment_id,
        )?;
        let attempt = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            attempt = self.attempt(&call) => attempt,
        };
        match attempt {
            Ok(_) => Ok(true),
            Err(Error::ResourceNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    // Device authentication policies

    fn device_policies_path(environment_id: &str) -> String {
        format!("/environments/{}/deviceAuthenticationPolicies", environment_id)
    }

    fn device_policy_path(environment_id: &str, policy_id: &str) -> String {
        format!("{}/{}", Self::device_policies_path(environment_id), policy_id)
    }

    pub async fn create_device_policy(
        &self,
        environment_id: &str,
        policy: &DeviceAuthenticationPolicy,
        cancel: &CancellationToken,
    ) -> Result<DeviceAuthenticationPolicy> {
        let call = self.call(
            "CreateDeviceAuthenticationPolicies",
            Method::POST,
            &Self::device_policies_path(environment_id),
            OperationKind::Create,
            environment_id,
        )?;
        self.send_expecting(Self::with_body(call, policy)?, "device authentication policy", cancel)
            .await
    }

    pub async fn read_device_policy(
        &self,
        environment_id: &str,
        policy_id: &str,
        cancel: &CancellationToken,
    ) -> Result<DeviceAuthenticationPolicy> {
        let call = self.call(
            "ReadOneDeviceAuthenticationPolicy",
            Method::GET,
            &Self::device_policy_path(environment_id, policy_id),
            OperationKind::Read,
            environment_id,
        )?;
        self.send_expecting(call, "device authentication policy", cancel).await
    }

    pub async fn update_device_policy(
        &self,
        environment_id: &str,
        policy_id: &str,
        policy: &DeviceAuthenticationPolicy,
        cancel: &CancellationToken,
    ) -> Result<DeviceAuthenticationPolicy> {
        let call = self.call(
            "UpdateDeviceAuthenticationPolicy",
            Method::PUT,
            &Self::device_policy_path(environment_id, policy_id),
            OperationKind::Update,
            environment_id,
        )?;
        self.send_expecting(Self::with_body(call, policy)?, "device authentication policy", cancel)
            .await
    }

    /// PUT an arbitrary JSON body. Used to send explicit nulls that the
    /// typed record cannot express.
    pub async fn update_device_policy_raw(
        &self,
        environment_id: &str,
        policy_id: &str,
        body: serde_json::Value,
        cancel: &CancellationToken,
    ) -> Result<DeviceAuthenticationPolicy> {
        let mut call = self.call(
            "UpdateDeviceAuthenticationPolicy",
            Method::PUT,
            &Self::device_policy_path(environment_id, policy_id),
            OperationKind::Update,
            environment_id,
        )?;
        call.body = Some(body);
        self.send_expecting(call, "device authentication policy", cancel).await
    }

    pub async fn delete_device_policy(
        &self,
        environment_id: &str,
        policy_id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let call = self.call(
            "DeleteDeviceAuthenticationPolicy",
            Method::DELETE,
            &Self::device_policy_path(environment_id, policy_id),
            OperationKind::Delete,
            environment_id,
        )?;
        self.execute(call, cancel).await.map(|_| ())
    }

    /// POST a FIDO2 migration to the device policy collection. The
    /// response lists the migrated policies and is not inspected further.
    pub async fn migrate_device_policies(
        &self,
        environment_id: &str,
        migration: &DevicePolicyMigration,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value> {
        let call = self.call(
            "CreateDeviceAuthenticationPolicies",
            Method::POST,
            &Self::device_policies_path(environment_id),
            OperationKind::Create,
            environment_id,
        )?;
        let mut call = Self::with_body(call, migration)?;
        call.content_type = Some(FIDO2_MIGRATE_CONTENT_TYPE);
        self.send_expecting(call, "data object", cancel).await
    }

    /// Walk every page of the environment's device policies, following
    /// `_links.next.href`, until `visit` breaks or the pages run out.
    pub async fn scan_device_policies<F>(
        &self,
        environment_id: &str,
        cancel: &CancellationToken,
        mut visit: F,
    ) -> Result<Option<DeviceAuthenticationPolicy>>
    where
        F: FnMut(&DeviceAuthenticationPolicy) -> ControlFlow<()>,
    {
        let mut next = Some(self.url(&Self::device_policies_path(environment_id))?);
        let mut page_number = 0;

        while let Some(url) = next.take() {
            page_number += 1;
            let call = Call {
                operation: "ReadDeviceAuthenticationPolicies",
                method: Method::GET,
                url,
                body: None,
                content_type: None,
                kind: OperationKind::Read,
                environment_id: environment_id.to_string(),
            };
            let page: DevicePolicyPage = self
                .send_expecting(call, "device authentication policies page", cancel)
                .await?;
            debug!(
                "Scanned device policy page {} ({} entries)",
                page_number,
                page.embedded.device_authentication_policies.len()
            );

            for policy in page.embedded.device_authentication_policies.iter() {
                if visit(policy).is_break() {
                    return Ok(Some(policy.clone()));
                }
            }

            next = match page.next_href() {
                Some(href) => Some(
                    Url::parse(href)
                        .map_err(|e| Error::DataIntegrity(format!("invalid next page link {}: {}", href, e)))?,
                ),
                None => None,
            };
        }

        Ok(None)
    }

    pub async fn list_device_policies(
        &self,
        environment_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<DeviceAuthenticationPolicy>> {
        let mut all = Vec::new();
        self.scan_device_policies(environment_id, cancel, |policy| {
            all.push(policy.clone());
            ControlFlow::Continue(())
        })
        .await?;
        Ok(all)
    }

    // FIDO2 policies

    fn fido2_policies_path(environment_id: &str) -> String {
        format!("/environments/{}/fido2Policies", environment_id)
    }

    pub async fn create_fido2_policy(
        &self,
        environment_id: &str,
        policy: &Fido2Policy,
        cancel: &CancellationToken,
    ) -> Result<Fido2Policy> {
        let call = self.call(
            "CreateFIDO2Policy",
            Method::POST,
            &Self::fido2_policies_path(environment_id),
            OperationKind::Create,
            environment_id,
        )?;
        self.send_expecting(Self::with_body(call, policy)?, "FIDO2 policy", cancel)
            .await
    }

    pub async fn read_fido2_policy(
        &self,
        environment_id: &str,
        policy_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Fido2Policy> {
        let call = self.call(
            "ReadOneFIDO2Policy",
            Method::GET,
            &format!("{}/{}", Self::fido2_policies_path(environment_id), policy_id),
            OperationKind::Read,
            environment_id,
        )?;
        self.send_expecting(call, "FIDO2 policy", cancel).await
    }

    pub async fn update_fido2_policy(
        &self,
        environment_id: &str,
        policy_id: &str,
        policy: &Fido2Policy,
        cancel: &CancellationToken,
    ) -> Result<Fido2Policy> {
        let call = self.call(
            "UpdateFIDO2Policy",
            Method::PUT,
            &format!("{}/{}", Self::fido2_policies_path(environment_id), policy_id),
            OperationKind::Update,
            environment_id,
        )?;
        self.send_expecting(Self::with_body(call, policy)?, "FIDO2 policy", cancel)
            .await
    }

    pub async fn delete_fido2_policy(
        &self,
        environment_id: &str,
        policy_id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let call = self.call(
            "DeleteFIDO2Policy",
            Method::DELETE,
            &format!("{}/{}", Self::fido2_policies_path(environment_id), policy_id),
            OperationKind::Delete,
            environment_id,
        )?;
        self.execute(call, cancel).await.map(|_| ())
    }

    // Application push credentials

    fn push_credentials_path(environment_id: &str, application_id: &str) -> String {
        format!(
            "/environments/{}/applications/{}/pushCredentials",
            environment_id, application_id
        )
    }

    pub async fn create_push_credential(
        &self,
        environment_id: &str,
        application_id: &str,
        credential: &PushCredentialRequest,
        cancel: &CancellationToken,
    ) -> Result<PushCredentialResponse> {
        let call = self.call(
            "CreatePushCredential",
            Method::POST,
            &Self::push_credentials_path(environment_id, application_id),
            OperationKind::Create,
            environment_id,
        )?;
        self.send_expecting(Self::with_body(call, credential)?, "push credential", cancel)
            .await
    }

    pub async fn read_push_credential(
        &self,
        environment_id: &str,
        application_id: &str,
        credential_id: &str,
        cancel: &CancellationToken,
    ) -> Result<PushCredentialResponse> {
        let call = self.call(
            "ReadOnePushCredential",
            Method::GET,
            &format!(
                "{}/{}",
                Self::push_credentials_path(environment_id, application_id),
                credential_id
            ),
            OperationKind::Read,
            environment_id,
        )?;
        self.send_expecting(call, "push credential", cancel).await
    }

    pub async fn update_push_credential(
        &self,
        environment_id: &str,
        application_id: &str,
        credential_id: &str,
        credential: &PushCredentialRequest,
        cancel: &CancellationToken,
    ) -> Result<PushCredentialResponse> {
        let call = self.call(
            "UpdatePushCredential",
            Method::PUT,
            &format!(
                "{}/{}",
                Self::push_credentials_path(environment_id, application_id),
                credential_id
            ),
            OperationKind::Update,
            environment_id,
        )?;
        self.send_expecting(Self::with_body(call, credential)?, "push credential", cancel)
            .await
    }

    pub async fn delete_push_credential(
        &self,
        environment_id: &str,
        application_id: &str,
        credential_id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let call = self.call(
            "DeletePushCredential",
            Method::DELETE,
            &format!(
                "{}/{}",
                Self::push_credentials_path(environment_id, application_id),
                credential_id
            ),
            OperationKind::Delete,
            environment_id,
        )?;
        self.execute(call, cancel).await.map(|_| ())
    }

    // MFA settings

    fn mfa_settings_path(environment_id: &str) -> String {
        format!("/environments/{}/mfaSettings", environment_id)
    }

    pub async fn read_mfa_settings(
        &self,
        environment_id: &str,
        cancel: &CancellationToken,
    ) -> Result<MfaSettings> {
        let call = self.call(
            "ReadMFASettings",
            Method::GET,
            &Self::mfa_settings_path(environment_id),
            OperationKind::Read,
            environment_id,
        )?;
        self.send_expecting(call, "MFA settings", cancel).await
    }

    pub async fn update_mfa_settings(
        &self,
        environment_id: &str,
        settings: &MfaSettings,
        kind: OperationKind,
        cancel: &CancellationToken,
    ) -> Result<MfaSettings> {
        let call = self.call(
            "UpdateMFASettings",
            Method::PUT,
            &Self::mfa_settings_path(environment_id),
            kind,
            environment_id,
        )?;
        self.send_expecting(Self::with_body(call, settings)?, "MFA settings", cancel)
            .await
    }

    pub async fn reset_mfa_settings(
        &self,
        environment_id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let call = self.call(
            "ResetMFASettings",
            Method::DELETE,
            &Self::mfa_settings_path(environment_id),
            OperationKind::Delete,
            environment_id,
        )?;
        self.execute(call, cancel).await.map(|_| ())
    }

    // Applications

    pub async fn read_application(
        &self,
        environment_id: &str,
        application_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Application>> {
        let call = self.call(
            "ReadOneApplication",
            Method::GET,
            &format!("/environments/{}/applications/{}", environment_id, application_id),
            OperationKind::Read,
            environment_id,
        )?;
        match self.send(call, cancel).await {
            Ok(app) => Ok(app),
            Err(Error::ResourceNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn status_of(error: &Error) -> Option<u16> {
    match error {
        Error::Authorization(f) | Error::ServerValidation(f) | Error::Transient(f) => f.status,
        _ => None,
    }
}

#[async_trait]
impl ApplicationLookup for ApiClient {
    async fn application(
        &self,
        environment_id: &str,
        application_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Application>> {
        self.read_application(environment_id, application_id, cancel)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_path() {
        let client = ApiClient::new(
            &ClientConfig::default().with_base_url("https://api.pingone.eu/v1/"),
        )
        .unwrap();
        assert_eq!(
            client.url(&ApiClient::device_policy_path("e", "p")).unwrap().as_str(),
            "https://api.pingone.eu/v1/environments/e/deviceAuthenticationPolicies/p"
        );
    }

    #[tokio::test]
    async fn test_connection_failure_names_the_operation() {
        let client = ApiClient::new(
            &ClientConfig::default()
                .with_base_url("http://127.0.0.1:1")
                .with_access_token("test-token"),
        )
        .unwrap();

        let err = client
            .delete_device_policy("e", "p", &CancellationToken::new())
            .await
            .unwrap_err();
        let Error::Transient(failure) = &err else {
            panic!("expected a transient failure, got {err:?}");
        };
        assert_eq!(failure.operation, "DeleteDeviceAuthenticationPolicy");
        assert_eq!(failure.status, None);
        assert!(err
            .to_diagnostics()
            .mentions("Error when calling `DeleteDeviceAuthenticationPolicy`"));
    }
}
