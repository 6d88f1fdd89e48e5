//! Client configuration.
//!
//! The library itself never reads the process environment; only
//! [`ClientConfig::load`], which the binary calls, layers a file and
//! `PINGONE_MFA_*` variables over the built-in defaults.

use crate::error::{Error, Result};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://api.pingone.com/v1";
pub const ENV_PREFIX: &str = "PINGONE_MFA";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// ホストから渡されるアクセストークン
    #[serde(skip_serializing)]
    pub access_token: Option<SecretString>,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
    pub retry: RetryConfig,
    pub locator: LocatorConfig,
}

/// Create / Read のリトライ設定
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    pub max_elapsed_secs: u64,
}

/// デフォルトポリシー探索のポーリング設定
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocatorConfig {
    pub timeout_secs: u64,
    pub delay_secs: u64,
    pub min_timeout_secs: u64,
    pub continuous_target_occurrence: u32,
    pub not_found_checks: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            access_token: None,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: format!("pingone-mfa/{}", env!("CARGO_PKG_VERSION")),
            retry: RetryConfig::default(),
            locator: LocatorConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 500,
            max_delay_ms: 10_000,
            multiplier: 2.0,
            max_elapsed_secs: 30,
        }
    }
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            delay_secs: 1,
            min_timeout_secs: 1,
            continuous_target_occurrence: 2,
            not_found_checks: 20,
        }
    }
}

impl RetryConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn max_elapsed(&self) -> Duration {
        Duration::from_secs(self.max_elapsed_secs)
    }
}

impl LocatorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    pub fn min_timeout(&self) -> Duration {
        Duration::from_secs(self.min_timeout_secs)
    }
}

impl ClientConfig {
    /// デフォルト値、設定ファイル、環境変数の順に読み込む
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        // デフォルト値を設定
        settings = settings.add_source(config::Config::try_from(&ClientConfig::default())?);

        // 設定ファイル（指定された場合のみ、必須）
        if let Some(path) = path {
            settings = settings.add_source(config::File::from(path).required(true));
        }

        // 環境変数で上書き (例: PINGONE_MFA_RETRY__MAX_ELAPSED_SECS=60)
        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: ClientConfig = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.base_url()?;

        if self.request_timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(Error::Config("timeouts must be greater than zero".to_string()));
        }
        if self.retry.multiplier < 1.0 {
            return Err(Error::Config(format!(
                "retry.multiplier must be at least 1.0, got {}",
                self.retry.multiplier
            )));
        }
        if self.locator.timeout_secs == 0 || self.locator.continuous_target_occurrence == 0 {
            return Err(Error::Config(
                "locator.timeout_secs and locator.continuous_target_occurrence must be greater than zero"
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.api_base_url)
            .map_err(|e| Error::Config(format!("invalid api_base_url {}: {}", self.api_base_url, e)))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        let token: String = token.into();
        self.access_token = Some(SecretString::new(token.into_boxed_str()));
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_locator(mut self, locator: LocatorConfig) -> Self {
        self.locator = locator;
        self
    }
}
