//! Retry strategies for API calls.
//!
//! Create and Read retry transient failures with exponential backoff,
//! bounded by a total elapsed budget. Update and Delete never retry.

use crate::config::RetryConfig;
use crate::error::{Error, ErrorKind, Result};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum RetryStrategy {
    /// 一回だけ実行
    None,
    /// 指数バックオフ（経過時間で打ち切り）
    ExponentialBackoff {
        initial_delay: Duration,
        max_delay: Duration,
        multiplier: f64,
        max_elapsed: Duration,
    },
}

impl RetryStrategy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::ExponentialBackoff {
            initial_delay: config.initial_delay(),
            max_delay: config.max_delay(),
            multiplier: config.multiplier,
            max_elapsed: config.max_elapsed(),
        }
    }

    /// リトライ可能な操作を実行
    pub async fn execute<F, T, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let Self::ExponentialBackoff {
            initial_delay,
            max_delay,
            multiplier,
            max_elapsed,
        } = self
        else {
            return operation().await;
        };

        let started = Instant::now();
        let mut delay = *initial_delay;
        let mut attempt: u32 = 1;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if !Self::should_retry(&e) => return Err(e),
                Err(e) => {
                    if started.elapsed() + delay > *max_elapsed {
                        warn!("Retry budget of {:?} exhausted after {} attempts: {}", max_elapsed, attempt, e);
                        return Err(e);
                    }
                    info!(
                        "Retrying operation with exponential backoff (attempt {}), delay: {:?}, error: {}",
                        attempt, delay, e
                    );
                    tokio::time::sleep(delay).await;
                    delay = Duration::from_millis(((delay.as_millis() as f64) * multiplier) as u64)
                        .min(*max_delay);
                    attempt += 1;
                }
            }
        }
    }

    /// エラーがリトライ可能かどうかを判定
    fn should_retry(error: &Error) -> bool {
        match error {
            // ネットワーク関連のエラーはリトライ可能
            Error::Network(e) => !e.is_builder(),
            other => other.kind() == ErrorKind::Transient,
        }
    }
}
