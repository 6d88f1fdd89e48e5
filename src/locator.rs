//! Default device policy locator.
//!
//! Polls the paged policy collection until the policy flagged
//! `default: true` has been observed on `continuous_target_occurrence`
//! consecutive polls. Right after an environment is created the default
//! policy can be briefly missing, so a single sighting is not trusted.

use crate::client::ApiClient;
use crate::config::LocatorConfig;
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::wire::DeviceAuthenticationPolicy;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, warn, Instrument};

/// Where a poll ended up.
#[derive(Debug, Clone, PartialEq)]
enum Observation {
    Found(DeviceAuthenticationPolicy),
    NotFound,
}

#[derive(Debug, Clone)]
pub struct DefaultPolicyLocator {
    config: LocatorConfig,
}

impl DefaultPolicyLocator {
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Find the environment's default policy.
    ///
    /// `Ok(None)` when it was not confirmed within the timeout; a warning is
    /// added to `diags` if `warn_on_not_found` is set. API errors other than
    /// transient ones end the search.
    pub async fn locate(
        &self,
        client: &ApiClient,
        environment_id: &str,
        warn_on_not_found: bool,
        diags: &mut Diagnostics,
        cancel: &CancellationToken,
    ) -> Result<Option<DeviceAuthenticationPolicy>> {
        let span = info_span!("locate_default_policy", environment_id = %environment_id);
        let outcome = self
            .poll(|| Self::observe(client, environment_id, cancel), cancel)
            .instrument(span)
            .await;

        match outcome {
            Ok(found) => Ok(Some(found)),
            Err(Error::Timeout(reason)) => {
                warn!(
                    "Default device policy not found in environment {}: {}",
                    environment_id, reason
                );
                if warn_on_not_found {
                    diags.add_warning(
                        "Default MFA Device Policy Not Found",
                        format!(
                            "The default MFA device policy for environment {} could not be found: {}",
                            environment_id, reason
                        ),
                    );
                }
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn observe(
        client: &ApiClient,
        environment_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Observation> {
        let found = client
            .scan_device_policies(environment_id, cancel, |policy| {
                if policy.is_default() {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .await?;
        Ok(match found {
            Some(policy) => Observation::Found(policy),
            None => Observation::NotFound,
        })
    }

    /// The state-change harness. Each poll is spaced by `delay` (never
    /// less than `min_timeout`). Success needs `continuous_target_occurrence`
    /// consecutive sightings of the same policy id; `not_found_checks`
    /// consecutive misses give up before the overall timeout.
    async fn poll<F, Fut>(&self, mut observe: F, cancel: &CancellationToken) -> Result<DeviceAuthenticationPolicy>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<Observation>>,
    {
        let started = Instant::now();
        let deadline = started + self.config.timeout();
        let interval = self.config.delay().max(self.config.min_timeout());
        let target = self.config.continuous_target_occurrence.max(1);

        let mut streak: u32 = 0;
        let mut misses: u32 = 0;
        let mut last_id: Option<String> = None;
        let mut poll_number: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            poll_number += 1;

            match observe().await? {
                Observation::Found(policy) => {
                    misses = 0;
                    if last_id.is_some() && last_id == policy.id {
                        streak += 1;
                    } else {
                        streak = 1;
                        last_id = policy.id.clone();
                    }
                    debug!(
                        "Poll {}: default policy {:?} seen ({}/{})",
                        poll_number, policy.id, streak, target
                    );
                    if streak >= target {
                        return Ok(policy);
                    }
                }
                Observation::NotFound => {
                    streak = 0;
                    last_id = None;
                    misses += 1;
                    debug!("Poll {}: no default policy ({} consecutive misses)", poll_number, misses);
                    if self.config.not_found_checks > 0 && misses >= self.config.not_found_checks {
                        return Err(Error::Timeout(format!(
                            "no default policy after {} consecutive checks",
                            misses
                        )));
                    }
                }
            }

            if Instant::now() + interval > deadline {
                return Err(Error::Timeout(format!(
                    "timeout while waiting for state to become 'found' (last state: '{}', timeout: {:?})",
                    if streak > 0 { "found" } else { "not_found" },
                    self.config.timeout()
                )));
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn policy(id: &str) -> DeviceAuthenticationPolicy {
        DeviceAuthenticationPolicy {
            id: Some(id.into()),
            name: "Default".into(),
            default: Some(true),
            ..Default::default()
        }
    }

    fn locator(timeout_secs: u64) -> DefaultPolicyLocator {
        DefaultPolicyLocator::new(LocatorConfig {
            timeout_secs,
            delay_secs: 0,
            min_timeout_secs: 0,
            continuous_target_occurrence: 2,
            not_found_checks: 5,
        })
    }

    async fn run(script: Vec<Observation>, l: DefaultPolicyLocator) -> (Result<DeviceAuthenticationPolicy>, usize) {
        let script = Mutex::new(script.into_iter());
        let calls = Mutex::new(0usize);
        let result = l
            .poll(
                || {
                    *calls.lock().unwrap() += 1;
                    let next = script.lock().unwrap().next().unwrap_or(Observation::NotFound);
                    async move { Ok(next) }
                },
                &CancellationToken::new(),
            )
            .await;
        let n = *calls.lock().unwrap();
        (result, n)
    }

    #[tokio::test]
    async fn test_requires_two_consecutive_sightings() {
        let script = vec![
            Observation::Found(policy("d0")),
            Observation::NotFound,
            Observation::Found(policy("d0")),
            Observation::Found(policy("d0")),
        ];
        let (result, calls) = run(script, locator(30)).await;
        assert_eq!(result.unwrap().id.as_deref(), Some("d0"));
        assert_eq!(calls, 4);
    }

    #[tokio::test]
    async fn test_changed_id_restarts_streak() {
        let script = vec![
            Observation::Found(policy("d0")),
            Observation::Found(policy("d1")),
            Observation::Found(policy("d1")),
        ];
        let (result, calls) = run(script, locator(30)).await;
        assert_eq!(result.unwrap().id.as_deref(), Some("d1"));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_consecutive_misses() {
        let (result, calls) = run(vec![], locator(30)).await;
        assert!(matches!(result, Err(Error::Timeout(_))));
        assert_eq!(calls, 5);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_poll() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = locator(30)
            .poll(|| async { Ok(Observation::NotFound) }, &cancel)
            .await;
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
