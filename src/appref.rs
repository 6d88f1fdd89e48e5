//! Application cross-reference.
//!
//! Device policies name mobile applications by id. Checking those ids
//! means reading the Application resource, so the lookup sits behind a
//! trait that the API client implements and tests can fake.

use crate::error::{Error, Result};
use crate::wire::Application;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[async_trait]
pub trait ApplicationLookup: Send + Sync {
    /// `Ok(None)` when the application does not exist. Gives up with
    /// [`Error::Cancelled`] once `cancel` fires.
    async fn application(
        &self,
        environment_id: &str,
        application_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Application>>;
}

/// Per-operation cache in front of another lookup. Built fresh for each
/// plan or apply and never shared between operations.
pub struct CachedApplicationLookup {
    inner: Arc<dyn ApplicationLookup>,
    cache: Mutex<HashMap<(String, String), Option<Application>>>,
}

impl CachedApplicationLookup {
    pub fn new(inner: Arc<dyn ApplicationLookup>) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ApplicationLookup for CachedApplicationLookup {
    async fn application(
        &self,
        environment_id: &str,
        application_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Application>> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let key = (environment_id.to_string(), application_id.to_string());
        if let Some(hit) = self.cache.lock().await.get(&key) {
            debug!("Application cache hit: {}", application_id);
            return Ok(hit.clone());
        }

        let found = self
            .inner
            .application(environment_id, application_id, cancel)
            .await?;
        self.cache.lock().await.insert(key, found.clone());
        Ok(found)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::StaticLookup;
    use super::*;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_cache_reads_through_once() {
        let app = Application {
            id: "app-1".into(),
            ..Default::default()
        };
        let inner = Arc::new(StaticLookup::with([app]));
        let cached = CachedApplicationLookup::new(inner.clone());
        let cancel = CancellationToken::new();

        for _ in 0..3 {
            assert!(cached.application("env", "app-1", &cancel).await.unwrap().is_some());
        }
        assert!(cached.application("env", "missing", &cancel).await.unwrap().is_none());
        assert!(cached.application("env", "missing", &cancel).await.unwrap().is_none());

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cache_is_keyed_by_environment() {
        let inner = Arc::new(StaticLookup::default());
        let cached = CachedApplicationLookup::new(inner.clone());
        let cancel = CancellationToken::new();

        tokio_test::block_on(async {
            cached.application("env-a", "app-1", &cancel).await.unwrap();
            cached.application("env-b", "app-1", &cancel).await.unwrap();
            cached.application("env-a", "app-1", &cancel).await.unwrap();
        });

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancelled_lookup_skips_inner() {
        let inner = Arc::new(StaticLookup::default());
        let cached = CachedApplicationLookup::new(inner.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = cached.application("env", "app-1", &cancel).await;
        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 0);
    }
}
