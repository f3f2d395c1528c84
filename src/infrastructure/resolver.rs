//! Resource Resolver
//!
//! Turns a backend key into a usable base url. Statically addressed backends
//! resolve from configuration alone; discoverable backends go through the
//! discovery provider once and are cached for the life of the process.
//!
//! Cached entries have no TTL and are never invalidated; a discovered
//! endpoint that later moves keeps serving the stale entry (known
//! limitation).

use crate::config::BackendConfig;
use crate::domain::entities::ResolvedResource;
use crate::domain::ports::{BackendProvider, DiscoveryClient};
use crate::domain::value_objects::ServiceLocation;
use crate::error::CommError;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

const COMPONENT: &str = "ResourceResolver";
const OP_RESOLVE: &str = "resolve";

/// Resolves backend keys to [`ResolvedResource`]s.
///
/// The cache is owned exclusively by the resolver and lives as long as the
/// process. Population is guarded by one async mutex per backend key with a
/// double-checked-locking window, so concurrent first-time resolutions of the
/// same key issue exactly one discovery call and resolutions of unrelated
/// keys never contend.
pub struct ResourceResolver {
    backends: Arc<dyn BackendProvider>,
    discovery: Arc<dyn DiscoveryClient>,
    cache: DashMap<String, ResolvedResource>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ResourceResolver {
    pub fn new(backends: Arc<dyn BackendProvider>, discovery: Arc<dyn DiscoveryClient>) -> Self {
        Self {
            backends,
            discovery,
            cache: DashMap::new(),
            locks: DashMap::new(),
        }
    }

    /// Resolve a backend key to its network location.
    ///
    /// An explicit `override_location` builds a one-off resource that bypasses
    /// configuration and the cache entirely.
    pub async fn resolve(
        &self,
        correlation_id: &str,
        key: &str,
        override_location: Option<&ServiceLocation>,
    ) -> Result<ResolvedResource, CommError> {
        // One-off destination, not a named backend: never cached.
        if let Some(location) = override_location {
            return ResolvedResource::from_location(location, None, None).ok_or_else(|| {
                CommError::config(
                    COMPONENT,
                    OP_RESOLVE,
                    correlation_id,
                    "resource override carries neither address nor dns",
                )
            });
        }

        let config = self.backends.backend(key).await.ok_or_else(|| {
            CommError::config(
                COMPONENT,
                OP_RESOLVE,
                correlation_id,
                format!("unknown backend key '{}'", key),
            )
        })?;

        if !config.is_discoverable() {
            return Self::resolve_static(correlation_id, &config);
        }

        // Fast path: no lock on a cache hit.
        if let Some(hit) = self.cache.get(key) {
            tracing::debug!(correlation_id, key, "resolution cache hit");
            return Ok(hit.clone());
        }

        let lock = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Re-check: another caller may have populated the cache while this
        // one waited on the lock.
        if let Some(hit) = self.cache.get(key) {
            tracing::debug!(correlation_id, key, "resolution cache hit after wait");
            return Ok(hit.clone());
        }

        let resolved = self.discover(correlation_id, &config).await?;
        self.cache.insert(key.to_string(), resolved.clone());
        tracing::info!(correlation_id, key, url = %resolved.url, "backend resolved and cached");
        Ok(resolved)
    }

    /// Number of cached resolutions; for observability and tests.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    fn resolve_static(
        correlation_id: &str,
        config: &BackendConfig,
    ) -> Result<ResolvedResource, CommError> {
        let base_url = config
            .base_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                CommError::config(
                    COMPONENT,
                    OP_RESOLVE,
                    correlation_id,
                    format!("backend '{}' has no base url", config.key),
                )
            })?;
        Ok(ResolvedResource::from_static(
            base_url,
            config.api_key.clone(),
        ))
    }

    async fn discover(
        &self,
        correlation_id: &str,
        config: &BackendConfig,
    ) -> Result<ResolvedResource, CommError> {
        let discoverable = config.discoverable.as_ref().filter(|d| !d.name.is_empty());
        let discoverable = discoverable.ok_or_else(|| {
            CommError::config(
                COMPONENT,
                OP_RESOLVE,
                correlation_id,
                format!("backend '{}' has no discovery name", config.key),
            )
        })?;

        let outcome = self
            .discovery
            .get_service(correlation_id, &discoverable.name)
            .await?;
        if !outcome.success {
            return Err(CommError::discovery(
                COMPONENT,
                OP_RESOLVE,
                correlation_id,
                format!("provider reported failure for '{}'", discoverable.name),
            ));
        }
        let location = outcome.results.as_ref().ok_or_else(|| {
            CommError::discovery(
                COMPONENT,
                OP_RESOLVE,
                correlation_id,
                format!("provider returned no result for '{}'", discoverable.name),
            )
        })?;

        ResolvedResource::from_location(
            location,
            discoverable.root.as_deref(),
            config.api_key.clone(),
        )
        .ok_or_else(|| {
            CommError::discovery(
                COMPONENT,
                OP_RESOLVE,
                correlation_id,
                format!(
                    "provider result for '{}' carries neither address nor dns",
                    discoverable.name
                ),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticBackendProvider;
    use crate::domain::value_objects::{DiscoveryOutcome, DnsDescriptor};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Discovery stub that counts lookups and can delay to widen the race
    /// window.
    struct CountingDiscovery {
        calls: AtomicUsize,
        outcome: DiscoveryOutcome,
        delay: Option<Duration>,
    }

    impl CountingDiscovery {
        fn returning(outcome: DiscoveryOutcome) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome,
                delay: None,
            }
        }

        fn slow(outcome: DiscoveryOutcome, delay: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome,
                delay: Some(delay),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DiscoveryClient for CountingDiscovery {
        async fn get_service(
            &self,
            _correlation_id: &str,
            _name: &str,
        ) -> Result<DiscoveryOutcome, CommError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.outcome.clone())
        }
    }

    fn location(address: &str, port: Option<u16>, secure: bool) -> ServiceLocation {
        ServiceLocation {
            address: Some(address.to_string()),
            port,
            secure,
            dns: None,
        }
    }

    fn resolver_with(
        backends: Vec<BackendConfig>,
        discovery: Arc<CountingDiscovery>,
    ) -> ResourceResolver {
        ResourceResolver::new(Arc::new(StaticBackendProvider::new(backends)), discovery)
    }

    #[tokio::test]
    async fn test_static_backend_never_touches_discovery() {
        let discovery = Arc::new(CountingDiscovery::returning(DiscoveryOutcome::failed()));
        let resolver = resolver_with(
            vec![BackendConfig::new("users", "https://users.internal").with_api_key("k")],
            discovery.clone(),
        );

        let r = resolver.resolve("cid", "users", None).await.unwrap();
        assert_eq!(r.url, "https://users.internal");
        assert_eq!(r.authentication.api_key.as_deref(), Some("k"));
        assert_eq!(discovery.calls(), 0);
        assert_eq!(resolver.cached_len(), 0);
    }

    #[tokio::test]
    async fn test_unknown_key_is_config_error() {
        let discovery = Arc::new(CountingDiscovery::returning(DiscoveryOutcome::failed()));
        let resolver = resolver_with(vec![], discovery);
        let err = resolver.resolve("cid", "missing", None).await.unwrap_err();
        assert!(matches!(err, CommError::Config { .. }));
    }

    #[tokio::test]
    async fn test_static_backend_without_url_is_config_error() {
        let discovery = Arc::new(CountingDiscovery::returning(DiscoveryOutcome::failed()));
        let mut cfg = BackendConfig::new("users", "");
        cfg.base_url = None;
        let resolver = resolver_with(vec![cfg], discovery);
        let err = resolver.resolve("cid", "users", None).await.unwrap_err();
        assert!(matches!(err, CommError::Config { .. }));
    }

    #[tokio::test]
    async fn test_discoverable_backend_resolves_and_caches() {
        let discovery = Arc::new(CountingDiscovery::returning(DiscoveryOutcome::found(
            location("10.0.0.1", Some(8080), false),
        )));
        let resolver = resolver_with(
            vec![BackendConfig::discoverable("orders", "orders-svc")],
            discovery.clone(),
        );

        let first = resolver.resolve("cid", "orders", None).await.unwrap();
        assert_eq!(first.url, "http://10.0.0.1:8080");
        let second = resolver.resolve("cid", "orders", None).await.unwrap();
        assert_eq!(first.url, second.url);
        assert_eq!(discovery.calls(), 1);
        assert_eq!(resolver.cached_len(), 1);
    }

    #[tokio::test]
    async fn test_discovery_root_appended() {
        let discovery = Arc::new(CountingDiscovery::returning(DiscoveryOutcome::found(
            location("api.example.com", None, true),
        )));
        let resolver = resolver_with(
            vec![BackendConfig::discoverable("billing", "billing-svc").with_discovery_root("/v1")],
            discovery,
        );
        let r = resolver.resolve("cid", "billing", None).await.unwrap();
        assert_eq!(r.url, "https://api.example.com/v1");
    }

    #[tokio::test]
    async fn test_dns_descriptor_composition() {
        let discovery = Arc::new(CountingDiscovery::returning(DiscoveryOutcome::found(
            ServiceLocation {
                address: None,
                port: Some(443),
                secure: true,
                dns: Some(DnsDescriptor {
                    label: "svc".to_string(),
                    namespace: Some("ns".to_string()),
                    local: true,
                }),
            },
        )));
        let resolver = resolver_with(
            vec![BackendConfig::discoverable("geo", "geo-svc")],
            discovery,
        );
        let r = resolver.resolve("cid", "geo", None).await.unwrap();
        assert_eq!(r.address, "svc.ns.local");
        assert_eq!(r.url, "https://svc.ns.local:443");
    }

    #[tokio::test]
    async fn test_provider_failure_is_discovery_error() {
        let discovery = Arc::new(CountingDiscovery::returning(DiscoveryOutcome::failed()));
        let resolver = resolver_with(
            vec![BackendConfig::discoverable("orders", "orders-svc")],
            discovery,
        );
        let err = resolver.resolve("cid", "orders", None).await.unwrap_err();
        assert!(matches!(err, CommError::Discovery { .. }));
    }

    #[tokio::test]
    async fn test_result_without_address_is_discovery_error() {
        let discovery = Arc::new(CountingDiscovery::returning(DiscoveryOutcome::found(
            ServiceLocation::default(),
        )));
        let resolver = resolver_with(
            vec![BackendConfig::discoverable("orders", "orders-svc")],
            discovery,
        );
        let err = resolver.resolve("cid", "orders", None).await.unwrap_err();
        assert!(matches!(err, CommError::Discovery { .. }));
    }

    #[tokio::test]
    async fn test_missing_discovery_name_is_config_error() {
        let discovery = Arc::new(CountingDiscovery::returning(DiscoveryOutcome::found(
            location("10.0.0.1", None, false),
        )));
        let resolver = resolver_with(
            vec![BackendConfig::discoverable("orders", "")],
            discovery.clone(),
        );
        let err = resolver.resolve("cid", "orders", None).await.unwrap_err();
        assert!(matches!(err, CommError::Config { .. }));
        assert_eq!(discovery.calls(), 0);
    }

    #[tokio::test]
    async fn test_override_bypasses_config_and_cache() {
        let discovery = Arc::new(CountingDiscovery::returning(DiscoveryOutcome::failed()));
        let resolver = resolver_with(vec![], discovery.clone());

        let over = location("192.168.1.5", Some(9000), false);
        let r = resolver.resolve("cid", "anything", Some(&over)).await.unwrap();
        assert_eq!(r.url, "http://192.168.1.5:9000");
        assert_eq!(discovery.calls(), 0);
        assert_eq!(resolver.cached_len(), 0);
    }

    #[tokio::test]
    async fn test_empty_override_is_config_error() {
        let discovery = Arc::new(CountingDiscovery::returning(DiscoveryOutcome::failed()));
        let resolver = resolver_with(vec![], discovery);
        let over = ServiceLocation::default();
        let err = resolver.resolve("cid", "k", Some(&over)).await.unwrap_err();
        assert!(matches!(err, CommError::Config { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_first_resolution_single_discovery_call() {
        let discovery = Arc::new(CountingDiscovery::slow(
            DiscoveryOutcome::found(location("10.0.0.1", Some(8080), false)),
            Duration::from_millis(50),
        ));
        let resolver = Arc::new(resolver_with(
            vec![BackendConfig::discoverable("orders", "orders-svc")],
            discovery.clone(),
        ));

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let resolver = resolver.clone();
                tokio::spawn(async move {
                    resolver
                        .resolve(&format!("cid-{}", i), "orders", None)
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut urls = Vec::new();
        for task in tasks {
            urls.push(task.await.unwrap().url);
        }
        assert!(urls.iter().all(|u| u == "http://10.0.0.1:8080"));
        assert_eq!(discovery.calls(), 1);
        assert_eq!(resolver.cached_len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_resolve_independently() {
        let discovery = Arc::new(CountingDiscovery::returning(DiscoveryOutcome::found(
            location("10.0.0.1", Some(8080), false),
        )));
        let resolver = resolver_with(
            vec![
                BackendConfig::discoverable("orders", "orders-svc"),
                BackendConfig::discoverable("billing", "billing-svc"),
            ],
            discovery.clone(),
        );

        resolver.resolve("cid", "orders", None).await.unwrap();
        resolver.resolve("cid", "billing", None).await.unwrap();
        assert_eq!(discovery.calls(), 2);
        assert_eq!(resolver.cached_len(), 2);
    }
}
