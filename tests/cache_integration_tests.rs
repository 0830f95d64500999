//! Integration Tests for the Cache
//!
//! Exercises the public API end to end: expiry over real time, the background
//! sweep, the sweep time budget and concurrent access from many threads.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use ttl_cache::{Cache, CacheConfig, ExpiryObserver, SweepReport};

// == Helper Functions ==

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_cache=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

fn fast_sweep_config(interval: Duration) -> CacheConfig {
    CacheConfig::default()
        .with_min_sweep_interval(Duration::ZERO)
        .with_sweep_interval(interval)
}

#[derive(Default)]
struct CountingObserver {
    reports: Mutex<Vec<SweepReport>>,
}

impl ExpiryObserver for CountingObserver {
    fn on_sweep(&self, report: &SweepReport) {
        self.reports.lock().unwrap().push(report.clone());
    }

    fn on_lazy_expire(&self, _key: &str) {}
}

// == Expiry Scenarios ==

#[tokio::test]
async fn test_mixed_ttl_scenario() {
    init_tracing();
    let cache = Cache::new(CacheConfig::default().with_diagnostics(true)).unwrap();

    cache.set("a", "x", None);
    cache.set("b", "y", Some(Duration::from_secs(2)));

    assert_eq!(cache.get("a"), Some(Bytes::from("x")));
    assert_eq!(cache.get("b"), Some(Bytes::from("y")));

    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert_eq!(cache.get("b"), None);
    assert_eq!(cache.get("a"), Some(Bytes::from("x")));
}

#[tokio::test]
async fn test_api_walkthrough() {
    let cache = Cache::new(CacheConfig::default()).unwrap();

    cache.set("1", "Hello World", None);
    cache.set("2", "Hello World 2", Some(Duration::from_secs(1)));
    cache.set("3", "Hello World 3", None);

    assert_eq!(cache.get("1").as_deref(), Some(&b"Hello World"[..]));
    assert_eq!(cache.get("test"), None);

    cache.del("1");
    assert_eq!(cache.get("1"), None);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(cache.get("2"), None, "key 2 should be expired");

    cache.renew("3", Some(Duration::from_secs(1)));
    assert!(cache.get("3").is_some(), "key 3 should still be readable");

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(cache.get("3"), None, "key 3 should be expired");
}

#[tokio::test]
async fn test_renew_extends_lifetime() {
    let cache = Cache::new(CacheConfig::default()).unwrap();

    cache.set("key", "value", Some(Duration::from_millis(300)));
    tokio::time::sleep(Duration::from_millis(200)).await;
    cache.renew("key", Some(Duration::from_millis(500)));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(cache.get("key").is_some(), "renewed key should outlive its first TTL");

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(cache.get("key"), None);
}

// == Background Sweep ==

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_background_sweep_reclaims_without_reads() {
    init_tracing();
    let cache = Cache::new(fast_sweep_config(Duration::from_secs(1))).unwrap();

    for i in 0..50_000 {
        cache.set(format!("key_{}", i), "value", Some(Duration::from_millis(1500)));
    }
    assert_eq!(cache.len(), 50_000);
    assert_eq!(cache.expiring_len(), 50_000);

    tokio::time::sleep(Duration::from_secs(3)).await;

    // Inspected through sizes only: no get() is ever issued
    assert_eq!(cache.len(), 0);
    assert_eq!(cache.expiring_len(), 0);

    let stats = cache.stats();
    assert_eq!(stats.swept, 50_000);
    assert_eq!(stats.lazy_expirations, 0);
    assert_eq!(stats.hits + stats.misses, 0);
}

#[tokio::test]
async fn test_background_sweep_reports_to_observer() {
    let observer = Arc::new(CountingObserver::default());
    let cache = Cache::with_observer(
        fast_sweep_config(Duration::from_millis(100)),
        observer.clone(),
    )
    .unwrap();

    cache.set("short", "v", Some(Duration::from_millis(50)));
    tokio::time::sleep(Duration::from_millis(450)).await;

    let reports = observer.reports.lock().unwrap();
    assert!(reports.len() >= 2, "expected several sweeps, got {}", reports.len());
    assert_eq!(reports.iter().map(|r| r.removed).sum::<usize>(), 1);
}

#[tokio::test]
async fn test_sweep_respects_time_budget() {
    let config = CacheConfig::default()
        .with_max_sweep_duration(Duration::ZERO)
        .with_sweep_batch_size(1_000);
    let cache = Cache::new(config).unwrap();

    for i in 0..20_000 {
        cache.set(format!("key_{}", i), "value", Some(Duration::from_millis(1)));
    }
    tokio::time::sleep(Duration::from_millis(20)).await;

    let report = cache.sweep_now();
    assert!(report.aborted);
    assert_eq!(report.examined, 1_000);
    assert_eq!(report.removed, 1_000);
    assert_eq!(report.remaining_entries, 19_000);

    // Leftovers are still never returned by reads
    assert_eq!(cache.get("key_0"), None);
    assert_eq!(cache.get("key_19999"), None);
    assert_eq!(cache.stats().aborted_sweeps, 1);
}

#[tokio::test]
async fn test_sweep_interval_below_floor_uses_default() {
    let cache = Cache::new(CacheConfig::default().with_sweep_interval(Duration::from_secs(5)))
        .unwrap();
    assert_eq!(cache.sweep_interval(), Duration::from_secs(30));

    let cache = Cache::new(CacheConfig::default().with_sweep_interval(Duration::from_secs(15)))
        .unwrap();
    assert_eq!(cache.sweep_interval(), Duration::from_secs(15));
}

// == Concurrency ==

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_access_from_threads() {
    let cache = Cache::new(fast_sweep_config(Duration::from_millis(20))).unwrap();

    let workers: Vec<_> = (0..8)
        .map(|worker| {
            let cache = cache.clone();
            thread::spawn(move || {
                for i in 0..2_000 {
                    let shared_key = format!("shared_{}", i % 50);
                    let own_key = format!("own_{}_{}", worker, i);

                    cache.set(own_key.clone(), format!("{}", i), None);
                    assert_eq!(cache.get(&own_key), Some(Bytes::from(format!("{}", i))));

                    match i % 4 {
                        0 => cache.set(shared_key, "v", Some(Duration::from_millis(5))),
                        1 => cache.renew(&shared_key, Some(Duration::from_millis(10))),
                        2 => {
                            let _ = cache.get(&shared_key);
                        }
                        _ => cache.del(&shared_key),
                    }
                    cache.del(&own_key);
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().expect("worker thread panicked");
    }

    assert!(cache.expiring_len() <= cache.len());
    for i in 0..8 {
        assert_eq!(cache.get(&format!("own_{}_0", i)), None);
    }
}
