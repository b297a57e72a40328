//! Concurrent verification against a shared backend instance.

use async_trait::async_trait;
use futures::future::join_all;
use notary_backend::{
    Backend, BackendRegistry, HostConfig, Result, VerificationRequest, VerificationResult,
    VerifierHost,
};
use std::sync::Arc;
use std::time::Duration;

/// Echoes the request back after a delay derived from the port, so later
/// requests regularly finish before earlier ones.
struct DelayedEcho;

#[async_trait]
impl Backend for DelayedEcho {
    fn name(&self) -> &str {
        "DelayedEcho"
    }

    async fn verify(&self, request: &VerificationRequest) -> Result<VerificationResult> {
        let delay = u64::from(request.port % 7) * 3;
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(VerificationResult::verified(format!(
            "{}|{}|{}",
            request.host, request.port, request.fingerprint
        )))
    }
}

fn requests(n: u16) -> Vec<VerificationRequest> {
    (0..n)
        .map(|i| VerificationRequest::new(format!("host{i}.example.org"), 1000 + i, format!("FP{i}")))
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_calls_do_not_cross_talk() {
    let backend: Arc<dyn Backend> = Arc::new(DelayedEcho);
    let requests = requests(64);

    let results = join_all(requests.iter().map(|req| {
        let backend = Arc::clone(&backend);
        let req = req.clone();
        tokio::spawn(async move { backend.verify(&req).await })
    }))
    .await;

    for (req, joined) in requests.iter().zip(results) {
        let result = joined.expect("task").expect("answer");
        assert_eq!(
            result.fingerprint_to_cache.as_deref(),
            Some(format!("{}|{}|{}", req.host, req.port, req.fingerprint).as_str())
        );
    }
}

#[tokio::test]
async fn host_resolves_each_request_independently() {
    let config = HostConfig {
        backend: "pinned".to_string(),
        options: Some("pin=a.example.org:443/AA:AA; pin=b.example.org:443/BB:BB".to_string()),
        template_dir: "/nonexistent".into(),
        ..HostConfig::default()
    };
    let host = VerifierHost::new(&config, BackendRegistry::builtin()).expect("start");

    let cases = [
        ("a.example.org", "AA:AA", true),
        ("b.example.org", "AA:AA", false),
        ("b.example.org", "BB:BB", true),
        ("a.example.org", "BB:BB", false),
    ];
    let requests: Vec<_> = cases
        .iter()
        .cycle()
        .take(40)
        .map(|(h, fp, _)| VerificationRequest::new(*h, 443, *fp))
        .collect();

    let results = join_all(requests.iter().map(|req| host.verify(req))).await;

    for ((_, _, expect_verified), result) in cases.iter().cycle().zip(results) {
        assert_eq!(result.expect("answer").is_verified(), *expect_verified);
    }
    let stats = host.stats();
    assert_eq!(stats.verified, 20);
    assert_eq!(stats.conflicts, 20);
}
