// src/pool.rs
use crate::error::Result;
use crate::probe::Probe;
use crate::stats::StatsTracker;
use crate::types::{DnsSearchError, ProbeResult, RunStats};
use futures::future::join_all;
use log::{debug, error, info};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};

/// Receives findings in completion order.
///
/// Runs on a blocking thread of its own, so slow writes never hold up
/// the DNS workers.
pub trait ResultSink: Send {
    fn on_result(&mut self, result: &ProbeResult) -> Result<()>;

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Cooperative stop request shared between the signal handler and the pool.
#[derive(Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx: Arc::new(tx), rx }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|stop| *stop).await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives a fixed number of concurrent probes over a candidate stream.
pub struct WorkerPool {
    concurrency: usize,
    stats: StatsTracker,
}

impl WorkerPool {
    pub fn new(concurrency: usize) -> Result<Self> {
        if concurrency == 0 {
            return Err(DnsSearchError::ConfigError(
                "Concurrency must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            concurrency,
            stats: StatsTracker::new(),
        })
    }

    /// Returns once the candidates are exhausted (or `shutdown` fired) and
    /// every in-flight probe plus the sink have finished.
    pub async fn run<I, P, S>(
        &self,
        candidates: I,
        probe: Arc<P>,
        sink: S,
        shutdown: Shutdown,
    ) -> Result<RunStats>
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
        P: Probe + ?Sized + 'static,
        S: ResultSink + 'static,
    {
        let (candidate_tx, candidate_rx) = mpsc::channel::<String>(self.concurrency);
        let (result_tx, mut result_rx) = mpsc::unbounded_channel::<ProbeResult>();

        let sink_handle = tokio::task::spawn_blocking(move || {
            let mut sink = sink;
            while let Some(result) = result_rx.blocking_recv() {
                if let Err(e) = sink.on_result(&result) {
                    error!("Failed to output result for {}: {}", result.hostname, e);
                }
            }
            if let Err(e) = sink.finish() {
                error!("Failed to flush output: {}", e);
            }
        });

        let feeder_shutdown = shutdown.clone();
        let candidates = candidates.into_iter();
        let feeder = tokio::spawn(async move {
            for label in candidates {
                let label = label.trim().to_string();
                if label.is_empty() {
                    continue;
                }

                tokio::select! {
                    biased;
                    _ = feeder_shutdown.triggered() => {
                        info!("Shutdown requested, no further candidates will be dispatched");
                        break;
                    }
                    sent = candidate_tx.send(label) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        let candidate_rx = Arc::new(Mutex::new(candidate_rx));
        let workers: Vec<_> = (0..self.concurrency)
            .map(|id| {
                let candidate_rx = Arc::clone(&candidate_rx);
                let probe = Arc::clone(&probe);
                let result_tx = result_tx.clone();
                let stats = self.stats.clone();
                let shutdown = shutdown.clone();

                tokio::spawn(async move {
                    loop {
                        if shutdown.is_triggered() {
                            break;
                        }

                        let next = candidate_rx.lock().await.recv().await;
                        let Some(label) = next else {
                            break;
                        };

                        stats.record_execution();
                        if let Some(result) = probe.probe(&label).await {
                            stats.record_result();
                            if result_tx.send(result).is_err() {
                                error!("Result sink is gone, worker {} stopping", id);
                                break;
                            }
                        }
                    }
                    debug!("Worker {} done", id);
                })
            })
            .collect();
        // Workers own the only handles now: if they all die, the feeder's
        // send fails instead of blocking on a full queue.
        drop(candidate_rx);
        drop(result_tx);

        if let Err(e) = feeder.await {
            error!("Candidate feeder failed: {}", e);
        }
        for outcome in join_all(workers).await {
            if let Err(e) = outcome {
                error!("Worker task failed: {}", e);
            }
        }
        if let Err(e) = sink_handle.await {
            error!("Result sink task failed: {}", e);
        }

        Ok(self.stats.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    /// Labels starting with "live" are found, everything else is not.
    struct PrefixProbe;

    #[async_trait]
    impl Probe for PrefixProbe {
        async fn probe(&self, label: &str) -> Option<ProbeResult> {
            tokio::time::sleep(Duration::from_millis(1)).await;
            label.starts_with("live").then(|| ProbeResult {
                hostname: format!("{}.example.com", label),
                addresses: vec!["192.0.2.1".to_string()],
                txt_records: Vec::new(),
                canonical_name: None,
            })
        }
    }

    #[derive(Clone, Default)]
    struct CollectingSink(Arc<StdMutex<Vec<ProbeResult>>>);

    impl ResultSink for CollectingSink {
        fn on_result(&mut self, result: &ProbeResult) -> Result<()> {
            self.0.lock().unwrap().push(result.clone());
            Ok(())
        }
    }

    struct PanickingHost;

    #[async_trait]
    impl Probe for PanickingHost {
        async fn probe(&self, label: &str) -> Option<ProbeResult> {
            panic!("resolver blew up on {}", label);
        }
    }

    struct FailingSink;

    impl ResultSink for FailingSink {
        fn on_result(&mut self, _result: &ProbeResult) -> Result<()> {
            Err(DnsSearchError::OutputError("broken pipe".to_string()))
        }
    }

    fn candidates(live: usize, dead: usize) -> Vec<String> {
        (0..live)
            .map(|i| format!("live{}", i))
            .chain((0..dead).map(|i| format!("dead{}", i)))
            .collect()
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        assert!(matches!(WorkerPool::new(0), Err(DnsSearchError::ConfigError(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_candidate_probed_once() {
        let sink = CollectingSink::default();
        let pool = WorkerPool::new(8).unwrap();
        let stats = pool
            .run(candidates(30, 70), Arc::new(PrefixProbe), sink.clone(), Shutdown::new())
            .await
            .unwrap();

        assert_eq!(stats.executions, 100);
        assert_eq!(stats.positive_results, 30);

        let found: HashSet<String> = sink.0.lock().unwrap().iter().map(|r| r.hostname.clone()).collect();
        assert_eq!(found.len(), 30);
        assert!(found.contains("live0.example.com"));
    }

    #[tokio::test]
    async fn test_results_independent_of_concurrency() {
        let mut outcomes = Vec::new();
        for n in [1, 3, 16] {
            let sink = CollectingSink::default();
            WorkerPool::new(n)
                .unwrap()
                .run(candidates(10, 10), Arc::new(PrefixProbe), sink.clone(), Shutdown::new())
                .await
                .unwrap();
            let mut results = sink.0.lock().unwrap().clone();
            results.sort();
            outcomes.push(results);
        }
        assert_eq!(outcomes[0], outcomes[1]);
        assert_eq!(outcomes[1], outcomes[2]);
    }

    #[tokio::test]
    async fn test_blank_candidates_skipped() {
        let labels = vec!["live".to_string(), "  ".to_string(), String::new(), "dead".to_string()];
        let stats = WorkerPool::new(2)
            .unwrap()
            .run(labels, Arc::new(PrefixProbe), CollectingSink::default(), Shutdown::new())
            .await
            .unwrap();
        assert_eq!(stats.executions, 2);
    }

    #[tokio::test]
    async fn test_shutdown_before_start_dispatches_nothing() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let stats = WorkerPool::new(4)
            .unwrap()
            .run(candidates(5, 5), Arc::new(PrefixProbe), CollectingSink::default(), shutdown)
            .await
            .unwrap();
        assert_eq!(stats.executions, 0);
        assert_eq!(stats.positive_results, 0);
    }

    #[tokio::test]
    async fn test_shutdown_mid_run_stops_dispatch() {
        let shutdown = Shutdown::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.trigger();
        });

        let stats = WorkerPool::new(2)
            .unwrap()
            .run(candidates(0, 100_000), Arc::new(PrefixProbe), CollectingSink::default(), shutdown)
            .await
            .unwrap();
        assert!(stats.executions < 100_000);
    }

    #[tokio::test]
    async fn test_sink_errors_do_not_abort_run() {
        let stats = WorkerPool::new(4)
            .unwrap()
            .run(candidates(5, 5), Arc::new(PrefixProbe), FailingSink, Shutdown::new())
            .await
            .unwrap();
        assert_eq!(stats.executions, 10);
        assert_eq!(stats.positive_results, 5);
    }

    #[tokio::test]
    async fn test_panicking_workers_do_not_hang_run() {
        let pool = WorkerPool::new(2).unwrap();
        let run = pool.run(
            candidates(0, 50),
            Arc::new(PanickingHost),
            CollectingSink::default(),
            Shutdown::new(),
        );

        let stats = tokio::time::timeout(Duration::from_secs(3), run)
            .await
            .expect("run returned after every worker died")
            .unwrap();
        assert_eq!(stats.executions, 2);
        assert_eq!(stats.positive_results, 0);
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_triggered());
        shutdown.trigger();
        shutdown.trigger();
        assert!(shutdown.is_triggered());
        shutdown.triggered().await;
    }
}
