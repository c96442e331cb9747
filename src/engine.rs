use crate::pool::{ResultSink, Shutdown, WorkerPool};
use crate::probe::Prober;
use crate::resolver::{DnsLookup, Resolver};
use crate::types::{Config, DnsSearchError, RunStats};
use crate::utils;
use crate::wildcard::{self, WildcardSignature};
use log::{info, warn};
use std::sync::Arc;
use std::time::Instant;

pub struct DnsSearchEngine {
    config: Config,
    lookup: Arc<dyn DnsLookup>,
}

impl DnsSearchEngine {
    pub fn new(config: Config) -> Result<Self, DnsSearchError> {
        let resolver = Resolver::new(&config.resolver)?;
        Self::with_lookup(config, Arc::new(resolver))
    }

    /// Builds an engine on top of any resolver implementation.
    pub fn with_lookup(mut config: Config, lookup: Arc<dyn DnsLookup>) -> Result<Self, DnsSearchError> {
        config.domain = if config.force_tld {
            utils::base_domain(&config.domain)
        } else {
            utils::normalize_domain(&config.domain)
        };

        if config.domain.is_empty() {
            return Err(DnsSearchError::InvalidDomain(
                "Invalid or empty domain specified".to_string(),
            ));
        }
        if !utils::is_valid_domain(&config.domain) {
            return Err(DnsSearchError::InvalidDomain(config.domain.clone()));
        }
        if !config.records.any() {
            return Err(DnsSearchError::ConfigError(
                "At least one record type (A, TXT, CNAME) must be enabled".to_string(),
            ));
        }
        if config.consumers == 0 {
            return Err(DnsSearchError::ConfigError(
                "Number of consumers must be greater than 0".to_string(),
            ));
        }

        Ok(Self { config, lookup })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn domain(&self) -> &str {
        &self.config.domain
    }

    /// Never fails: a broken detection only means results go unfiltered.
    pub async fn detect_wildcard(&self) -> Option<WildcardSignature> {
        if self.config.skip_wildcard_detection {
            info!("Wildcard detection disabled");
            return None;
        }

        match wildcard::detect_wildcard(self.lookup.as_ref(), &self.config.domain).await {
            Ok(Some(signature)) => {
                info!("Wildcard DNS detected for {}: {}", self.config.domain, signature);
                Some(signature)
            }
            Ok(None) => {
                info!("No wildcard DNS for {}", self.config.domain);
                None
            }
            Err(e) => {
                warn!("{}; continuing without wildcard filtering", e);
                None
            }
        }
    }

    /// Detects wildcards, then enumerates.
    pub async fn run<I, S>(&self, candidates: I, sink: S, shutdown: Shutdown) -> Result<RunStats, DnsSearchError>
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
        S: ResultSink + 'static,
    {
        let wildcard = self.detect_wildcard().await;
        self.run_with_wildcard(candidates, wildcard, sink, shutdown).await
    }

    pub async fn run_with_wildcard<I, S>(
        &self,
        candidates: I,
        wildcard: Option<WildcardSignature>,
        sink: S,
        shutdown: Shutdown,
    ) -> Result<RunStats, DnsSearchError>
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
        S: ResultSink + 'static,
    {
        let prober = Arc::new(Prober::new(
            self.config.domain.clone(),
            self.config.records,
            wildcard,
            Arc::clone(&self.lookup),
        ));
        let pool = WorkerPool::new(self.config.consumers)?;

        info!(
            "Enumerating {} with {} consumers",
            self.config.domain, self.config.consumers
        );
        let start_time = Instant::now();

        let stats = pool.run(candidates, prober, sink, shutdown).await?;

        info!(
            "Finished {}: {} requests, {} results in {:.2}s",
            self.config.domain,
            stats.executions,
            stats.positive_results,
            start_time.elapsed().as_secs_f64()
        );

        Ok(stats)
    }
}
