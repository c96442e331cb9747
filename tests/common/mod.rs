#![allow(dead_code)]

use async_trait::async_trait;
use dnssearch::pool::ResultSink;
use dnssearch::resolver::{DnsLookup, LookupFailure};
use dnssearch::types::{DnsSearchError, ProbeResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory zone. Names without an entry are NXDOMAIN, unless a wildcard
/// answer is configured, in which case every unknown name gets it.
#[derive(Default)]
pub struct StubZone {
    pub addresses: HashMap<String, Vec<String>>,
    pub txts: HashMap<String, Vec<String>>,
    pub cnames: HashMap<String, String>,
    pub wildcard: Option<Vec<String>>,
    pub broken: bool,
    pub latency: Duration,
    pub address_queries: AtomicUsize,
}

impl StubZone {
    pub fn with_address(mut self, name: &str, addrs: &[&str]) -> Self {
        self.addresses
            .insert(name.to_string(), addrs.iter().map(|a| a.to_string()).collect());
        self
    }

    pub fn with_txt(mut self, name: &str, txt: &str) -> Self {
        self.txts.insert(name.to_string(), vec![txt.to_string()]);
        self
    }

    pub fn with_cname(mut self, name: &str, target: &str) -> Self {
        self.cnames.insert(name.to_string(), target.to_string());
        self
    }

    pub fn with_wildcard(mut self, addrs: &[&str]) -> Self {
        self.wildcard = Some(addrs.iter().map(|a| a.to_string()).collect());
        self
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl DnsLookup for StubZone {
    async fn lookup_addresses(&self, name: &str) -> Result<Vec<String>, LookupFailure> {
        self.address_queries.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        if self.broken {
            return Err(LookupFailure::Other("connection refused".to_string()));
        }
        if let Some(addrs) = self.addresses.get(name) {
            return Ok(addrs.clone());
        }
        self.wildcard.clone().ok_or(LookupFailure::NoSuchHost)
    }

    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, LookupFailure> {
        self.delay().await;
        self.txts.get(name).cloned().ok_or(LookupFailure::NoSuchHost)
    }

    async fn lookup_cname(&self, name: &str) -> Result<String, LookupFailure> {
        self.delay().await;
        if let Some(target) = self.cnames.get(name) {
            return Ok(target.clone());
        }
        if self.addresses.contains_key(name) {
            return Ok(format!("{}.", name));
        }
        Err(LookupFailure::NoSuchHost)
    }
}

#[derive(Clone, Default)]
pub struct MemorySink(pub Arc<Mutex<Vec<ProbeResult>>>);

impl MemorySink {
    pub fn sorted(&self) -> Vec<ProbeResult> {
        let mut results = self.0.lock().unwrap().clone();
        results.sort();
        results
    }
}

impl ResultSink for MemorySink {
    fn on_result(&mut self, result: &ProbeResult) -> Result<(), DnsSearchError> {
        self.0.lock().unwrap().push(result.clone());
        Ok(())
    }
}

pub fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}
