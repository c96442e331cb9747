// src/probe.rs
use crate::resolver::DnsLookup;
use crate::types::{ProbeResult, RecordTypes};
use crate::wildcard::WildcardSignature;
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

/// One candidate label in, at most one finding out.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, label: &str) -> Option<ProbeResult>;
}

/// Queries the configured record types for `<label>.<domain>`.
pub struct Prober {
    domain: String,
    records: RecordTypes,
    wildcard: Option<WildcardSignature>,
    lookup: Arc<dyn DnsLookup>,
}

impl Prober {
    pub fn new(
        domain: impl Into<String>,
        records: RecordTypes,
        wildcard: Option<WildcardSignature>,
        lookup: Arc<dyn DnsLookup>,
    ) -> Self {
        Self {
            domain: domain.into(),
            records,
            wildcard,
            lookup,
        }
    }

    pub fn hostname(&self, label: &str) -> String {
        format!("{}.{}", label, self.domain)
    }
}

#[async_trait]
impl Probe for Prober {
    async fn probe(&self, label: &str) -> Option<ProbeResult> {
        let hostname = self.hostname(label);
        let mut result = ProbeResult {
            hostname: hostname.clone(),
            addresses: Vec::new(),
            txt_records: Vec::new(),
            canonical_name: None,
        };

        if self.records.a {
            match self.lookup.lookup_addresses(&hostname).await {
                Ok(addrs) => {
                    if let Some(wildcard) = &self.wildcard {
                        if wildcard.matches(&addrs) {
                            debug!("{} answers with the wildcard signature, skipping", hostname);
                            return None;
                        }
                    }
                    result.addresses = addrs;
                }
                Err(e) => debug!("A lookup for {}: {}", hostname, e),
            }
        }

        if self.records.txt {
            match self.lookup.lookup_txt(&hostname).await {
                Ok(txts) => result.txt_records = txts,
                Err(e) => debug!("TXT lookup for {}: {}", hostname, e),
            }
        }

        if self.records.cname {
            match self.lookup.lookup_cname(&hostname).await {
                Ok(cname) => result.canonical_name = normalize_cname(&cname, &hostname),
                Err(e) => debug!("CNAME lookup for {}: {}", hostname, e),
            }
        }

        if result.has_evidence() {
            Some(result)
        } else {
            None
        }
    }
}

/// Trims the root dot; a name echoed back by the resolver is no alias.
fn normalize_cname(cname: &str, hostname: &str) -> Option<String> {
    let trimmed = cname.trim_end_matches('.');
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(hostname.trim_end_matches('.')) {
        None
    } else {
        Some(trimmed.to_string())
    }
}
