// src/resolver.rs
use crate::types::{DnsSearchError, ResolverConfig};
use async_trait::async_trait;
use log::debug;
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;
use trust_dns_resolver::config::{
    LookupIpStrategy, NameServerConfig, Protocol, ResolverConfig as DnsResolverConfig, ResolverOpts,
};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::op::ResponseCode;
use trust_dns_resolver::proto::rr::{RData, RecordType};
use trust_dns_resolver::TokioAsyncResolver;

/// Why a single lookup produced no answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupFailure {
    /// NXDOMAIN, or the name has no records of the requested type.
    #[error("no such host")]
    NoSuchHost,

    /// Timeouts, SERVFAIL, refused queries, socket errors.
    #[error("{0}")]
    Other(String),
}

/// The three lookups a probe needs from the host resolver.
#[async_trait]
pub trait DnsLookup: Send + Sync {
    async fn lookup_addresses(&self, name: &str) -> Result<Vec<String>, LookupFailure>;
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, LookupFailure>;

    /// Returns the alias target of `name`, or `name` itself when it exists
    /// without an alias.
    async fn lookup_cname(&self, name: &str) -> Result<String, LookupFailure>;
}

pub struct Resolver {
    resolver: TokioAsyncResolver,
}

impl Resolver {
    pub fn new(config: &ResolverConfig) -> Result<Self, DnsSearchError> {
        let (resolver_config, opts) = if config.use_system_resolver {
            trust_dns_resolver::system_conf::read_system_conf()
                .map_err(|e| DnsSearchError::ResolverError(format!("Failed to read system resolver configuration: {}", e)))?
        } else {
            let mut resolver_config = DnsResolverConfig::new();

            for ns in &config.nameservers {
                let socket_addr = SocketAddr::from_str(ns)
                    .map_err(|e| DnsSearchError::ConfigError(format!("Invalid nameserver address {}: {}", ns, e)))?;
                resolver_config.add_name_server(NameServerConfig {
                    socket_addr,
                    protocol: Protocol::Udp,
                    tls_dns_name: None,
                    trust_negative_responses: false,
                    bind_addr: None,
                });
            }

            (resolver_config, ResolverOpts::default())
        };

        Ok(Self {
            resolver: TokioAsyncResolver::tokio(resolver_config, resolver_opts(opts, config)),
        })
    }
}

/// Applies our timeout and attempts; address lookups ask for A and AAAA.
fn resolver_opts(mut opts: ResolverOpts, config: &ResolverConfig) -> ResolverOpts {
    opts.timeout = config.timeout;
    opts.attempts = config.attempts;
    opts.ip_strategy = LookupIpStrategy::Ipv4AndIpv6;
    opts
}

#[async_trait]
impl DnsLookup for Resolver {
    async fn lookup_addresses(&self, name: &str) -> Result<Vec<String>, LookupFailure> {
        let lookup = self.resolver.lookup_ip(name).await.map_err(classify)?;
        let addrs: Vec<String> = lookup.iter().map(|ip| ip.to_string()).collect();

        if addrs.is_empty() {
            return Err(LookupFailure::NoSuchHost);
        }
        Ok(addrs)
    }

    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, LookupFailure> {
        let lookup = self.resolver.txt_lookup(name).await.map_err(classify)?;

        Ok(lookup
            .iter()
            .map(|txt| {
                txt.txt_data()
                    .iter()
                    .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
                    .collect::<String>()
            })
            .collect())
    }

    async fn lookup_cname(&self, name: &str) -> Result<String, LookupFailure> {
        match self.resolver.lookup(name, RecordType::CNAME).await {
            Ok(lookup) => {
                let target = lookup.iter().find_map(|rdata| match rdata {
                    RData::CNAME(cname) => Some(cname.0.to_string()),
                    _ => None,
                });
                Ok(target.unwrap_or_else(|| name.to_string()))
            }
            Err(e) => {
                // NODATA: the name exists but carries no alias.
                let exists = matches!(
                    e.kind(),
                    ResolveErrorKind::NoRecordsFound { response_code, .. } if *response_code == ResponseCode::NoError
                );
                if exists {
                    Ok(name.to_string())
                } else {
                    Err(classify(e))
                }
            }
        }
    }
}

fn classify(err: ResolveError) -> LookupFailure {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => LookupFailure::NoSuchHost,
        _ => {
            debug!("Lookup failed: {}", err);
            LookupFailure::Other(err.to_string())
        }
    }
}
