// src/types.rs
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONSUMERS: usize = 8;
pub const DEFAULT_WORDLIST: &str = "names.txt";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub domain: String,
    pub wordlist: PathBuf,
    pub consumers: usize,
    pub records: RecordTypes,
    pub force_tld: bool,
    pub skip_wildcard_detection: bool,
    pub resolver: ResolverConfig,
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain: String::new(),
            wordlist: PathBuf::from(DEFAULT_WORDLIST),
            consumers: DEFAULT_CONSUMERS,
            records: RecordTypes::default(),
            force_tld: true,
            skip_wildcard_detection: false,
            resolver: ResolverConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Which record types every probe queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTypes {
    pub a: bool,
    pub txt: bool,
    pub cname: bool,
}

impl Default for RecordTypes {
    fn default() -> Self {
        Self {
            a: true,
            txt: false,
            cname: false,
        }
    }
}

impl RecordTypes {
    pub fn any(&self) -> bool {
        self.a || self.txt || self.cname
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub file: Option<String>,
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            file: None,
            color: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub use_system_resolver: bool,
    pub nameservers: Vec<String>,
    pub timeout: Duration,
    pub attempts: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            use_system_resolver: true,
            nameservers: vec![
                "8.8.8.8:53".to_string(),
                "8.8.4.4:53".to_string(),
                "1.1.1.1:53".to_string(),
                "1.0.0.1:53".to_string(),
            ],
            timeout: Duration::from_secs(5),
            attempts: 2,
        }
    }
}

/// A positive finding for one fully-qualified hostname.
///
/// Only ever built with a non-empty hostname and at least one piece of
/// evidence; a candidate without evidence yields `None` instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProbeResult {
    pub hostname: String,
    pub addresses: Vec<String>,
    pub txt_records: Vec<String>,
    pub canonical_name: Option<String>,
}

impl ProbeResult {
    pub fn has_evidence(&self) -> bool {
        !self.addresses.is_empty() || !self.txt_records.is_empty() || self.canonical_name.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub executions: u64,
    pub positive_results: u64,
    pub elapsed: Duration,
    pub throughput: f64,
}

#[derive(Debug, Error)]
pub enum DnsSearchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("Wordlist error: {0}")]
    WordlistError(String),

    #[error("Resolver error: {0}")]
    ResolverError(String),

    #[error("Wildcard detection failed for {domain}: {message}")]
    WildcardDetection {
        domain: String,
        message: String,
    },

    #[error("Output error: {0}")]
    OutputError(String),

    #[error("Unknown error: {0}")]
    Unknown(#[from] anyhow::Error),
}
