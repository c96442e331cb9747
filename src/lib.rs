// src/lib.rs
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod pool;
pub mod probe;
pub mod resolver;
pub mod stats;
pub mod types;
pub mod utils;
pub mod wildcard;

pub use engine::DnsSearchEngine;
pub use pool::{ResultSink, Shutdown, WorkerPool};
pub use probe::{Probe, Prober};
pub use resolver::{DnsLookup, LookupFailure, Resolver};
pub use types::{Config, DnsSearchError, ProbeResult, RecordTypes, RunStats};
pub use wildcard::WildcardSignature;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
