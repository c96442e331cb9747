use crate::types::{Config, OutputFormat};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
);

#[derive(Parser, Debug, Clone)]
#[command(
    name = "dnssearch",
    version,
    long_version = LONG_VERSION,
    about = "Subdomain enumeration through DNS brute-forcing",
    long_about = "dnssearch resolves every word of a wordlist as a subdomain of the target domain,\nfiltering out answers produced by wildcard DNS records."
)]
pub struct Args {
    /// Base domain to start enumeration from
    #[arg(short = 'd', long = "domain", value_name = "DOMAIN")]
    pub domain: Option<String>,

    /// Wordlist file to use for enumeration
    #[arg(short = 'w', long = "wordlist", value_name = "FILE")]
    pub wordlist: Option<PathBuf>,

    /// Number of concurrent consumers
    #[arg(short = 'c', long = "consumers", value_name = "N")]
    pub consumers: Option<usize>,

    /// Show A/AAAA results
    #[arg(long = "a", value_name = "BOOL", action = ArgAction::Set)]
    pub a: Option<bool>,

    /// Search for TXT records
    #[arg(long = "txt")]
    pub txt: bool,

    /// Show CNAME results
    #[arg(long = "cname")]
    pub cname: bool,

    /// Extract the registrable domain from the provided one
    #[arg(long = "force-tld", value_name = "BOOL", action = ArgAction::Set)]
    pub force_tld: Option<bool>,

    /// Skip the wildcard DNS check
    #[arg(long = "no-wildcard-check")]
    pub no_wildcard_check: bool,

    /// Nameservers to query instead of the system resolver (ip:port)
    #[arg(short = 'r', long = "resolvers", value_delimiter = ',')]
    pub resolvers: Option<Vec<String>>,

    /// Output file
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_file: Option<String>,

    /// Output in JSON format (one object per line)
    #[arg(long = "json", conflicts_with = "csv")]
    pub json: bool,

    /// Output in CSV format
    #[arg(long = "csv")]
    pub csv: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Silent mode (only output results)
    #[arg(long = "silent")]
    pub silent: bool,

    /// Verbose mode
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Configuration file path
    #[arg(long = "config", value_name = "FILE")]
    pub config_path: Option<String>,
}

impl Args {
    /// Command line flags win over the config file and environment.
    pub fn apply(&self, config: &mut Config) {
        if let Some(domain) = &self.domain {
            config.domain = domain.clone();
        }
        if let Some(wordlist) = &self.wordlist {
            config.wordlist = wordlist.clone();
        }
        if let Some(consumers) = self.consumers {
            config.consumers = consumers;
        }
        if let Some(a) = self.a {
            config.records.a = a;
        }
        if self.txt {
            config.records.txt = true;
        }
        if self.cname {
            config.records.cname = true;
        }
        if let Some(force_tld) = self.force_tld {
            config.force_tld = force_tld;
        }
        if self.no_wildcard_check {
            config.skip_wildcard_detection = true;
        }
        if let Some(resolvers) = &self.resolvers {
            config.resolver.nameservers = resolvers.clone();
            config.resolver.use_system_resolver = false;
        }
        if let Some(output_file) = &self.output_file {
            config.output.file = Some(output_file.clone());
        }
        if self.json {
            config.output.format = OutputFormat::Json;
        }
        if self.csv {
            config.output.format = OutputFormat::Csv;
        }
        if self.no_color || !atty::is(atty::Stream::Stdout) {
            config.output.color = false;
        }
    }
}
