use crate::error::ErrorContext;
use crate::types::{Config, DnsSearchError, OutputFormat};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "dnssearch.toml";

/// Loads `config_path` on top of the defaults, then applies environment
/// overrides. A missing file is not an error.
///
/// Not validated here: command line flags still get applied on top, so
/// callers run `validate_config` on the final result.
pub fn load_config(config_path_str: &str) -> Result<Config, DnsSearchError> {
    let mut config = Config::default();

    if Path::new(config_path_str).exists() {
        let contents = fs::read_to_string(config_path_str)
            .with_context(|| format!("Failed to read config file {}", config_path_str))?;
        apply_toml(&mut config, &contents)?;
    }

    apply_env_overrides(&mut config)?;

    Ok(config)
}

pub fn apply_toml(config: &mut Config, contents: &str) -> Result<(), DnsSearchError> {
    let toml_config: toml::Value = toml::from_str(contents)
        .map_err(|e| DnsSearchError::ConfigError(format!("Failed to parse config file: {}", e)))?;

    let Some(table) = toml_config.as_table() else {
        return Ok(());
    };

    if let Some(domain) = table.get("domain").and_then(|v| v.as_str()) {
        config.domain = domain.to_string();
    }
    if let Some(wordlist) = table.get("wordlist").and_then(|v| v.as_str()) {
        config.wordlist = wordlist.into();
    }
    if let Some(consumers) = table.get("consumers").and_then(|v| v.as_integer()) {
        config.consumers = usize::try_from(consumers)
            .map_err(|_| DnsSearchError::ConfigError(format!("Invalid consumers value: {}", consumers)))?;
    }

    if let Some(records) = table.get("records").and_then(|v| v.as_table()) {
        if let Some(a) = records.get("a").and_then(|v| v.as_bool()) {
            config.records.a = a;
        }
        if let Some(txt) = records.get("txt").and_then(|v| v.as_bool()) {
            config.records.txt = txt;
        }
        if let Some(cname) = records.get("cname").and_then(|v| v.as_bool()) {
            config.records.cname = cname;
        }
    }

    if let Some(resolver) = table.get("resolver").and_then(|v| v.as_table()) {
        if let Some(nameservers) = resolver.get("nameservers").and_then(|v| v.as_array()) {
            config.resolver.nameservers = nameservers
                .iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect();
        }
        if let Some(system) = resolver.get("use_system_resolver").and_then(|v| v.as_bool()) {
            config.resolver.use_system_resolver = system;
        }
        if let Some(timeout) = resolver.get("timeout_secs").and_then(|v| v.as_integer()) {
            config.resolver.timeout = Duration::from_secs(timeout.max(0) as u64);
        }
        if let Some(attempts) = resolver.get("attempts").and_then(|v| v.as_integer()) {
            config.resolver.attempts = attempts.max(1) as usize;
        }
    }

    if let Some(output) = table.get("output").and_then(|v| v.as_table()) {
        if let Some(format) = output.get("format").and_then(|v| v.as_str()) {
            config.output.format = parse_format(format)?;
        }
        if let Some(file) = output.get("file").and_then(|v| v.as_str()) {
            config.output.file = Some(file.to_string());
        }
        if let Some(color) = output.get("color").and_then(|v| v.as_bool()) {
            config.output.color = color;
        }
    }

    Ok(())
}

fn parse_format(format: &str) -> Result<OutputFormat, DnsSearchError> {
    match format.to_lowercase().as_str() {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        "csv" => Ok(OutputFormat::Csv),
        other => Err(DnsSearchError::ConfigError(format!("Unknown output format: {}", other))),
    }
}

fn apply_env_overrides(config: &mut Config) -> Result<(), DnsSearchError> {
    if let Ok(consumers) = env::var("DNSSEARCH_CONSUMERS") {
        config.consumers = consumers.trim().parse().map_err(|e| {
            DnsSearchError::ConfigError(format!("Invalid DNSSEARCH_CONSUMERS {:?}: {}", consumers, e))
        })?;
    }
    if let Ok(nameservers) = env::var("DNSSEARCH_NAMESERVERS") {
        config.resolver.nameservers = nameservers
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        config.resolver.use_system_resolver = false;
    }
    Ok(())
}

pub fn validate_config(config: &Config) -> Result<(), DnsSearchError> {
    if config.consumers == 0 {
        return Err(DnsSearchError::ConfigError("Number of consumers must be greater than 0".to_string()));
    }
    if config.resolver.timeout.is_zero() {
        return Err(DnsSearchError::ConfigError("Resolver timeout must be greater than 0".to_string()));
    }
    if !config.resolver.use_system_resolver && config.resolver.nameservers.is_empty() {
        return Err(DnsSearchError::ConfigError(
            "At least one nameserver is required when the system resolver is disabled".to_string(),
        ));
    }
    if !config.records.any() {
        return Err(DnsSearchError::ConfigError(
            "At least one record type (A, TXT, CNAME) must be enabled".to_string(),
        ));
    }
    Ok(())
}
