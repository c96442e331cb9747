// src/utils.rs
use crate::types::DnsSearchError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Second-level labels that act as public suffixes under a country TLD.
const SECOND_LEVEL_SUFFIXES: &[&str] = &[
    "ac", "co", "com", "edu", "gov", "ltd", "me", "net", "nic", "nom", "org", "plc", "sch",
];

/// Multi-label suffixes under which every child is a separate registrant.
const HOSTED_SUFFIXES: &[&str] = &[
    "github.io",
    "gitlab.io",
    "herokuapp.com",
    "netlify.app",
    "vercel.app",
    "pages.dev",
    "workers.dev",
    "web.app",
    "firebaseapp.com",
    "appspot.com",
    "azurewebsites.net",
    "cloudfront.net",
    "blogspot.com",
    "s3.amazonaws.com",
    "fly.dev",
    "onrender.com",
];

/// Reads candidate labels, one per line, skipping blank lines.
pub fn read_wordlist<P: AsRef<Path>>(path: P) -> Result<Vec<String>, DnsSearchError> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| DnsSearchError::WordlistError(format!("Failed to open {}: {}", path.display(), e)))?;

    let mut words = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| DnsSearchError::WordlistError(format!("Failed to read {}: {}", path.display(), e)))?;
        let word = line.trim();
        if !word.is_empty() {
            words.push(word.to_string());
        }
    }

    Ok(words)
}

/// Check if a string is a valid domain
pub fn is_valid_domain(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > 253 {
        return false;
    }

    let parts: Vec<&str> = domain.split('.').collect();
    if parts.len() < 2 {
        return false;
    }

    for part in parts {
        if part.is_empty() || part.len() > 63 {
            return false;
        }

        if !part.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
            return false;
        }

        if part.starts_with('-') || part.ends_with('-') {
            return false;
        }
    }

    true
}

/// Lowercases and strips surrounding whitespace, a URL scheme and dots.
pub fn normalize_domain(domain: &str) -> String {
    let mut cleaned = domain.trim().to_lowercase();

    if let Some(idx) = cleaned.find("://") {
        cleaned = cleaned[idx + 3..].to_string();
    }
    if let Some(idx) = cleaned.find('/') {
        cleaned.truncate(idx);
    }

    cleaned.trim_matches('.').to_string()
}

/// Reduces a hostname to its registrable domain, e.g. `www.example.co.uk`
/// becomes `example.co.uk` and `blog.example.github.io` becomes
/// `example.github.io`.
///
/// Knows the common ccTLD second levels and the large hosting suffixes;
/// anything else is treated as a single-label TLD. Pass `force_tld = false`
/// to enumerate a domain exactly as given.
pub fn base_domain(host: &str) -> String {
    let host = normalize_domain(host);
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return String::new();
    }

    let suffix_len = public_suffix_len(&host, &labels);
    let keep = (suffix_len + 1).min(labels.len());

    labels[labels.len() - keep..].join(".")
}

fn public_suffix_len(host: &str, labels: &[&str]) -> usize {
    if let Some(suffix) = HOSTED_SUFFIXES
        .iter()
        .find(|suffix| host.ends_with(&format!(".{}", suffix)) || host == **suffix)
    {
        return suffix.split('.').count();
    }

    let tld = labels[labels.len() - 1];
    let second = labels[labels.len() - 2];
    if tld.len() == 2 && SECOND_LEVEL_SUFFIXES.contains(&second) {
        2
    } else {
        1
    }
}
