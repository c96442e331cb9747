// src/wildcard.rs
use crate::resolver::{DnsLookup, LookupFailure};
use crate::types::DnsSearchError;
use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::BTreeSet;
use std::fmt;

/// Addresses a catch-all record hands out for names that do not exist.
///
/// Compared as a set: resolvers are free to rotate the order of answers
/// between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardSignature(BTreeSet<String>);

impl WildcardSignature {
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(addresses.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, addresses: &[String]) -> bool {
        !self.0.is_empty() && addresses.iter().cloned().collect::<BTreeSet<String>>() == self.0
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for WildcardSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.addresses().collect::<Vec<_>>().join(" "))
    }
}

/// 16 bytes from the OS CSPRNG, hex-encoded to a 32-character label.
pub fn random_label() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Resolves a random, certainly-unregistered name under `domain`.
///
/// `Ok(None)` means no wildcard is configured. Any failure other than
/// "no such host" is returned as an error; callers are expected to carry on
/// without filtering.
pub async fn detect_wildcard(
    lookup: &dyn DnsLookup,
    domain: &str,
) -> Result<Option<WildcardSignature>, DnsSearchError> {
    let probe = format!("{}.{}", random_label(), domain);

    match lookup.lookup_addresses(&probe).await {
        Ok(addresses) if addresses.is_empty() => Ok(None),
        Ok(addresses) => Ok(Some(WildcardSignature::new(addresses))),
        Err(LookupFailure::NoSuchHost) => Ok(None),
        Err(LookupFailure::Other(message)) => Err(DnsSearchError::WildcardDetection {
            domain: domain.to_string(),
            message,
        }),
    }
}
