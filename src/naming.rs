//! Identifiers and Casing
//!
//! An [`Identifier`] wraps one raw schema name. Identity (equality, hashing,
//! map keys) is always the raw string; the cased forms are only for emission.
//!
//! Capitalizing forms (`pascal`, `camel`) consult a [`Casing`] so that known
//! acronyms ("IP", "DNS", "UUID", ...) come out whole instead of as `Ip`.
//! The table is built once from [`NamingConfig`] and never mutated afterwards.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Naming Configuration
// =============================================================================

/// Acronyms preserved when none are configured.
pub const DEFAULT_ACRONYMS: &[&str] = &[
    "AMI", "PPID", "PID", "PGID", "MAC", "IP", "NAT", "IANA", "UID", "ECS", "AS", "DLL", "OS",
    "DNS", "HTTP", "PE", "JA3", "JA3s", "VLAN", "ISO", "MIME", "MD5", "SHA1", "SHA256", "SHA512",
    "UUID",
];

/// Naming configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Acronyms to preserve, in the spelling they should be emitted with
    #[serde(default = "default_acronyms")]
    pub acronyms: Vec<String>,
}

fn default_acronyms() -> Vec<String> {
    DEFAULT_ACRONYMS.iter().map(|s| s.to_string()).collect()
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            acronyms: default_acronyms(),
        }
    }
}

// =============================================================================
// Casing
// =============================================================================

/// Immutable acronym table consulted by the capitalizing identifier forms.
#[derive(Debug, Clone)]
pub struct Casing {
    /// UPPERCASE key -> configured spelling
    acronyms: HashMap<String, String>,
}

impl Casing {
    /// Build the table from configuration.
    pub fn new(config: &NamingConfig) -> Self {
        Self::from_acronyms(config.acronyms.iter().map(String::as_str))
    }

    /// Build the table from an explicit acronym list.
    pub fn from_acronyms<'a>(acronyms: impl IntoIterator<Item = &'a str>) -> Self {
        let acronyms = acronyms
            .into_iter()
            .filter(|a| !a.is_empty())
            .map(|a| (a.to_uppercase(), a.to_string()))
            .collect();
        Self { acronyms }
    }

    /// Configured spelling of `word` if it is a known acronym.
    pub fn acronym(&self, word: &str) -> Option<&str> {
        self.acronyms.get(&word.to_uppercase()).map(String::as_str)
    }

    /// Number of acronyms in the table
    pub fn len(&self) -> usize {
        self.acronyms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acronyms.is_empty()
    }

    /// Apply casing to a word, preserving acronyms
    fn case_word(&self, word: &str) -> String {
        if let Some(acronym) = self.acronym(word) {
            return acronym.to_string();
        }

        let mut chars = word.chars();
        match chars.next() {
            None => String::new(),
            Some(first) => {
                let mut result = first.to_uppercase().to_string();
                for c in chars {
                    result.extend(c.to_lowercase());
                }
                result
            }
        }
    }
}

impl Default for Casing {
    fn default() -> Self {
        Self::new(&NamingConfig::default())
    }
}

// =============================================================================
// Identifier
// =============================================================================

/// A raw schema name plus its derived case forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw string this identifier was built from
    pub fn raw(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Words of the raw name, split on separators and case boundaries.
    pub fn words(&self) -> Vec<String> {
        split_words(&self.0)
    }

    /// snake_case
    pub fn snake(&self) -> String {
        self.join_lower("_")
    }

    /// SCREAMING_CASE
    pub fn screaming(&self) -> String {
        self.snake().to_uppercase()
    }

    /// kebab-case
    pub fn kebab(&self) -> String {
        self.join_lower("-")
    }

    /// TRAIN-CASE
    pub fn train(&self) -> String {
        self.kebab().to_uppercase()
    }

    /// dotted.case
    pub fn dotted(&self) -> String {
        self.join_lower(".")
    }

    /// PascalCase with acronyms kept whole (`client_nat` -> `ClientNAT`).
    pub fn pascal(&self, casing: &Casing) -> String {
        self.words().iter().map(|w| casing.case_word(w)).collect()
    }

    /// camelCase; a leading acronym is lowercased whole (`ip_address` -> `ipAddress`).
    pub fn camel(&self, casing: &Casing) -> String {
        let words = self.words();
        let mut iter = words.iter();
        let mut result = match iter.next() {
            Some(first) => first.to_lowercase(),
            None => return String::new(),
        };
        for word in iter {
            result.push_str(&casing.case_word(word));
        }
        result
    }

    /// Deterministic ordering key: snake form first, raw string as tie-break.
    pub fn sort_key(&self) -> (String, &str) {
        (self.snake(), self.raw())
    }

    fn join_lower(&self, sep: &str) -> String {
        self.words()
            .iter()
            .map(|w| w.to_lowercase())
            .collect::<Vec<_>>()
            .join(sep)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Identifier {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Sort identifiers by snake form (raw string breaks ties).
pub fn sort_identifiers<'a, I>(ids: I) -> Vec<&'a Identifier>
where
    I: IntoIterator<Item = &'a Identifier>,
{
    let mut ids: Vec<_> = ids.into_iter().collect();
    ids.sort_by_cached_key(|id| {
        let (snake, raw) = id.sort_key();
        (snake, raw.to_string())
    });
    ids
}

/// Split a raw name into words.
///
/// Non-alphanumeric characters separate words and are dropped. An uppercase
/// letter starts a new word after a lowercase letter or digit, or when it is
/// the last capital of a run followed by lowercase (`IPAddress` -> `IP`, `Address`).
/// Digits never split a word, so `sha256` and `JA3s` stay whole.
fn split_words(raw: &str) -> Vec<String> {
    let chars: Vec<char> = raw.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("client_nat"), vec!["client", "nat"]);
        assert_eq!(split_words("IPAddress"), vec!["IP", "Address"]);
        assert_eq!(split_words("userAgent"), vec!["user", "Agent"]);
        assert_eq!(split_words("@timestamp"), vec!["timestamp"]);
        assert_eq!(split_words("hash.sha256"), vec!["hash", "sha256"]);
        assert_eq!(split_words("md5Sum"), vec!["md5", "Sum"]);
        assert!(split_words("").is_empty());
    }

    #[test]
    fn test_table_independent_forms() {
        let id = Identifier::new("tls_server_hash");
        assert_eq!(id.snake(), "tls_server_hash");
        assert_eq!(id.screaming(), "TLS_SERVER_HASH");
        assert_eq!(id.kebab(), "tls-server-hash");
        assert_eq!(id.train(), "TLS-SERVER-HASH");
        assert_eq!(id.dotted(), "tls.server.hash");
    }

    #[test]
    fn test_acronym_preservation() {
        let casing = Casing::default();

        assert_eq!(Identifier::new("client_nat").pascal(&casing), "ClientNAT");
        assert_eq!(Identifier::new("tls_server_hash").pascal(&casing), "TlsServerHash");
        assert_eq!(Identifier::new("dns_question").pascal(&casing), "DNSQuestion");
        assert_eq!(Identifier::new("ja3s").pascal(&casing), "JA3s");
        assert_eq!(Identifier::new("sha256").pascal(&casing), "SHA256");
        assert_eq!(Identifier::new("ip_address").camel(&casing), "ipAddress");
        assert_eq!(Identifier::new("source_ip").camel(&casing), "sourceIP");
    }

    #[test]
    fn test_custom_acronyms() {
        let casing = Casing::from_acronyms(["TLS"]);
        assert_eq!(Identifier::new("tls_server_hash").pascal(&casing), "TLSServerHash");
        assert_eq!(Identifier::new("client_nat").pascal(&casing), "ClientNat");
        assert_eq!(casing.len(), 1);
    }

    #[test]
    fn test_identity_is_raw_string() {
        // same snake form, different raw strings: distinct identities
        let a = Identifier::new("client.nat");
        let b = Identifier::new("client_nat");
        assert_eq!(a.snake(), b.snake());
        assert_ne!(a, b);
        assert_eq!(a, Identifier::from("client.nat"));
    }

    #[test]
    fn test_sort_identifiers() {
        let ids = [
            Identifier::new("user"),
            Identifier::new("Agent"),
            Identifier::new("client_nat"),
        ];
        let sorted: Vec<_> = sort_identifiers(&ids).into_iter().map(|i| i.raw()).collect();
        assert_eq!(sorted, vec!["Agent", "client_nat", "user"]);

        // same snake form: raw string breaks the tie
        let at = Identifier::new("@timestamp");
        assert_eq!(at.sort_key(), ("timestamp".to_string(), "@timestamp"));
        assert!(at.sort_key() < Identifier::new("timestamp").sort_key());
    }
}
