// src/types.rs
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub max_concurrent: usize,
    pub rate_limit: Option<u32>,
    pub user_agent: String,
    pub proxy: Option<String>,
    pub output_dir: String,
    pub dns: DnsConfig,
    pub http: HttpConfig,
    pub scan: ScanConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent: 25,
            rate_limit: None,
            user_agent: "RustBruter/1.0".to_string(),
            proxy: None,
            output_dir: "output".to_string(),
            dns: DnsConfig::default(),
            http: HttpConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsConfig {
    pub retries: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
    pub nameservers: Vec<String>,
    pub use_system_resolver: bool,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(5),
            nameservers: vec![
                "8.8.8.8:53".to_string(),
                "8.8.4.4:53".to_string(),
                "1.1.1.1:53".to_string(),
                "1.0.0.1:53".to_string(),
            ],
            use_system_resolver: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub retries: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Probe a non-standard port instead of 80.
    pub port: Option<u16>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            retries: 2,
            retry_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(10),
            port: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    pub nmap_path: String,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            nmap_path: "nmap".to_string(),
            min_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(15),
        }
    }
}

/// One wordlist entry joined to the target domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub word: String,
    pub domain: String,
}

impl Candidate {
    pub fn new(word: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            domain: domain.into(),
        }
    }

    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.word, self.domain)
    }
}

#[derive(Debug, Clone)]
pub struct ResolutionOutcome {
    pub fqdn: String,
    pub resolved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusClass {
    Ok,
    Redirect,
    Other,
    Unreachable,
}

#[derive(Debug, Clone)]
pub struct LivenessOutcome {
    pub fqdn: String,
    pub live: bool,
    pub status_class: StatusClass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumerationStats {
    pub total_candidates: u64,
    pub processed: u64,
    pub dns_hits: u64,
    pub http_hits: u64,
    pub persist_errors: u64,
    pub duration: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub domain: String,
    pub stats: EnumerationStats,
    pub dns_only: Vec<String>,
    pub dns_and_http: Vec<String>,
    pub timestamp: String,
}

#[derive(Debug, Error)]
pub enum RustBruterError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("Wordlist unreadable {path}: {message}")]
    WordlistError { path: String, message: String },

    #[error("Output error: {0}")]
    OutputError(String),

    #[error("Resolution error: {0}")]
    ResolutionError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Scan error: {0}")]
    ScanError(String),

    #[error("Unknown error: {0}")]
    Unknown(#[from] anyhow::Error),
}
