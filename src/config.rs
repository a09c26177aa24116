use crate::cli::Args;
use crate::error::{ErrorContext, Result};
use crate::types::{Config, RustBruterError};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Optional TOML sections, merged over `Config::default()`. Only the keys a
/// user actually sets override the defaults.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    max_concurrent: Option<usize>,
    rate_limit: Option<u32>,
    user_agent: Option<String>,
    proxy: Option<String>,
    output_dir: Option<String>,
    dns: Option<DnsSection>,
    http: Option<HttpSection>,
    scan: Option<ScanSection>,
}

#[derive(Debug, Default, Deserialize)]
struct DnsSection {
    retries: Option<u32>,
    retry_delay_ms: Option<u64>,
    timeout_secs: Option<u64>,
    nameservers: Option<Vec<String>>,
    use_system_resolver: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct HttpSection {
    retries: Option<u32>,
    retry_delay_ms: Option<u64>,
    timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct ScanSection {
    nmap_path: Option<String>,
    min_delay_secs: Option<u64>,
    max_delay_secs: Option<u64>,
}

pub fn load_config(config_path_str: &str) -> Result<Config> {
    let mut config = Config::default();

    if Path::new(config_path_str).exists() {
        let contents = fs::read_to_string(config_path_str)
            .with_context(|| format!("Failed to read config file {}", config_path_str))?;

        let file: ConfigFile = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", config_path_str))?;

        merge_file(&mut config, file);
    }

    apply_env_overrides(&mut config);

    Ok(config)
}

fn merge_file(config: &mut Config, file: ConfigFile) {
    if let Some(v) = file.max_concurrent {
        config.max_concurrent = v;
    }
    if let Some(v) = file.rate_limit {
        config.rate_limit = Some(v);
    }
    if let Some(v) = file.user_agent {
        config.user_agent = v;
    }
    if let Some(v) = file.proxy {
        config.proxy = Some(v);
    }
    if let Some(v) = file.output_dir {
        config.output_dir = v;
    }

    if let Some(dns) = file.dns {
        if let Some(v) = dns.retries {
            config.dns.retries = v;
        }
        if let Some(v) = dns.retry_delay_ms {
            config.dns.retry_delay = Duration::from_millis(v);
        }
        if let Some(v) = dns.timeout_secs {
            config.dns.timeout = Duration::from_secs(v);
        }
        if let Some(v) = dns.nameservers {
            config.dns.nameservers = v;
        }
        if let Some(v) = dns.use_system_resolver {
            config.dns.use_system_resolver = v;
        }
    }

    if let Some(http) = file.http {
        if let Some(v) = http.retries {
            config.http.retries = v;
        }
        if let Some(v) = http.retry_delay_ms {
            config.http.retry_delay = Duration::from_millis(v);
        }
        if let Some(v) = http.timeout_secs {
            config.http.timeout = Duration::from_secs(v);
        }
        if let Some(v) = http.connect_timeout_secs {
            config.http.connect_timeout = Duration::from_secs(v);
        }
        if let Some(v) = http.port {
            config.http.port = Some(v);
        }
    }

    if let Some(scan) = file.scan {
        if let Some(v) = scan.nmap_path {
            config.scan.nmap_path = v;
        }
        if let Some(v) = scan.min_delay_secs {
            config.scan.min_delay = Duration::from_secs(v);
        }
        if let Some(v) = scan.max_delay_secs {
            config.scan.max_delay = Duration::from_secs(v);
        }
    }
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(nameservers) = env::var("RUSTBRUTER_NAMESERVERS") {
        config.dns.nameservers = nameservers
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();
    }
    if let Ok(proxy) = env::var("RUSTBRUTER_PROXY") {
        config.proxy = Some(proxy);
    }
}

/// Command line flags win over both defaults and the config file.
pub fn apply_args(config: &mut Config, args: &Args) {
    if let Some(v) = args.concurrency {
        config.max_concurrent = v;
    }
    if let Some(v) = args.rate_limit {
        config.rate_limit = Some(v);
    }
    if let Some(v) = args.dns_retries {
        config.dns.retries = v;
    }
    if let Some(v) = args.http_retries {
        config.http.retries = v;
    }
    if let Some(v) = args.dns_retry_delay {
        config.dns.retry_delay = Duration::from_millis(v);
    }
    if let Some(v) = args.http_retry_delay {
        config.http.retry_delay = Duration::from_millis(v);
    }
    if let Some(v) = args.timeout {
        config.http.timeout = Duration::from_secs(v);
    }
    if let Some(v) = &args.output_dir {
        config.output_dir = v.clone();
    }
}

pub fn validate_config(config: &Config) -> Result<()> {
    if config.max_concurrent == 0 {
        return Err(RustBruterError::ConfigError(
            "max_concurrent must be greater than 0".to_string(),
        ));
    }
    if config.dns.retries == 0 {
        return Err(RustBruterError::ConfigError(
            "dns.retries must be at least 1".to_string(),
        ));
    }
    if config.http.retries == 0 {
        return Err(RustBruterError::ConfigError(
            "http.retries must be at least 1".to_string(),
        ));
    }
    if config.http.timeout.as_secs() == 0 {
        return Err(RustBruterError::ConfigError(
            "http.timeout must be greater than 0".to_string(),
        ));
    }
    if config.dns.timeout.as_secs() == 0 {
        return Err(RustBruterError::ConfigError(
            "dns.timeout must be greater than 0".to_string(),
        ));
    }
    if config.scan.min_delay > config.scan.max_delay {
        return Err(RustBruterError::ConfigError(
            "scan.min_delay_secs must not exceed scan.max_delay_secs".to_string(),
        ));
    }
    Ok(())
}
