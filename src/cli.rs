use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "rustbruter",
    about = "Fast active subdomain enumeration tool",
    long_about = "RustBruter is a high-performance active subdomain enumeration tool written in Rust.\nIt brute-forces candidates from a wordlist, confirms which resolve in DNS and which of\nthose serve live HTTP, and can hand confirmed hosts to an external nmap scan."
)]
pub struct Args {
    /// Target domain to enumerate
    #[arg(value_name = "DOMAIN")]
    pub domain: String,

    /// Wordlist file, one candidate token per line
    #[arg(short = 'w', long = "wordlist", value_name = "FILE")]
    pub wordlist: PathBuf,

    /// Maximum candidates concurrently in flight
    #[arg(short = 'c', long = "concurrency", value_name = "N")]
    pub concurrency: Option<usize>,

    /// DNS resolution attempts per candidate
    #[arg(long = "dns-retries", value_name = "N")]
    pub dns_retries: Option<u32>,

    /// HTTP probe attempts per candidate
    #[arg(long = "http-retries", value_name = "N")]
    pub http_retries: Option<u32>,

    /// Delay between DNS attempts, in milliseconds
    #[arg(long = "dns-retry-delay", value_name = "MS")]
    pub dns_retry_delay: Option<u64>,

    /// Delay between HTTP attempts, in milliseconds
    #[arg(long = "http-retry-delay", value_name = "MS")]
    pub http_retry_delay: Option<u64>,

    /// HTTP request timeout, in seconds
    #[arg(short = 't', long = "timeout", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Global admission rate limit, in candidates per second
    #[arg(long = "rate-limit", value_name = "PER_SEC")]
    pub rate_limit: Option<u32>,

    /// Directory for the result files
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Skip HTTP liveness probing (DNS tier only)
    #[arg(long = "no-http")]
    pub no_http: bool,

    /// Print the final run report as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// Run the external nmap scanner against confirmed hosts afterwards
    #[arg(long = "port-scan")]
    pub port_scan: bool,

    /// Output file for port scan reports
    #[arg(long = "scan-output", value_name = "FILE")]
    pub scan_output: Option<PathBuf>,

    /// Configuration file path
    #[arg(long = "config", value_name = "FILE")]
    pub config_path: Option<String>,

    /// Silent mode (no banner, no progress bar)
    #[arg(long = "silent")]
    pub silent: bool,

    /// Verbose mode
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}
