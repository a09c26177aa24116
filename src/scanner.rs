// src/scanner.rs
use crate::error::Result;
use crate::types::{RustBruterError, ScanConfig};
use log::info;
use rand::Rng;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const SOURCE_PORTS: [u16; 4] = [53, 123, 443, 8080];
const DATA_LENGTHS: [u16; 3] = [16, 32, 64];

/// Thin wrapper around the external nmap binary. Each scan randomizes its
/// stealth parameters and appends a framed text report to the output file.
pub struct PortScanner {
    config: ScanConfig,
    output_path: PathBuf,
}

impl PortScanner {
    pub fn new(config: ScanConfig, output_path: &Path) -> Self {
        Self {
            config,
            output_path: output_path.to_path_buf(),
        }
    }

    fn stealth_args(ip: IpAddr) -> Vec<String> {
        let mut rng = rand::thread_rng();
        let source_port = SOURCE_PORTS[rng.gen_range(0..SOURCE_PORTS.len())];
        let decoy_count: u32 = rng.gen_range(3..=6);
        let data_length = DATA_LENGTHS[rng.gen_range(0..DATA_LENGTHS.len())];

        let mut args: Vec<String> = [
            "-sS",
            "-p-",
            "-T2",
            "-Pn",
            "--open",
            "-sV",
            "--script=vuln",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        args.extend([
            "--source-port".to_string(),
            source_port.to_string(),
            "-D".to_string(),
            format!("RND:{}", decoy_count),
            "--data-length".to_string(),
            data_length.to_string(),
            "--disable-arp-ping".to_string(),
            "-oN".to_string(),
            "-".to_string(),
            ip.to_string(),
        ]);

        args
    }

    pub async fn scan_host(&self, fqdn: &str, ip: IpAddr) -> Result<()> {
        info!("Scanning {} ({})...", fqdn, ip);

        let output = Command::new(&self.config.nmap_path)
            .args(Self::stealth_args(ip))
            .output()
            .await
            .map_err(|e| {
                RustBruterError::ScanError(format!(
                    "Failed to launch {}: {}",
                    self.config.nmap_path, e
                ))
            })?;

        if !output.status.success() {
            return Err(RustBruterError::ScanError(format!(
                "nmap exited with {} for {}",
                output.status, ip
            )));
        }

        self.append_report(fqdn, ip, &String::from_utf8_lossy(&output.stdout))
            .await
    }

    async fn append_report(&self, fqdn: &str, ip: IpAddr, body: &str) -> Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.output_path)
            .await
            .map_err(|e| {
                RustBruterError::OutputError(format!(
                    "Failed to open {}: {}",
                    self.output_path.display(),
                    e
                ))
            })?;

        let report = format!(
            "\n\n[SCAN RESULTS FOR {} ({})]\n{}\n{}\n",
            fqdn,
            ip,
            body,
            "=".repeat(80)
        );
        file.write_all(report.as_bytes()).await.map_err(|e| {
            RustBruterError::OutputError(format!(
                "Failed to append to {}: {}",
                self.output_path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Random pause between scans.
    pub async fn stealth_pause(&self) {
        let delay = {
            let mut rng = rand::thread_rng();
            rng.gen_range(self.config.min_delay..=self.config.max_delay)
        };
        tokio::time::sleep(delay).await;
    }
}
