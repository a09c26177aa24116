// src/store.rs
use crate::error::Result;
use crate::types::RustBruterError;
use dashmap::DashSet;
use log::warn;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Owns the two result tiers and their append-only output files. Set
/// membership is the deduplication gate: only the insertion that wins
/// writes the line, so a FQDN never lands in a file twice no matter how
/// many candidates race on it.
#[derive(Debug)]
pub struct ResultStore {
    dns_only: DashSet<String>,
    dns_and_http: DashSet<String>,
    dns_file: Mutex<File>,
    http_file: Mutex<File>,
    dns_path: PathBuf,
    http_path: PathBuf,
    persist_errors: AtomicU64,
}

impl ResultStore {
    /// Creates (truncating) both output files. Failing to create either is
    /// fatal for the run.
    pub fn create(output_dir: &Path, domain: &str) -> Result<Self> {
        std::fs::create_dir_all(output_dir).map_err(|e| {
            RustBruterError::OutputError(format!(
                "Failed to create output directory {}: {}",
                output_dir.display(),
                e
            ))
        })?;

        let dns_path = output_dir.join(format!("{}_dns_only.txt", domain));
        let http_path = output_dir.join(format!("{}_dns_and_http.txt", domain));

        let dns_file = Self::truncate(&dns_path)?;
        let http_file = Self::truncate(&http_path)?;

        Ok(Self {
            dns_only: DashSet::new(),
            dns_and_http: DashSet::new(),
            dns_file: Mutex::new(dns_file),
            http_file: Mutex::new(http_file),
            dns_path,
            http_path,
            persist_errors: AtomicU64::new(0),
        })
    }

    fn truncate(path: &Path) -> Result<File> {
        File::create(path).map_err(|e| {
            RustBruterError::OutputError(format!("Failed to create {}: {}", path.display(), e))
        })
    }

    /// Records a DNS hit. Returns true only for the first sighting of the
    /// FQDN; repeated calls are no-ops.
    pub async fn record_dns_hit(&self, fqdn: &str) -> bool {
        if !self.dns_only.insert(fqdn.to_string()) {
            return false;
        }
        self.append(&self.dns_file, &self.dns_path, fqdn).await;
        true
    }

    /// Same contract as `record_dns_hit`, against the DNS+HTTP tier. The
    /// caller only invokes this after a DNS hit.
    pub async fn record_http_hit(&self, fqdn: &str) -> bool {
        if !self.dns_and_http.insert(fqdn.to_string()) {
            return false;
        }
        self.append(&self.http_file, &self.http_path, fqdn).await;
        true
    }

    /// Durable best-effort append. A failed write must not abort the run;
    /// it is logged and counted instead.
    async fn append(&self, file: &Mutex<File>, path: &Path, fqdn: &str) {
        let mut file = file.lock().await;
        let result = writeln!(file, "{}", fqdn)
            .and_then(|_| file.flush())
            .and_then(|_| file.sync_data());

        if let Err(e) = result {
            self.persist_errors.fetch_add(1, Ordering::Relaxed);
            warn!("Failed to persist {} to {}: {}", fqdn, path.display(), e);
        }
    }

    pub fn counts(&self) -> (u64, u64) {
        (self.dns_only.len() as u64, self.dns_and_http.len() as u64)
    }

    pub fn persist_errors(&self) -> u64 {
        self.persist_errors.load(Ordering::Relaxed)
    }

    pub fn dns_hits(&self) -> Vec<String> {
        let mut hits: Vec<String> = self.dns_only.iter().map(|e| e.key().clone()).collect();
        hits.sort();
        hits
    }

    pub fn http_hits(&self) -> Vec<String> {
        let mut hits: Vec<String> = self.dns_and_http.iter().map(|e| e.key().clone()).collect();
        hits.sort();
        hits
    }

    pub fn dns_output_path(&self) -> &Path {
        &self.dns_path
    }

    pub fn http_output_path(&self) -> &Path {
        &self.http_path
    }
}
