use crate::cli::Args;
use crate::config;
use crate::metrics::ProgressReporter;
use crate::prober::{HttpProber, Probe};
use crate::resolver::{DnsResolver, Resolve};
use crate::scanner::PortScanner;
use crate::scheduler::Scheduler;
use crate::store::ResultStore;
use crate::types::{Candidate, Config, RunReport, RustBruterError};
use crate::utils;
use crate::wordlist::WordlistSource;
use futures::stream::{FuturesUnordered, StreamExt};
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

pub struct RustBruterEngine {
    config: Config,
    args: Args,
    resolver: Arc<dyn Resolve>,
    prober: Arc<dyn Probe>,
    // Concrete resolver kept around for the wildcard canary and the
    // port-scan feed, both of which need single-attempt address lookups.
    dns_resolver: Option<Arc<DnsResolver>>,
    scheduler: Scheduler,
}

impl RustBruterEngine {
    pub async fn new(args: Args) -> Result<Self, RustBruterError> {
        let mut config = if let Some(config_path_str) = args.config_path.as_deref() {
            config::load_config(config_path_str)?
        } else {
            Config::default()
        };

        config::apply_args(&mut config, &args);
        config::validate_config(&config)?;

        let dns_resolver = Arc::new(DnsResolver::new(config.dns.clone())?);
        let prober = Arc::new(HttpProber::new(
            config.http.clone(),
            &config.user_agent,
            config.proxy.as_deref(),
        )?);
        let scheduler = Scheduler::new(config.max_concurrent, config.rate_limit)?;

        Ok(Self {
            config,
            args,
            resolver: dns_resolver.clone(),
            prober,
            dns_resolver: Some(dns_resolver),
            scheduler,
        })
    }

    pub fn args(&self) -> &Args {
        &self.args
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// End-to-end enumeration run: validate inputs, truncate the output
    /// files, stream every candidate through the bounded pipeline, drain,
    /// and report. Errors returned from here mean the run aborted.
    pub async fn run(&self) -> Result<RunReport, RustBruterError> {
        let domain = self.args.domain.trim().to_lowercase();
        if !utils::is_valid_domain(&domain) {
            return Err(RustBruterError::InvalidDomain(self.args.domain.clone()));
        }

        let source = WordlistSource::new(&self.args.wordlist, &domain);

        // The wordlist is opened before the output files so an unreadable
        // wordlist aborts without truncating results from a previous run.
        let total = source.count_candidates().await?;
        info!(
            "Loaded {} candidates from {} for {}",
            total,
            source.path().display(),
            domain
        );

        let store = Arc::new(ResultStore::create(
            Path::new(&self.config.output_dir),
            &domain,
        )?);

        self.wildcard_check(&domain).await;

        let visible = !self.args.silent && atty::is(atty::Stream::Stderr);
        let reporter = Arc::new(ProgressReporter::new(total, visible));

        let stream_result = self.stream_candidates(&source, &store, &reporter).await;

        reporter.finish();
        stream_result?;

        let stats = reporter.snapshot(store.persist_errors());
        info!(
            "Scan complete for {}: {} DNS records, {} active HTTP servers, {}/{} candidates in {:.2}s",
            domain,
            stats.dns_hits,
            stats.http_hits,
            stats.processed,
            stats.total_candidates,
            stats.duration.as_secs_f64()
        );
        if stats.persist_errors > 0 {
            warn!(
                "{} results could not be persisted to disk (kept in memory only)",
                stats.persist_errors
            );
        }

        Ok(RunReport {
            domain,
            stats,
            dns_only: store.dns_hits(),
            dns_and_http: store.http_hits(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Streaming phase: admit candidates under the concurrency ceiling,
    /// keep the in-flight set bounded, and drain everything that was
    /// admitted before returning, even when the stream fails mid-file.
    async fn stream_candidates(
        &self,
        source: &WordlistSource,
        store: &Arc<ResultStore>,
        reporter: &Arc<ProgressReporter>,
    ) -> Result<(), RustBruterError> {
        let mut stream = source.stream().await?;
        let mut in_flight = FuturesUnordered::new();

        let stream_result = loop {
            match stream.next_candidate().await {
                Ok(Some(candidate)) => {
                    let permit = self.scheduler.admit().await;
                    let resolver = self.resolver.clone();
                    let prober = self.prober.clone();
                    let store = store.clone();
                    let reporter = reporter.clone();
                    let skip_http = self.args.no_http;

                    in_flight.push(tokio::spawn(async move {
                        let _permit = permit;
                        process_candidate(resolver, prober, store, reporter, candidate, skip_http)
                            .await;
                    }));

                    while in_flight.len() >= self.scheduler.batch_capacity() {
                        if let Some(Err(e)) = in_flight.next().await {
                            warn!("Candidate task failed: {}", e);
                        }
                    }
                }
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        while let Some(joined) = in_flight.next().await {
            if let Err(e) = joined {
                warn!("Candidate task failed: {}", e);
            }
        }

        stream_result
    }

    /// Resolve a random label under the target once; if it comes back with
    /// an address, every brute-forced candidate will too. Advisory only.
    async fn wildcard_check(&self, domain: &str) {
        let Some(resolver) = &self.dns_resolver else {
            return;
        };

        let canary = format!("{}.{}", utils::random_label(12), domain);
        if resolver.first_ip(&canary).await.is_some() {
            warn!(
                "Wildcard DNS detected on {} ({} resolved); results will be inflated",
                domain, canary
            );
        }
    }

    /// Feed confirmed hosts to the external nmap collaborator, one at a
    /// time with a stealth pause in between. Per-host failures are logged
    /// and skipped.
    pub async fn run_port_scans(
        &self,
        hosts: &[String],
        output_path: &Path,
    ) -> Result<usize, RustBruterError> {
        let Some(resolver) = &self.dns_resolver else {
            return Ok(0);
        };

        info!("Port scanning {} hosts...", hosts.len());
        let scanner = PortScanner::new(self.config.scan.clone(), output_path);
        let mut scanned = 0;

        for (i, fqdn) in hosts.iter().enumerate() {
            match resolver.first_ip(fqdn).await {
                Some(ip) => match scanner.scan_host(fqdn, ip).await {
                    Ok(()) => scanned += 1,
                    Err(e) => warn!("Port scan failed for {}: {}", fqdn, e),
                },
                None => warn!("Skipping port scan for {}: no address", fqdn),
            }

            if i + 1 < hosts.len() {
                scanner.stealth_pause().await;
            }
        }

        Ok(scanned)
    }
}

/// The per-candidate pipeline: DNS resolution, then HTTP probing for
/// resolved candidates only, then store updates, then the metrics update.
/// Hit flags passed to the reporter reflect first sightings only, so
/// counters always match the deduplicated sets.
async fn process_candidate(
    resolver: Arc<dyn Resolve>,
    prober: Arc<dyn Probe>,
    store: Arc<ResultStore>,
    reporter: Arc<ProgressReporter>,
    candidate: Candidate,
    skip_http: bool,
) {
    let fqdn = candidate.fqdn();
    let resolution = resolver.resolve(&fqdn).await;

    let mut dns_hit = false;
    let mut http_hit = false;

    if resolution.resolved {
        dns_hit = store.record_dns_hit(&fqdn).await;

        if !skip_http {
            let liveness = prober.probe(&fqdn).await;
            if liveness.live {
                http_hit = store.record_http_hit(&fqdn).await;
            }
        }
    }

    reporter.candidate_done(dns_hit, http_hit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LivenessOutcome, ResolutionOutcome, StatusClass};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Tracks how many candidates sit inside fake I/O at once.
    #[derive(Default)]
    struct ConcurrencyGauge {
        current: AtomicUsize,
        max_seen: AtomicUsize,
    }

    impl ConcurrencyGauge {
        fn enter(&self) {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);
        }

        fn exit(&self) {
            self.current.fetch_sub(1, Ordering::SeqCst);
        }

        fn max_seen(&self) -> usize {
            self.max_seen.load(Ordering::SeqCst)
        }
    }

    struct FakeResolver {
        resolving: HashSet<String>,
        gauge: Arc<ConcurrencyGauge>,
    }

    #[async_trait]
    impl Resolve for FakeResolver {
        async fn resolve(&self, fqdn: &str) -> ResolutionOutcome {
            self.gauge.enter();
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.gauge.exit();
            ResolutionOutcome {
                fqdn: fqdn.to_string(),
                resolved: self.resolving.contains(fqdn),
            }
        }
    }

    struct FakeProber {
        live: HashMap<String, StatusClass>,
        gauge: Arc<ConcurrencyGauge>,
    }

    #[async_trait]
    impl Probe for FakeProber {
        async fn probe(&self, fqdn: &str) -> LivenessOutcome {
            self.gauge.enter();
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.gauge.exit();
            match self.live.get(fqdn) {
                Some(class) => LivenessOutcome {
                    fqdn: fqdn.to_string(),
                    live: true,
                    status_class: *class,
                },
                None => LivenessOutcome {
                    fqdn: fqdn.to_string(),
                    live: false,
                    status_class: StatusClass::Unreachable,
                },
            }
        }
    }

    fn test_args(domain: &str, wordlist: PathBuf, output_dir: &Path) -> Args {
        Args {
            domain: domain.to_string(),
            wordlist,
            concurrency: None,
            dns_retries: None,
            http_retries: None,
            dns_retry_delay: None,
            http_retry_delay: None,
            timeout: None,
            rate_limit: None,
            output_dir: Some(output_dir.to_string_lossy().into_owned()),
            no_http: false,
            json: false,
            port_scan: false,
            scan_output: None,
            config_path: None,
            silent: true,
            verbose: false,
        }
    }

    fn test_engine(
        args: Args,
        max_concurrent: usize,
        resolver: FakeResolver,
        prober: FakeProber,
    ) -> RustBruterEngine {
        let mut config = Config::default();
        config.max_concurrent = max_concurrent;
        config.output_dir = args.output_dir.clone().unwrap();

        RustBruterEngine {
            config,
            args,
            resolver: Arc::new(resolver),
            prober: Arc::new(prober),
            dns_resolver: None,
            scheduler: Scheduler::new(max_concurrent, None).unwrap(),
        }
    }

    fn wordlist_file(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("words.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn read_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_two_tier_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let wordlist = wordlist_file(dir.path(), "www\nmail\ndoesnotexist123\n");
        let gauge = Arc::new(ConcurrencyGauge::default());

        let resolver = FakeResolver {
            resolving: ["www.example.com", "mail.example.com"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            gauge: gauge.clone(),
        };
        let prober = FakeProber {
            live: HashMap::from([("mail.example.com".to_string(), StatusClass::Ok)]),
            gauge: gauge.clone(),
        };

        let args = test_args("example.com", wordlist, dir.path());
        let engine = test_engine(args, 2, resolver, prober);
        let report = engine.run().await.unwrap();

        assert_eq!(report.stats.total_candidates, 3);
        assert_eq!(report.stats.processed, 3);
        assert_eq!(report.stats.dns_hits, 2);
        assert_eq!(report.stats.http_hits, 1);
        assert_eq!(
            report.dns_only,
            vec!["mail.example.com", "www.example.com"]
        );
        assert_eq!(report.dns_and_http, vec!["mail.example.com"]);

        let mut dns_lines = read_lines(&dir.path().join("example.com_dns_only.txt"));
        dns_lines.sort();
        assert_eq!(dns_lines, vec!["mail.example.com", "www.example.com"]);
        assert_eq!(
            read_lines(&dir.path().join("example.com_dns_and_http.txt")),
            vec!["mail.example.com"]
        );
    }

    #[tokio::test]
    async fn test_concurrency_ceiling_is_respected() {
        let dir = tempfile::tempdir().unwrap();
        let words: String = (0..40).map(|i| format!("host{}\n", i)).collect();
        let wordlist = wordlist_file(dir.path(), &words);
        let gauge = Arc::new(ConcurrencyGauge::default());

        let resolver = FakeResolver {
            resolving: (0..40).map(|i| format!("host{}.example.com", i)).collect(),
            gauge: gauge.clone(),
        };
        let prober = FakeProber {
            live: HashMap::new(),
            gauge: gauge.clone(),
        };

        let args = test_args("example.com", wordlist, dir.path());
        let engine = test_engine(args, 3, resolver, prober);
        let report = engine.run().await.unwrap();

        assert_eq!(report.stats.processed, 40);
        assert!(gauge.max_seen() <= 3, "max in flight: {}", gauge.max_seen());
        assert!(gauge.max_seen() > 1, "pipeline never overlapped");
    }

    #[tokio::test]
    async fn test_duplicate_words_dedupe_in_files_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        let wordlist = wordlist_file(dir.path(), "www\nwww\nwww\n");
        let gauge = Arc::new(ConcurrencyGauge::default());

        let resolver = FakeResolver {
            resolving: HashSet::from(["www.example.com".to_string()]),
            gauge: gauge.clone(),
        };
        let prober = FakeProber {
            live: HashMap::from([("www.example.com".to_string(), StatusClass::Redirect)]),
            gauge: gauge.clone(),
        };

        let args = test_args("example.com", wordlist, dir.path());
        let engine = test_engine(args, 2, resolver, prober);
        let report = engine.run().await.unwrap();

        assert_eq!(report.stats.processed, 3);
        assert_eq!(report.stats.dns_hits, 1);
        assert_eq!(report.stats.http_hits, 1);
        assert_eq!(
            read_lines(&dir.path().join("example.com_dns_only.txt")),
            vec!["www.example.com"]
        );
        assert_eq!(
            read_lines(&dir.path().join("example.com_dns_and_http.txt")),
            vec!["www.example.com"]
        );
    }

    #[tokio::test]
    async fn test_no_http_skips_liveness_tier() {
        let dir = tempfile::tempdir().unwrap();
        let wordlist = wordlist_file(dir.path(), "www\n");
        let gauge = Arc::new(ConcurrencyGauge::default());

        let resolver = FakeResolver {
            resolving: HashSet::from(["www.example.com".to_string()]),
            gauge: gauge.clone(),
        };
        let prober = FakeProber {
            live: HashMap::from([("www.example.com".to_string(), StatusClass::Ok)]),
            gauge: gauge.clone(),
        };

        let mut args = test_args("example.com", wordlist, dir.path());
        args.no_http = true;
        let engine = test_engine(args, 2, resolver, prober);
        let report = engine.run().await.unwrap();

        assert_eq!(report.stats.dns_hits, 1);
        assert_eq!(report.stats.http_hits, 0);
        assert!(read_lines(&dir.path().join("example.com_dns_and_http.txt")).is_empty());
    }

    #[tokio::test]
    async fn test_missing_wordlist_aborts_without_touching_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let gauge = Arc::new(ConcurrencyGauge::default());

        let resolver = FakeResolver {
            resolving: HashSet::new(),
            gauge: gauge.clone(),
        };
        let prober = FakeProber {
            live: HashMap::new(),
            gauge: gauge.clone(),
        };

        let output_dir = dir.path().join("out");
        let args = test_args(
            "example.com",
            dir.path().join("missing.txt"),
            &output_dir,
        );
        let engine = test_engine(args, 2, resolver, prober);
        let err = engine.run().await.unwrap_err();

        assert!(matches!(err, RustBruterError::WordlistError { .. }));
        assert!(!output_dir.exists());
    }

    #[tokio::test]
    async fn test_invalid_domain_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let wordlist = wordlist_file(dir.path(), "www\n");
        let gauge = Arc::new(ConcurrencyGauge::default());

        let resolver = FakeResolver {
            resolving: HashSet::new(),
            gauge: gauge.clone(),
        };
        let prober = FakeProber {
            live: HashMap::new(),
            gauge: gauge.clone(),
        };

        let args = test_args("not a domain", wordlist, dir.path());
        let engine = test_engine(args, 2, resolver, prober);
        let err = engine.run().await.unwrap_err();

        assert!(matches!(err, RustBruterError::InvalidDomain(_)));
    }
}
