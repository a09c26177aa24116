// src/metrics.rs
use crate::types::EnumerationStats;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Sole owner of the run counters. Concurrent pipeline tasks only ever
/// touch them through the serialized increments below; reporting is
/// observational and never feeds back into pipeline outcomes.
pub struct ProgressReporter {
    total: u64,
    processed: AtomicU64,
    dns_hits: AtomicU64,
    http_hits: AtomicU64,
    start: Instant,
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new(total: u64, visible: bool) -> Self {
        let bar = if visible {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap()
                .progress_chars("=> "),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        Self {
            total,
            processed: AtomicU64::new(0),
            dns_hits: AtomicU64::new(0),
            http_hits: AtomicU64::new(0),
            start: Instant::now(),
            bar,
        }
    }

    /// Terminal outcome of one candidate. Hit flags are true only for
    /// first sightings, so the displayed counts always equal the
    /// deduplicated set sizes.
    pub fn candidate_done(&self, dns_hit: bool, http_hit: bool) {
        if dns_hit {
            self.dns_hits.fetch_add(1, Ordering::SeqCst);
        }
        if http_hit {
            self.http_hits.fetch_add(1, Ordering::SeqCst);
        }
        self.processed.fetch_add(1, Ordering::SeqCst);

        self.bar.set_message(format!(
            "dns:{} http:{}",
            self.dns_hits.load(Ordering::SeqCst),
            self.http_hits.load(Ordering::SeqCst)
        ));
        self.bar.inc(1);
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self, persist_errors: u64) -> EnumerationStats {
        EnumerationStats {
            total_candidates: self.total,
            processed: self.processed.load(Ordering::SeqCst),
            dns_hits: self.dns_hits.load(Ordering::SeqCst),
            http_hits: self.http_hits.load(Ordering::SeqCst),
            persist_errors,
            duration: self.start.elapsed(),
        }
    }

    /// Called exactly once, after the last candidate has completed.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_track_terminal_outcomes() {
        let reporter = ProgressReporter::new(3, false);
        reporter.candidate_done(true, true);
        reporter.candidate_done(true, false);
        reporter.candidate_done(false, false);

        let stats = reporter.snapshot(0);
        assert_eq!(stats.total_candidates, 3);
        assert_eq!(stats.processed, 3);
        assert_eq!(stats.dns_hits, 2);
        assert_eq!(stats.http_hits, 1);
    }

    #[test]
    fn test_snapshot_carries_persist_errors() {
        let reporter = ProgressReporter::new(1, false);
        reporter.candidate_done(false, false);
        assert_eq!(reporter.snapshot(2).persist_errors, 2);
    }
}
