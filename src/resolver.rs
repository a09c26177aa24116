// src/resolver.rs
use crate::error::Result;
use crate::types::{DnsConfig, ResolutionOutcome, RustBruterError};
use crate::utils;
use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use trust_dns_resolver::config::{ResolverConfig as TrustDnsConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// DNS reachability check, the first stage of the per-candidate pipeline.
/// Trait seam so the engine can be driven by a fake in tests.
#[async_trait]
pub trait Resolve: Send + Sync {
    async fn resolve(&self, fqdn: &str) -> ResolutionOutcome;
}

#[derive(Debug)]
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
    config: DnsConfig,
}

impl DnsResolver {
    pub fn new(config: DnsConfig) -> Result<Self> {
        let resolver = if config.use_system_resolver {
            TokioAsyncResolver::tokio_from_system_conf().map_err(|e| {
                RustBruterError::ResolutionError(format!(
                    "Failed to create system resolver: {}",
                    e
                ))
            })?
        } else {
            let mut resolver_config = TrustDnsConfig::new();

            for ns in &config.nameservers {
                let socket_addr = SocketAddr::from_str(ns).map_err(|e| {
                    RustBruterError::ConfigError(format!(
                        "Invalid nameserver address {}: {}",
                        ns, e
                    ))
                })?;
                resolver_config.add_name_server(trust_dns_resolver::config::NameServerConfig {
                    socket_addr,
                    protocol: trust_dns_resolver::config::Protocol::Udp,
                    tls_dns_name: None,
                    trust_negative_responses: false,
                    bind_addr: None,
                });
            }

            let mut opts = ResolverOpts::default();
            opts.timeout = config.timeout;
            // Retries belong to the pipeline's own retry loop, not the stub resolver.
            opts.attempts = 1;

            TokioAsyncResolver::tokio(resolver_config, opts)
        };

        Ok(Self { resolver, config })
    }

    /// One resolution attempt. Lookup failures and timeouts are not told
    /// apart; both count as "no resolution this attempt".
    async fn lookup(&self, fqdn: &str) -> Result<()> {
        self.resolver
            .lookup_ip(fqdn)
            .await
            .map(|_| ())
            .map_err(|e| RustBruterError::ResolutionError(format!("{}: {}", fqdn, e)))
    }

    /// First resolved address, used to feed the port-scan collaborator.
    pub async fn first_ip(&self, fqdn: &str) -> Option<IpAddr> {
        self.resolver
            .lookup_ip(fqdn)
            .await
            .ok()
            .and_then(|lookup| lookup.iter().next())
    }
}

#[async_trait]
impl Resolve for DnsResolver {
    async fn resolve(&self, fqdn: &str) -> ResolutionOutcome {
        let resolved = utils::retry_with_delay(
            self.config.retries,
            self.config.retry_delay,
            || self.lookup(fqdn),
        )
        .await
        .is_ok();

        ResolutionOutcome {
            fqdn: fqdn.to_string(),
            resolved,
        }
    }
}
