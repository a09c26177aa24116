// src/prober.rs
use crate::error::Result;
use crate::types::{HttpConfig, LivenessOutcome, RustBruterError, StatusClass};
use crate::utils;
use async_trait::async_trait;
use log::warn;
use reqwest::{redirect, Client, StatusCode};
use url::Url;

/// HTTP liveness check, the second stage of the per-candidate pipeline.
/// Only invoked for candidates that already resolved in DNS.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, fqdn: &str) -> LivenessOutcome;
}

pub struct HttpProber {
    client: Client,
    config: HttpConfig,
}

impl HttpProber {
    pub fn new(config: HttpConfig, user_agent: &str, proxy: Option<&str>) -> Result<Self> {
        // Redirects stay unfollowed so 301/302 classify as REDIRECT, and the
        // idle pool is disabled so every attempt opens a fresh connection.
        let mut client_builder = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(user_agent)
            .redirect(redirect::Policy::none())
            .pool_max_idle_per_host(0);

        if let Some(proxy_url) = proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| RustBruterError::ConfigError(format!("Invalid proxy URL: {}", e)))?;
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder.build().map_err(|e| {
            RustBruterError::ConfigError(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, fqdn: &str) -> Result<Url> {
        let raw = match self.config.port {
            Some(port) => format!("http://{}:{}/", fqdn, port),
            None => format!("http://{}/", fqdn),
        };
        Url::parse(&raw)
            .map_err(|e| RustBruterError::NetworkError(format!("Invalid probe URL {}: {}", raw, e)))
    }

    fn classify(status: StatusCode) -> StatusClass {
        match status.as_u16() {
            200 => StatusClass::Ok,
            301 | 302 => StatusClass::Redirect,
            _ => StatusClass::Other,
        }
    }

    /// One GET attempt. A qualifying status is a success; anything else is
    /// a failed attempt carrying the class it would terminate with.
    async fn attempt(&self, url: Url) -> std::result::Result<StatusClass, StatusClass> {
        match self.client.get(url).send().await {
            Ok(response) => match Self::classify(response.status()) {
                StatusClass::Other => Err(StatusClass::Other),
                qualifying => Ok(qualifying),
            },
            Err(_) => Err(StatusClass::Unreachable),
        }
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self, fqdn: &str) -> LivenessOutcome {
        let url = match self.endpoint(fqdn) {
            Ok(url) => url,
            Err(e) => {
                warn!("Skipping HTTP probe for {}: {}", fqdn, e);
                return LivenessOutcome {
                    fqdn: fqdn.to_string(),
                    live: false,
                    status_class: StatusClass::Unreachable,
                };
            }
        };

        let verdict = utils::retry_with_delay(
            self.config.retries,
            self.config.retry_delay,
            || self.attempt(url.clone()),
        )
        .await;

        match verdict {
            Ok(status_class) => LivenessOutcome {
                fqdn: fqdn.to_string(),
                live: true,
                status_class,
            },
            Err(status_class) => LivenessOutcome {
                fqdn: fqdn.to_string(),
                live: false,
                status_class,
            },
        }
    }
}
