// src/utils.rs
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Check if a string is a valid domain
pub fn is_valid_domain(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > 253 {
        return false;
    }

    let parts: Vec<&str> = domain.split('.').collect();
    if parts.len() < 2 {
        return false;
    }

    for part in parts {
        if part.is_empty() || part.len() > 63 {
            return false;
        }

        if !part.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return false;
        }

        if part.starts_with('-') || part.ends_with('-') {
            return false;
        }
    }

    true
}

const LABEL_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Random DNS label, used as a wildcard canary.
pub fn random_label(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| LABEL_CHARS[rng.gen_range(0..LABEL_CHARS.len())] as char)
        .collect()
}

/// Retry an async operation up to `max_attempts` times with a fixed delay
/// between attempts. Returns the first success, or the last error once
/// attempts run out. Always runs at least one attempt.
pub async fn retry_with_delay<T, E, F, Fut>(
    max_attempts: u32,
    delay: Duration,
    mut op: F,
) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let mut attempt: u32 = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt >= max_attempts {
                    return Err(e);
                }
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
        }
    }
}
