use crate::error::{Error, Result};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Client-side cap on calls to the Scryfall API host.
pub const SEARCH_CALLS_PER_SECOND: u32 = 12;

/// Get standard user agent string
pub fn get_user_agent() -> &'static str {
    concat!("MtgFetch/", env!("CARGO_PKG_VERSION"))
}

/// Build the HTTP client shared by the API and image requests.
pub fn build_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(get_user_agent())
        .timeout(Duration::from_secs(30))
        .build()?;
    Ok(client)
}

/// Enforces a minimum interval between calls.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn per_second(calls: u32) -> Self {
        Self {
            interval: Duration::from_secs(1) / calls.max(1),
            last_call: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleep until the next call is allowed, then record it.
    pub async fn wait(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}

/// Download a resource, failing on any non-2xx status.
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(Error::transport(url, format!("HTTP {}", response.status())));
    }

    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}
