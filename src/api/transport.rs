use crate::config::Config;
use crate::error::{Result, SkycastError};
use bytes::Bytes;
use moka::future::Cache;
use reqwest::Url;
use std::time::{Duration, Instant};
use tracing::debug;

const API_KEY_PARAM: &str = "appid";

/// Transport settings, normally derived from [`Config`].
#[derive(Clone)]
pub struct TransportConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub cache_max_bytes: u64,
    pub online_max_age: Duration,
    pub offline_max_stale: Duration,
}

impl TransportConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.api.base_url.clone(),
            api_key: config.api.key.clone(),
            timeout: Duration::from_secs(config.http.timeout_secs),
            cache_max_bytes: config.http.cache_max_bytes,
            online_max_age: Duration::from_secs(config.http.online_max_age_secs),
            offline_max_stale: Duration::from_secs(config.http.offline_max_stale_secs),
        }
    }
}

impl std::fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .field("cache_max_bytes", &self.cache_max_bytes)
            .field("online_max_age", &self.online_max_age)
            .field("offline_max_stale", &self.offline_max_stale)
            .finish()
    }
}

#[derive(Clone)]
struct CachedResponse {
    body: Bytes,
    fetched_at: Instant,
}

/// HTTP transport shared by the remote API clients.
///
/// Every request gets the API key appended as a query parameter. Response
/// bodies are kept in a bounded in-process cache: while a cached entry is
/// younger than `online_max_age` it is served without touching the network,
/// and when the network is unreachable an entry younger than
/// `offline_max_stale` is served instead of failing. With no connection and
/// no eligible cached entry the transport error propagates; nothing retries.
pub struct ApiTransport {
    client: reqwest::Client,
    cache: Cache<String, CachedResponse>,
    config: TransportConfig,
}

impl ApiTransport {
    pub fn new(config: TransportConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(config.cache_max_bytes)
            .weigher(|_key: &String, value: &CachedResponse| -> u32 {
                value.body.len().try_into().unwrap_or(u32::MAX)
            })
            .time_to_live(config.offline_max_stale)
            .build();

        Ok(Self {
            client,
            cache,
            config,
        })
    }

    /// Issue a GET for `path` with the given query parameters.
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Bytes> {
        let (cache_key, url) = self.build_url(path, query)?;

        if let Some(cached) = self.cache.get(&cache_key).await {
            if cached.fetched_at.elapsed() < self.config.online_max_age {
                debug!(path, "serving fresh cached response");
                return Ok(cached.body);
            }
        }

        match self.client.get(url).send().await {
            Ok(response) => {
                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(SkycastError::DataSourceUnavailable(format!(
                        "OpenWeatherMap returned {}: {}",
                        status, body
                    )));
                }

                let body = response.bytes().await?;
                self.cache
                    .insert(
                        cache_key,
                        CachedResponse {
                            body: body.clone(),
                            fetched_at: Instant::now(),
                        },
                    )
                    .await;
                Ok(body)
            }
            Err(err) if err.is_connect() || err.is_timeout() => {
                if let Some(stale) = self.cache.get(&cache_key).await {
                    if stale.fetched_at.elapsed() <= self.config.offline_max_stale {
                        debug!(path, "network unreachable, serving stale cached response");
                        return Ok(stale.body);
                    }
                }
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Build the request URL and the cache key for it.
    /// The cache key excludes the injected API key.
    fn build_url(&self, path: &str, query: &[(&str, String)]) -> Result<(String, Url)> {
        let mut url = Url::parse(&format!("{}{}", self.config.base_url, path))
            .map_err(|e| SkycastError::InvalidData(format!("Invalid request URL: {}", e)))?;

        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }

        let cache_key = url.to_string();
        url.query_pairs_mut()
            .append_pair(API_KEY_PARAM, &self.config.api_key);

        Ok((cache_key, url))
    }
}
