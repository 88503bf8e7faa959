//! Typed Real-Debrid API client.
//!
//! One client per configured account; all clients share a single
//! [`RateLimiter`]. Every operation acquires the appropriate bucket
//! before touching the network, and transient failures (429, 5xx,
//! timeouts, connection resets) are retried with exponential backoff.
//! A 429 waits at least as long as any server `Retry-After` hint.
//! Non-transient failures are surfaced immediately, never retried.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::backoff::{RetryPolicy, RetrySchedule};
use crate::catalog::{AddOutcome, TorrentCatalog};
use crate::error::{error_code_message, is_already_exists_code, RealDebridError, Result};
use crate::limiter::{Bucket, RateLimiter};
use crate::types::{AddedMagnet, ApiErrorBody, Torrent, TorrentInfo};

/// Client tuning, mapped from the `api:` section of the configuration.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub page_size: u32,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: "https://api.real-debrid.com/rest/1.0".to_string(),
            page_size: 2000,
            timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }
}

/// Real-Debrid API client for a single account.
pub struct RealDebridClient {
    account: String,
    token: String,
    http: Arc<dyn HttpClient>,
    limiter: Arc<RateLimiter>,
    options: ClientOptions,
}

impl RealDebridClient {
    pub fn new(
        account: impl Into<String>,
        token: impl Into<String>,
        http: Arc<dyn HttpClient>,
        limiter: Arc<RateLimiter>,
        options: ClientOptions,
    ) -> Self {
        Self {
            account: account.into(),
            token: token.into(),
            http,
            limiter,
            options,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.options.base_url.trim_end_matches('/'), path)
    }

    fn base_request(&self, request: HttpRequest) -> HttpRequest {
        request
            .bearer_token(&self.token)
            .timeout(self.options.timeout)
    }

    /// Execute a request through the rate limiter with retry on
    /// transient failures.
    async fn request(&self, bucket: Bucket, request: HttpRequest) -> Result<HttpResponse> {
        let mut schedule = RetrySchedule::new(self.options.retry);

        loop {
            self.limiter.acquire(bucket).await;

            let (error, retry_after) = match self.http.execute(request.clone()).await {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) => {
                    let transient = response.status == 429 || response.is_server_error();
                    let retry_after = Self::retry_after(&response);
                    let error = Self::error_from_response(&response);
                    if !transient {
                        return Err(error);
                    }
                    (error, retry_after)
                }
                Err(e) if e.is_transient() => (RealDebridError::Transport(e), None),
                Err(e) => return Err(e.into()),
            };

            let Some((attempt, delay)) = schedule.next() else {
                return Err(error);
            };
            // Honour the server hint even when the backoff curve is shorter.
            let wait = retry_after.map_or(delay, |hint| delay.max(hint));
            warn!(
                account = %self.account,
                attempt,
                wait_ms = wait.as_millis() as u64,
                error = %error,
                "transient API failure, backing off"
            );
            tokio::time::sleep(wait).await;
        }
    }

    fn retry_after(response: &HttpResponse) -> Option<Duration> {
        response
            .header("Retry-After")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }

    fn error_from_response(response: &HttpResponse) -> RealDebridError {
        let body: Option<ApiErrorBody> = serde_json::from_slice(&response.body).ok();
        let code = body.as_ref().and_then(|b| b.error_code);
        let message = match (body.and_then(|b| b.error), code.and_then(error_code_message)) {
            (Some(error), Some(mapped)) => format!("{} ({})", error, mapped),
            (Some(error), None) => error,
            (None, Some(mapped)) => mapped.to_string(),
            (None, None) => format!("HTTP {}", response.status),
        };

        match response.status {
            401 | 403 => RealDebridError::Auth {
                status: response.status,
                message,
            },
            429 => RealDebridError::RateLimited {
                retry_after: Self::retry_after(response),
            },
            status => RealDebridError::Api {
                status,
                code,
                message,
            },
        }
    }

    fn parse_json<T: serde::de::DeserializeOwned>(response: &HttpResponse) -> Result<T> {
        serde_json::from_slice(&response.body)
            .map_err(|e| RealDebridError::Parse(format!("unexpected response shape: {}", e)))
    }

    /// Fetch one page of the torrent listing.
    async fn fetch_page(&self, page: u32) -> Result<Vec<Torrent>> {
        let request = self.base_request(
            HttpRequest::get(self.endpoint("/torrents"))
                .query("page", &page.to_string())
                .query("limit", &self.options.page_size.to_string()),
        );
        let response = self.request(Bucket::Torrents, request).await?;

        // The API answers 204 with an empty body when the page is empty.
        if response.status == 204 || response.body.is_empty() {
            return Ok(Vec::new());
        }
        let torrents: Vec<Torrent> = Self::parse_json(&response)?;
        debug!(account = %self.account, page, count = torrents.len(), "fetched torrents page");
        Ok(torrents)
    }

    /// Select which files of a torrent to download. An empty id list
    /// selects all files.
    #[instrument(skip(self), fields(account = %self.account))]
    pub async fn select_files(&self, torrent_id: &str, file_ids: &[i64]) -> Result<()> {
        let files = if file_ids.is_empty() {
            "all".to_string()
        } else {
            file_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        };
        let request = self.base_request(
            HttpRequest::post(self.endpoint(&format!("/torrents/selectFiles/{}", torrent_id)))
                .form(&[("files", files.as_str())]),
        );
        self.request(Bucket::General, request).await?;
        Ok(())
    }
}

struct PageState {
    page: u32,
    buffer: VecDeque<Torrent>,
    exhausted: bool,
}

#[async_trait]
impl TorrentCatalog for RealDebridClient {
    fn account(&self) -> &str {
        &self.account
    }

    fn list_torrents(&self) -> BoxStream<'_, Result<Torrent>> {
        let page_size = self.options.page_size;
        let initial = PageState {
            page: 1,
            buffer: VecDeque::new(),
            exhausted: false,
        };
        stream::try_unfold(initial, move |mut state| async move {
            loop {
                if let Some(torrent) = state.buffer.pop_front() {
                    return Ok(Some((torrent, state)));
                }
                if state.exhausted {
                    return Ok(None);
                }
                let items = self.fetch_page(state.page).await?;
                state.exhausted = (items.len() as u32) < page_size;
                state.page += 1;
                state.buffer.extend(items);
                if state.buffer.is_empty() && state.exhausted {
                    return Ok(None);
                }
            }
        })
        .boxed()
    }

    #[instrument(skip(self), fields(account = %self.account))]
    async fn torrent_info(&self, id: &str) -> Result<TorrentInfo> {
        let request =
            self.base_request(HttpRequest::get(self.endpoint(&format!("/torrents/info/{}", id))));
        let response = self.request(Bucket::General, request).await?;
        Self::parse_json(&response)
    }

    #[instrument(skip(self, file_ids), fields(account = %self.account))]
    async fn add_magnet(&self, hash: &str, file_ids: Option<&[i64]>) -> Result<AddOutcome> {
        let magnet = format!("magnet:?xt=urn:btih:{}", hash);
        let request = self.base_request(
            HttpRequest::post(self.endpoint("/torrents/addMagnet"))
                .form(&[("magnet", magnet.as_str())]),
        );

        let response = match self.request(Bucket::General, request).await {
            Ok(response) => response,
            Err(RealDebridError::Api {
                code: Some(code), ..
            }) if is_already_exists_code(code) => return Ok(AddOutcome::AlreadyExists),
            Err(e) => return Err(e),
        };

        // Some error payloads come back with a 2xx status; check for an
        // embedded error object before reading the torrent id.
        if let Ok(ApiErrorBody {
            error: Some(error),
            error_code,
        }) = serde_json::from_slice::<ApiErrorBody>(&response.body)
        {
            if error_code.is_some_and(is_already_exists_code) {
                return Ok(AddOutcome::AlreadyExists);
            }
            return Err(RealDebridError::Api {
                status: response.status,
                code: error_code,
                message: error,
            });
        }

        let added: AddedMagnet = Self::parse_json(&response)?;

        if let Some(ids) = file_ids {
            self.select_files(&added.id, ids).await?;
        }

        debug!(account = %self.account, id = %added.id, "magnet added");
        Ok(AddOutcome::Added { id: added.id })
    }
}
