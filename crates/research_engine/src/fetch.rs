//! Page download with a capped redirect chain, body size and media type.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{redirect, Client, Response, Url};
use research_logging::{research_debug, research_trace};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    /// Applies to each hop of a redirect chain.
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            allowed_content_types: ["text/html", "application/xhtml+xml", "text/plain"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// A downloaded page body and where it was finally served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub redirects: usize,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// One-line report shown while ingesting.
    pub fn summary(&self) -> String {
        match self.redirects {
            0 => format!("Fetched {}: {} bytes", self.url, self.body.len()),
            n => format!(
                "Fetched {}: {} bytes after {n} redirect(s)",
                self.url,
                self.body.len()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("invalid url ({0})")]
    InvalidUrl(String),
    #[error("http status {0}")]
    Status(u16),
    #[error("timed out")]
    Timeout,
    #[error("more than {limit} redirect(s)")]
    TooManyRedirects { limit: usize },
    #[error("redirect without a usable Location header")]
    BadRedirect,
    #[error("response larger than {max_bytes} bytes")]
    TooLarge { max_bytes: u64 },
    #[error("unsupported content type {0}")]
    UnsupportedContentType(String),
    #[error("network error ({0})")]
    Network(String),
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Fetcher over a shared `reqwest` client. Redirects are followed here rather
/// than by the client so each hop is counted against `redirect_limit`.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(classify)?;
        Ok(Self { client, settings })
    }

    async fn follow(&self, start: Url) -> Result<(Url, usize, Response), FetchError> {
        let mut current = start;
        let mut redirects = 0;
        loop {
            let response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(classify)?;
            if !response.status().is_redirection() {
                return Ok((current, redirects, response));
            }
            if redirects == self.settings.redirect_limit {
                return Err(FetchError::TooManyRedirects {
                    limit: self.settings.redirect_limit,
                });
            }
            let next = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|location| current.join(location).ok())
                .ok_or(FetchError::BadRedirect)?;
            research_trace!("{} redirects to {}", current, next);
            redirects += 1;
            current = next;
        }
    }

    fn accepts(&self, content_type: &str) -> bool {
        let media_type = content_type.split(';').next().unwrap_or_default().trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(media_type))
    }

    async fn read_body(&self, mut response: Response) -> Result<Vec<u8>, FetchError> {
        let too_large = FetchError::TooLarge {
            max_bytes: self.settings.max_bytes,
        };
        if response
            .content_length()
            .is_some_and(|declared| declared > self.settings.max_bytes)
        {
            return Err(too_large);
        }
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(classify)? {
            if (body.len() + chunk.len()) as u64 > self.settings.max_bytes {
                return Err(too_large);
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let start = Url::parse(url).map_err(|err| FetchError::InvalidUrl(err.to_string()))?;
        let (final_url, redirects, response) = self.follow(start).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        if let Some(content_type) = content_type.as_deref() {
            if !self.accepts(content_type) {
                return Err(FetchError::UnsupportedContentType(content_type.to_string()));
            }
        }

        let body = self.read_body(response).await?;
        research_debug!("Fetched {} bytes from {}", body.len(), final_url);
        Ok(FetchedPage {
            url: final_url.into(),
            redirects,
            content_type,
            body,
        })
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(err.to_string())
    }
}
