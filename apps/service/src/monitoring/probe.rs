use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::cert;
use super::types::{CheckOutcome, ProbeError};
use crate::rules::Rule;

/// One HTTP hop, stripped down to what the probe automaton needs.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub location: Option<String>,
    pub body: String,
    /// Peer certificate expiry, when the transport was encrypted
    pub cert_not_after: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub enum FetchError {
    Timeout,
    Transport(String),
}

/// Transport seam of the check engine. The production implementation is
/// reqwest-backed; tests script hops through a fake.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchResponse, FetchError>;
}

/// Reqwest-backed fetcher. Redirects are disabled on the client because
/// the automaton follows them itself, and TLS connection info is captured
/// for certificate-expiry inspection.
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .tls_info(true)
            .build()?;

        Ok(Self { client })
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() { FetchError::Timeout } else { FetchError::Transport(err.to_string()) }
}

#[async_trait]
impl Fetch for ReqwestFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchResponse, FetchError> {
        let response =
            self.client.get(url).timeout(timeout).send().await.map_err(classify)?;

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let cert_not_after = response
            .extensions()
            .get::<reqwest::tls::TlsInfo>()
            .and_then(|info| info.peer_certificate())
            .and_then(|der| cert::not_after(der, url));
        let body = response.text().await.map_err(classify)?;

        Ok(FetchResponse { status, location, body, cert_not_after })
    }
}

/// The check engine. `check` never fails; every failure mode is encoded
/// in the outcome, and exactly one outcome is produced per call.
pub struct Prober<F> {
    fetcher: F,
    max_redirects: u32,
    max_cert_age: chrono::Duration,
}

impl<F: Fetch> Prober<F> {
    pub fn new(fetcher: F, max_redirects: u32, max_cert_age: chrono::Duration) -> Self {
        Self { fetcher, max_redirects, max_cert_age }
    }

    /// Probe one rule: follow redirects up to the configured maximum,
    /// retry timeouts and transport errors against the rule's budget,
    /// then inspect certificate expiry and body content on a 2xx.
    pub async fn check(&self, rule: &Rule) -> CheckOutcome {
        let mut outcome = CheckOutcome::default();
        let mut url = rule.url.clone();
        let mut redirects: u32 = 0;
        let mut retries = rule.retries;

        loop {
            let response = match self.fetcher.fetch(&url, rule.timeout).await {
                Ok(response) => response,
                Err(FetchError::Timeout) => {
                    if retries == 0 {
                        outcome.timed_out = true;
                        return outcome;
                    }
                    // Identical request, redirect count preserved
                    retries -= 1;
                    continue;
                }
                Err(FetchError::Transport(message)) => {
                    if retries == 0 {
                        outcome.transport_error = Some(ProbeError::Transport(message));
                        return outcome;
                    }
                    retries -= 1;
                    continue;
                }
            };

            if (300..400).contains(&response.status) {
                redirects += 1;
                if redirects > self.max_redirects {
                    outcome.transport_error = Some(ProbeError::TooManyRedirects);
                    return outcome;
                }
                let Some(location) = response.location else {
                    outcome.transport_error = Some(ProbeError::MissingLocation);
                    return outcome;
                };
                if location == url {
                    outcome.transport_error = Some(ProbeError::RedirectLoop);
                    return outcome;
                }
                url = location;
                continue;
            }

            if response.status < 200 || response.status >= 400 {
                // No content check on a bad status
                outcome.status_code = response.status;
                return outcome;
            }

            if rule.url.starts_with("https") {
                if let Some(not_after) = response.cert_not_after {
                    outcome.cert_expiring = not_after - Utc::now() < self.max_cert_age;
                }
            }

            outcome.content_mismatch = rule.operator.mismatch(&response.body, &rule.content);
            return outcome;
        }
    }
}
