use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{BuildError, TransportError};
use crate::protocol::redact;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Plain HTTP GET with a fixed number of attempts and a fixed pause between them.
///
/// Idle connections are never pooled, so every attempt dials the unit fresh.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    max_attempts: u32,
    retry_delay: Duration,
    password: Option<String>,
}

impl HttpTransport {
    /// Fails if `host` cannot form a URL; IPv6 literals may be given bare.
    pub fn new(
        host: &str,
        port: u16,
        timeout: Duration,
        max_attempts: u32,
        retry_delay: Duration,
    ) -> Result<Self, BuildError> {
        let authority = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]")
        } else {
            host.to_string()
        };
        let base_url = format!("http://{authority}:{port}");
        let authority_only = reqwest::Url::parse(&base_url).is_ok_and(|url| {
            url.host().is_some()
                && url.port_or_known_default() == Some(port)
                && url.path() == "/"
                && url.query().is_none()
                && url.fragment().is_none()
                && url.username().is_empty()
        });
        if !authority_only {
            return Err(BuildError::InvalidHost(host.to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            http,
            base_url,
            max_attempts: max_attempts.max(1),
            retry_delay,
            password: None,
        })
    }

    /// Password to mask wherever a query is logged.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// GET `path_and_query` and return the body text.
    pub async fn query(&self, path_and_query: &str) -> Result<String, TransportError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.attempt(&url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.max_attempts => {
                    debug!(
                        attempt,
                        max = self.max_attempts,
                        path = %redact(path_and_query, self.password.as_deref()),
                        error = %e,
                        "query failed, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    warn!(
                        attempts = attempt,
                        path = %redact(path_and_query, self.password.as_deref()),
                        error = %e,
                        "query failed"
                    );
                    return Err(TransportError::Exhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
            }
        }
    }

    async fn attempt(&self, url: &str) -> Result<String, TransportError> {
        // reqwest errors carry the URL, which carries the password.
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let bytes = resp.bytes().await.map_err(reqwest::Error::without_url)?;
        String::from_utf8(bytes.to_vec()).map_err(TransportError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(host: &str) -> Result<HttpTransport, BuildError> {
        HttpTransport::new(
            host,
            2000,
            DEFAULT_TIMEOUT,
            DEFAULT_MAX_ATTEMPTS,
            DEFAULT_RETRY_DELAY,
        )
    }

    #[test]
    fn ipv6_literal_is_bracketed() {
        assert_eq!(transport("::1").unwrap().base_url, "http://[::1]:2000");
        assert_eq!(transport("[fe80::1]").unwrap().base_url, "http://[fe80::1]:2000");
    }

    #[test]
    fn hostname_and_ipv4_pass_through() {
        assert_eq!(transport("192.168.1.50").unwrap().base_url, "http://192.168.1.50:2000");
        assert_eq!(transport("ac.local").unwrap().base_url, "http://ac.local:2000");
    }

    #[test]
    fn unusable_host_fails_up_front() {
        for host in ["", "bad host", "a/b", "a?b", "user@a", "::zz::"] {
            assert!(
                matches!(transport(host), Err(BuildError::InvalidHost(ref h)) if h == host),
                "{host:?} should be rejected"
            );
        }
    }
}
