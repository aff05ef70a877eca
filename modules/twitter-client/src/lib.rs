pub mod error;
pub mod types;

pub use error::{Result, TwitterError};
pub use types::{Tweet, TweetEntities, TweetUrl, TweetUser};

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

const BASE_URL: &str = "https://api.twitter.com/1.1";

/// Rate-limit retry policy: bounded attempts with a doubling delay, in
/// place of sleeping out the whole rate-limit window.
const MAX_ATTEMPTS: u32 = 5;
const BACKOFF_BASE: Duration = Duration::from_secs(2);

/// Delay before retry number `attempt` (zero-based): 2s, 4s, 8s, ...
fn backoff_delay(attempt: u32) -> Duration {
    BACKOFF_BASE * 2u32.saturating_pow(attempt)
}

/// Parameters for one timeline page.
#[derive(Debug, Clone, Default)]
pub struct TimelineRequest {
    pub screen_name: String,
    pub count: u32,
    /// Only statuses with an id at or below this one (paging cursor).
    pub max_id: Option<u64>,
    /// Only statuses newer than this one.
    pub since_id: Option<u64>,
}

/// Status and raw body of one timeline fetch, before any retry or
/// decode decisions.
pub struct TimelineResponse {
    pub status: u16,
    pub body: String,
}

/// The HTTP seam under [`TwitterClient`]. Production uses
/// [`HttpTransport`]; tests substitute an in-memory one.
#[async_trait]
pub trait TimelineTransport: Send + Sync {
    async fn fetch(&self, req: &TimelineRequest) -> Result<TimelineResponse>;
}

/// App-auth (bearer token) GET against the v1.1 user timeline endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    bearer_token: String,
}

impl HttpTransport {
    pub fn new(bearer_token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            bearer_token: bearer_token.to_string(),
        }
    }
}

#[async_trait]
impl TimelineTransport for HttpTransport {
    async fn fetch(&self, req: &TimelineRequest) -> Result<TimelineResponse> {
        let url = format!("{}/statuses/user_timeline.json", BASE_URL);

        let mut params: Vec<(&str, String)> = vec![
            ("screen_name", req.screen_name.clone()),
            ("count", req.count.to_string()),
        ];
        if let Some(max_id) = req.max_id {
            params.push(("max_id", max_id.to_string()));
        }
        if let Some(since_id) = req.since_id {
            params.push(("since_id", since_id.to_string()));
        }

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(&params)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(TimelineResponse { status, body })
    }
}

/// Client for the user timeline endpoint.
pub struct TwitterClient {
    transport: Box<dyn TimelineTransport>,
}

impl TwitterClient {
    pub fn new(bearer_token: &str) -> Self {
        Self::with_transport(Box::new(HttpTransport::new(bearer_token)))
    }

    pub fn with_transport(transport: Box<dyn TimelineTransport>) -> Self {
        Self { transport }
    }

    /// Fetch one page of a user's timeline. HTTP 429 is retried up to
    /// [`MAX_ATTEMPTS`] times with exponential backoff; any other failure
    /// surfaces immediately.
    pub async fn user_timeline(&self, req: &TimelineRequest) -> Result<Vec<Tweet>> {
        for attempt in 0..MAX_ATTEMPTS {
            let resp = self.transport.fetch(req).await?;

            if resp.status == 429 {
                if attempt + 1 == MAX_ATTEMPTS {
                    break;
                }
                let delay = backoff_delay(attempt);
                warn!(
                    screen_name = req.screen_name.as_str(),
                    attempt,
                    delay_secs = delay.as_secs(),
                    "timeline rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            if !(200..300).contains(&resp.status) {
                return Err(TwitterError::Api {
                    status: resp.status,
                    message: resp.body,
                });
            }

            return Ok(serde_json::from_str(&resp.body)?);
        }

        Err(TwitterError::RateLimited {
            attempts: MAX_ATTEMPTS,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        assert_eq!(backoff_delay(0), Duration::from_secs(2));
        assert_eq!(backoff_delay(1), Duration::from_secs(4));
        assert_eq!(backoff_delay(3), Duration::from_secs(16));
    }

    #[test]
    fn backoff_total_is_bounded() {
        let total: Duration = (0..MAX_ATTEMPTS - 1).map(backoff_delay).sum();
        assert!(total < Duration::from_secs(60));
    }

    /// Serves 429 for the first `limited` fetches, then an empty page.
    /// `calls` is shared with the test so fetch counts stay observable
    /// after the transport moves into the client.
    struct ThrottledTransport {
        limited: u32,
        calls: Arc<AtomicU32>,
    }

    impl ThrottledTransport {
        fn new(limited: u32) -> (Self, Arc<AtomicU32>) {
            let calls = Arc::new(AtomicU32::new(0));
            (
                Self {
                    limited,
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl TimelineTransport for ThrottledTransport {
        async fn fetch(&self, _req: &TimelineRequest) -> Result<TimelineResponse> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.limited {
                Ok(TimelineResponse {
                    status: 429,
                    body: String::new(),
                })
            } else {
                Ok(TimelineResponse {
                    status: 200,
                    body: "[]".to_string(),
                })
            }
        }
    }

    /// Answers every fetch with the same status and body.
    struct FixedTransport {
        status: u16,
        body: &'static str,
    }

    #[async_trait]
    impl TimelineTransport for FixedTransport {
        async fn fetch(&self, _req: &TimelineRequest) -> Result<TimelineResponse> {
            Ok(TimelineResponse {
                status: self.status,
                body: self.body.to_string(),
            })
        }
    }

    fn request() -> TimelineRequest {
        TimelineRequest {
            screen_name: "in_gr".to_string(),
            count: 200,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_retries_until_success() {
        let (transport, calls) = ThrottledTransport::new(MAX_ATTEMPTS - 1);
        let client = TwitterClient::with_transport(Box::new(transport));

        let tweets = client.user_timeline(&request()).await.unwrap();
        assert!(tweets.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_exhausts_attempts() {
        let (transport, calls) = ThrottledTransport::new(u32::MAX);
        let client = TwitterClient::with_transport(Box::new(transport));

        let err = client.user_timeline(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            TwitterError::RateLimited {
                attempts: MAX_ATTEMPTS
            }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn non_429_failures_surface_immediately() {
        let transport = Box::new(FixedTransport {
            status: 500,
            body: "upstream down",
        });
        let client = TwitterClient::with_transport(transport);

        let err = client.user_timeline(&request()).await.unwrap_err();
        match err {
            TwitterError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream down");
            }
            other => panic!("expected Api error, got {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let transport = Box::new(FixedTransport {
            status: 200,
            body: "{not json",
        });
        let client = TwitterClient::with_transport(transport);

        let err = client.user_timeline(&request()).await.unwrap_err();
        assert!(matches!(err, TwitterError::Parse(_)));
    }
}
