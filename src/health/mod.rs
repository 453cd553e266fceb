// ABOUTME: Unified health polling engine shared by every provider.
// ABOUTME: Polls a status probe on a fixed interval until ready, fatal, or timeout.

use std::future::Future;
use std::time::Duration;

/// Errors that end a health wait.
#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    /// The wait deadline elapsed before a terminal state was observed.
    #[error("health wait timed out after {}s", waited.as_secs())]
    Timeout { waited: Duration },

    /// The platform reported a terminal Failed provisioning state.
    #[error("provisioning failed for {0}")]
    ProvisioningFailed(String),

    /// The app provisioned but its endpoint did not answer healthy.
    #[error("health probe against {endpoint} failed: {reason}")]
    ProbeFailed { endpoint: String, reason: String },
}

/// What a single poll tick observed.
pub enum PollOutcome<T> {
    /// Terminal success; the wait returns this value.
    Ready(T),
    /// Not terminal yet (including transient query errors); keep polling.
    Continue,
    /// Terminal failure; the wait returns immediately.
    Fatal(HealthError),
}

/// Fixed-interval polling loop with a deadline.
///
/// The whole wait runs inside a cancellable timeout, so dropping the
/// future or cancelling the task unblocks immediately.
#[derive(Debug, Clone, Copy)]
pub struct HealthPoller {
    interval: Duration,
}

/// Poll interval for app-level provisioning checks.
pub const APP_POLL_INTERVAL: Duration = Duration::from_secs(15);
/// Poll interval for revision readiness checks.
pub const REVISION_POLL_INTERVAL: Duration = Duration::from_secs(30);

impl HealthPoller {
    pub fn app_level() -> Self {
        Self::with_interval(APP_POLL_INTERVAL)
    }

    pub fn revision_level() -> Self {
        Self::with_interval(REVISION_POLL_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }

    /// Invoke `tick` until it returns a terminal outcome or `timeout` elapses.
    ///
    /// The first tick runs immediately; subsequent ticks are spaced by the
    /// poll interval.
    pub async fn wait<T, F, Fut>(&self, timeout: Duration, mut tick: F) -> Result<T, HealthError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = PollOutcome<T>>,
    {
        let outcome = tokio::time::timeout(timeout, async {
            loop {
                match tick().await {
                    PollOutcome::Ready(value) => return Ok(value),
                    PollOutcome::Fatal(err) => return Err(err),
                    PollOutcome::Continue => {}
                }
                tokio::time::sleep(self.interval).await;
            }
        })
        .await;

        match outcome {
            Ok(inner) => inner,
            Err(_) => Err(HealthError::Timeout { waited: timeout }),
        }
    }
}

/// Build the probe URL for an app endpoint.
///
/// Platform fqdns come without a scheme and are reachable over https;
/// endpoints that already carry a scheme are used as-is.
pub fn endpoint_url(fqdn: &str, path: &str) -> String {
    let base = if fqdn.contains("://") {
        fqdn.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", fqdn.trim_end_matches('/'))
    };
    format!("{}{}", base, path)
}

/// One HTTP reachability probe against a resolved health endpoint.
pub async fn probe_endpoint(client: &reqwest::Client, url: &str) -> Result<(), HealthError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| HealthError::ProbeFailed {
            endpoint: url.to_string(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(HealthError::ProbeFailed {
            endpoint: url.to_string(),
            reason: format!("unexpected status {}", status),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fast_poller() -> HealthPoller {
        HealthPoller::with_interval(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn returns_ready_after_scripted_sequence() {
        let calls = Cell::new(0u32);
        let poller = fast_poller();

        let result = poller
            .wait(Duration::from_secs(5), || {
                calls.set(calls.get() + 1);
                let outcome = match calls.get() {
                    1 | 2 => PollOutcome::Continue,
                    _ => PollOutcome::Ready("up"),
                };
                async move { outcome }
            })
            .await;

        assert_eq!(result.unwrap(), "up");
        assert_eq!(calls.get(), 3, "wait should end on the third poll");
    }

    #[tokio::test]
    async fn fatal_ends_wait_before_timeout() {
        let calls = Cell::new(0u32);
        let poller = fast_poller();

        let result: Result<(), _> = poller
            .wait(Duration::from_secs(60), || {
                calls.set(calls.get() + 1);
                let outcome = match calls.get() {
                    1 => PollOutcome::Continue,
                    _ => PollOutcome::Fatal(HealthError::ProvisioningFailed(
                        "content-api".to_string(),
                    )),
                };
                async move { outcome }
            })
            .await;

        assert!(matches!(result, Err(HealthError::ProvisioningFailed(_))));
        assert_eq!(calls.get(), 2, "failure should surface on the second poll");
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_no_terminal_state() {
        let poller = HealthPoller::with_interval(Duration::from_secs(15));
        let started = tokio::time::Instant::now();

        let result: Result<(), _> = poller
            .wait(Duration::from_secs(120), || async { PollOutcome::Continue })
            .await;

        assert!(matches!(result, Err(HealthError::Timeout { .. })));
        assert!(
            started.elapsed() >= Duration::from_secs(120),
            "timeout must not fire early"
        );
    }

    #[test]
    fn endpoint_url_adds_scheme_only_when_missing() {
        assert_eq!(
            endpoint_url("app.env.example.io", "/health"),
            "https://app.env.example.io/health"
        );
        assert_eq!(
            endpoint_url("http://127.0.0.1:8080", "/health"),
            "http://127.0.0.1:8080/health"
        );
    }
}
