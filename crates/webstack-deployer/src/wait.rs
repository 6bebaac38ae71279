//! Polling with exponential backoff.
//!
//! Used for the one blocking wait in the stack lifecycle: instance
//! termination during teardown.

use anyhow::Result;
use backon::{BackoffBuilder, ExponentialBuilder};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Configuration for resource waiting with exponential backoff.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Initial delay between checks
    pub initial_delay: Duration,
    /// Maximum delay between checks (cap for exponential growth)
    pub max_delay: Duration,
    /// Maximum total time to wait before timeout
    pub timeout: Duration,
}

/// Wait for a condition to hold, backing off exponentially with jitter.
///
/// `check` returns `Ok(true)` when ready and `Ok(false)` to poll again. An
/// error from `check` aborts the wait. Exceeding `config.timeout` is an
/// error.
pub async fn wait_for_resource<F, Fut>(
    config: WaitConfig,
    check: F,
    resource_name: &str,
) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    let mut delays = ExponentialBuilder::default()
        .with_min_delay(config.initial_delay)
        .with_max_delay(config.max_delay)
        .with_factor(2.0)
        .with_jitter()
        .build();

    loop {
        attempts += 1;

        if start.elapsed() >= config.timeout {
            anyhow::bail!(
                "Timeout waiting for {} after {:?} ({} attempts)",
                resource_name,
                config.timeout,
                attempts
            );
        }

        match check().await {
            Ok(true) => {
                debug!(resource = %resource_name, attempts, "Resource ready");
                return Ok(());
            }
            Ok(false) => {
                let delay = delays.next().unwrap_or(config.max_delay);
                debug!(
                    resource = %resource_name,
                    attempt = attempts,
                    delay_ms = delay.as_millis(),
                    "Resource not ready, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                warn!(resource = %resource_name, error = ?e, "Resource check failed");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config() -> WaitConfig {
        WaitConfig {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn returns_once_check_passes() {
        let calls = AtomicU32::new(0);

        wait_for_resource(
            fast_config(),
            || async {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(n >= 3)
            },
            "test resource",
        )
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn check_error_aborts_wait() {
        let calls = AtomicU32::new(0);

        let err = wait_for_resource(
            fast_config(),
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                anyhow::bail!("describe failed")
            },
            "test resource",
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("describe failed"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn times_out_when_never_ready() {
        let config = WaitConfig {
            timeout: Duration::from_millis(20),
            ..fast_config()
        };

        let err = wait_for_resource(config, || async { Ok(false) }, "stuck resource")
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("Timeout"), "unexpected error: {msg}");
        assert!(msg.contains("stuck resource"));
    }
}
