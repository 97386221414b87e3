// src/provider/rate_limiter.rs
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Enforces a minimum spacing between calls. Callers queue on the mutex, so
/// concurrent waiters are released one interval apart.
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn per_minute(calls_per_minute: u32) -> Self {
        let calls = calls_per_minute.max(1);
        Self::with_interval(Duration::from_secs_f64(60.0 / f64::from(calls)))
    }

    pub fn with_interval(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub async fn wait(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                debug!("Rate limiting: waiting {:.2}s", wait_time.as_secs_f64());
                tokio::time::sleep(wait_time).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}
