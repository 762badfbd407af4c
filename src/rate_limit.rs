use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, instrument};

/// Slowest pace accepted, in requests per second
const MIN_RATE: f64 = 0.01;

/// Client-side pacing for catalog requests
///
/// Tokens accrue at `rate` per second up to a burst of `max(rate, 1)`. A caller
/// that finds the bucket empty books the next token anyway, leaving the
/// balance negative, and sleeps until that token is due. Concurrent callers
/// queue behind each other in booking order and every one of them eventually
/// gets through.
///
/// Clones share one balance, so every clone of a
/// [`BooksClient`](crate::BooksClient) draws from the same budget.
#[derive(Clone)]
pub struct RateLimiter {
    rate: f64,
    pacer: Arc<Mutex<Pacer>>,
}

struct Pacer {
    /// Tokens on hand; negative while callers hold bookings
    balance: f64,
    burst: f64,
    rate: f64,
    updated: Instant,
}

impl Pacer {
    fn accrue(&mut self, now: Instant) {
        let earned = now.saturating_duration_since(self.updated).as_secs_f64() * self.rate;
        self.balance = (self.balance + earned).min(self.burst);
        self.updated = now;
    }

    /// Book one token and return how long until it is due
    fn book(&mut self, now: Instant) -> Duration {
        self.accrue(now);
        self.balance -= 1.0;

        if self.balance >= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(-self.balance / self.rate)
        }
    }
}

impl RateLimiter {
    /// Create a limiter allowing `rate` requests per second
    ///
    /// # Example
    ///
    /// ```
    /// use bookshelf_client::rate_limit::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(10.0);
    /// assert_eq!(limiter.rate(), 10.0);
    /// ```
    pub fn new(rate: f64) -> Self {
        let rate = rate.max(MIN_RATE);
        let burst = rate.max(1.0);

        Self {
            rate,
            pacer: Arc::new(Mutex::new(Pacer {
                balance: burst,
                burst,
                rate,
                updated: Instant::now(),
            })),
        }
    }

    /// Wait for this caller's turn
    #[instrument(skip(self))]
    pub async fn acquire(&self) {
        let wait = self.pacer.lock().await.book(Instant::now());

        if !wait.is_zero() {
            debug!(wait_ms = wait.as_millis() as u64, "Waiting for rate limit slot");
            sleep(wait).await;
        }
    }

    /// Tokens available right now, negative while callers are queued
    pub async fn available(&self) -> f64 {
        let mut pacer = self.pacer.lock().await;
        pacer.accrue(Instant::now());
        pacer.balance
    }

    /// Requests per second
    pub fn rate(&self) -> f64 {
        self.rate
    }
}
