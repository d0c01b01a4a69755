//! Request pacing shared by every call made through one client.
//!
//! Toggl and Tempo both throttle per token and answer `429` with a
//! `Retry-After` hint. The limiter spaces calls by a fixed cooldown and lets
//! the client push the next slot further out when the backend asks for it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep_until;

#[derive(Clone, Debug)]
pub struct RateLimiter {
    cooldown: Duration,
    next_slot: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            next_slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Waits for the next free slot and reserves the one after it.
    pub async fn hit(&self) {
        let mut slot = self.next_slot.lock().await;
        if let Some(at) = *slot {
            if at > Instant::now() {
                sleep_until(at.into()).await;
            }
        }
        *slot = Some(Instant::now() + self.cooldown);
    }

    /// Delays the next call by at least `delay` from now. Never shortens a
    /// wait that is already pending.
    pub async fn back_off(&self, delay: Duration) {
        let mut slot = self.next_slot.lock().await;
        let until = Instant::now() + delay;
        if slot.map_or(true, |at| at < until) {
            *slot = Some(until);
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

#[cfg(test)]
mod tests {
    use super::RateLimiter;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn first_hit_does_not_wait() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        let start = Instant::now();
        limiter.hit().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn clones_share_the_same_cooldown_window() {
        let limiter = RateLimiter::new(Duration::from_millis(40));
        let shared = limiter.clone();

        limiter.hit().await;
        let start = Instant::now();
        shared.hit().await;

        assert!(start.elapsed() >= Duration::from_millis(35));
        assert_eq!(shared.cooldown(), Duration::from_millis(40));
    }

    #[tokio::test]
    async fn back_off_extends_the_wait() {
        let limiter = RateLimiter::new(Duration::from_millis(1));
        limiter.hit().await;
        limiter.back_off(Duration::from_millis(60)).await;

        let start = Instant::now();
        limiter.hit().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn back_off_never_shortens_a_pending_wait() {
        let limiter = RateLimiter::new(Duration::from_millis(80));
        limiter.hit().await;
        limiter.back_off(Duration::from_millis(1)).await;

        let start = Instant::now();
        limiter.hit().await;
        assert!(start.elapsed() >= Duration::from_millis(60));
    }
}
