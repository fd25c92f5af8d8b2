use std::time::Duration;

/// Spaces consecutive upstream requests by a fixed interval.
///
/// The first call to [`Pacer::ready`] returns immediately; every later call
/// sleeps for the full interval first.
#[derive(Debug, Clone)]
pub struct Pacer {
    interval: Duration,
    primed: bool,
}

impl Pacer {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            primed: false,
        }
    }

    pub async fn ready(&mut self) {
        if self.primed && !self.interval.is_zero() {
            tokio::time::sleep(self.interval).await;
        }
        self.primed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_request_is_not_delayed() {
        let mut pacer = Pacer::new(Duration::from_millis(300));
        let start = tokio::time::Instant::now();

        pacer.ready().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        pacer.ready().await;
        pacer.ready().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(600));
        assert!(elapsed < Duration::from_millis(700));
    }
}
