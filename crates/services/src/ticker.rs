//! One-second tick source for the host loop.

use std::time::Duration;

use quiz_core::timer::TimerToken;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Emits the current timer token once per period.
///
/// The ticker follows the session's token: whenever it changes the interval
/// restarts, so a new question always gets a full first second. With no
/// token, [`Ticker::tick`] never resolves.
#[derive(Debug)]
pub struct Ticker {
    interval: Interval,
    token: Option<TimerToken>,
}

impl Ticker {
    #[must_use]
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            interval,
            token: None,
        }
    }

    #[must_use]
    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    /// Track `token`; restarts the period if it differs from the last one.
    pub fn follow(&mut self, token: Option<TimerToken>) {
        if self.token != token {
            self.token = token;
            self.interval.reset();
        }
    }

    #[must_use]
    pub fn token(&self) -> Option<TimerToken> {
        self.token
    }

    /// Wait for the next period and return the token it belongs to.
    pub async fn tick(&mut self) -> TimerToken {
        match self.token {
            Some(token) => {
                self.interval.tick().await;
                token
            }
            None => std::future::pending().await,
        }
    }
}
