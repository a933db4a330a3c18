//! Per-question countdown.
//!
//! Every arm, disarm or scheduled advance starts a new generation. Tick
//! sources hold the `TimerToken` they were handed when they were started; a
//! tick carrying an older token belongs to a question the session has
//! already left and is dropped.

/// Seconds allowed per question.
pub const QUESTION_TIME_LIMIT_SECS: u32 = 60;

/// Identifies one generation of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

impl TimerToken {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// No ticks are accepted.
    Idle,
    /// Counting down the current question.
    Counting,
    /// The question timed out; the next tick advances the session.
    AdvancePending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Running { remaining: u32 },
    Expired,
}

#[derive(Debug, Clone)]
pub struct QuestionTimer {
    limit_secs: u32,
    remaining_secs: u32,
    state: TimerState,
    generation: u64,
}

impl Default for QuestionTimer {
    fn default() -> Self {
        Self::new(QUESTION_TIME_LIMIT_SECS)
    }
}

impl QuestionTimer {
    /// A timer with a custom limit. A zero limit is raised to one second.
    #[must_use]
    pub fn new(limit_secs: u32) -> Self {
        let limit_secs = limit_secs.max(1);
        Self {
            limit_secs,
            remaining_secs: limit_secs,
            state: TimerState::Idle,
            generation: 0,
        }
    }

    #[must_use]
    pub fn limit_secs(&self) -> u32 {
        self.limit_secs
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Token of the live generation, or `None` while idle.
    #[must_use]
    pub fn token(&self) -> Option<TimerToken> {
        match self.state {
            TimerState::Idle => None,
            TimerState::Counting | TimerState::AdvancePending => Some(TimerToken(self.generation)),
        }
    }

    #[must_use]
    pub fn accepts(&self, token: TimerToken) -> bool {
        self.token() == Some(token)
    }

    /// Start a fresh full-length countdown, superseding any earlier token.
    pub fn arm(&mut self) -> TimerToken {
        self.generation += 1;
        self.remaining_secs = self.limit_secs;
        self.state = TimerState::Counting;
        TimerToken(self.generation)
    }

    /// Stop accepting ticks. Remaining time is kept for display.
    pub fn disarm(&mut self) {
        self.generation += 1;
        self.state = TimerState::Idle;
    }

    /// After expiry: accept exactly one more tick, which advances the session.
    pub fn schedule_advance(&mut self) -> TimerToken {
        self.generation += 1;
        self.state = TimerState::AdvancePending;
        TimerToken(self.generation)
    }

    /// Count one second down. Only meaningful while `Counting`.
    pub fn countdown(&mut self) -> Countdown {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            Countdown::Expired
        } else {
            Countdown::Running {
                remaining: self.remaining_secs,
            }
        }
    }

    /// Seconds consumed on the current question.
    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.limit_secs - self.remaining_secs
    }
}
