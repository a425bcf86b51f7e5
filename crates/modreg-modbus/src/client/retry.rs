// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Backoff strategies for device connection attempts.

use std::time::Duration;

use rand::Rng;

// =============================================================================
// RetryConfig
// =============================================================================

/// How many connection attempts to make and how long to wait after each.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts (at least 1).
    pub max_attempts: u32,
    /// Delay strategy applied after each failed attempt.
    pub strategy: RetryStrategy,
}

impl RetryConfig {
    /// Creates a configuration with the given attempt count and a 2s fixed delay.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            strategy: RetryStrategy::default(),
        }
    }

    /// Creates a configuration with a fixed delay.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::new(max_attempts).with_strategy(RetryStrategy::Fixed(delay))
    }

    /// Creates a configuration with exponential backoff.
    pub fn exponential(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self::new(max_attempts).with_strategy(RetryStrategy::Exponential(
            ExponentialBackoff::new(initial_delay, max_delay),
        ))
    }

    /// Sets the delay strategy.
    pub fn with_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sum of the delays across all attempts, ignoring jitter.
    pub fn total_backoff(&self) -> Duration {
        (0..self.max_attempts)
            .map(|attempt| self.strategy.base_delay(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(10)
    }
}

// =============================================================================
// RetryStrategy
// =============================================================================

/// Strategy for calculating the delay after a failed attempt.
#[derive(Debug, Clone)]
pub enum RetryStrategy {
    /// Same delay after every attempt.
    Fixed(Duration),
    /// Doubling delay with optional jitter.
    Exponential(ExponentialBackoff),
}

impl RetryStrategy {
    /// Calculates the delay after the given attempt (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(duration) => *duration,
            Self::Exponential(exp) => exp.delay(attempt),
        }
    }

    fn base_delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(duration) => *duration,
            Self::Exponential(exp) => exp.base_delay(attempt),
        }
    }

    /// Creates a fixed delay strategy.
    pub fn fixed(delay: Duration) -> Self {
        Self::Fixed(delay)
    }

    /// Creates an exponential backoff strategy.
    pub fn exponential(initial_delay: Duration, max_delay: Duration) -> Self {
        Self::Exponential(ExponentialBackoff::new(initial_delay, max_delay))
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::Fixed(Duration::from_secs(2))
    }
}

// =============================================================================
// ExponentialBackoff
// =============================================================================

/// Exponential backoff: `initial_delay * 2^attempt`, capped at `max_delay`.
///
/// Jitter spreads reconnecting gateways apart when a PLC comes back.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// Delay after the first failed attempt.
    pub initial_delay: Duration,
    /// Maximum delay cap.
    pub max_delay: Duration,
    /// Jitter factor (0.0 = none, 1.0 = up to 100%).
    pub jitter_factor: f64,
}

impl ExponentialBackoff {
    /// Creates a new exponential backoff without jitter.
    pub fn new(initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            initial_delay,
            max_delay,
            jitter_factor: 0.0,
        }
    }

    /// Sets the jitter factor.
    pub fn with_jitter(mut self, jitter_factor: f64) -> Self {
        self.jitter_factor = if jitter_factor.is_finite() {
            jitter_factor.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    fn base_delay(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.initial_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Calculates the delay after the given attempt.
    pub fn delay(&self, attempt: u32) -> Duration {
        let capped = self.base_delay(attempt);
        if self.jitter_factor <= 0.0 || capped.is_zero() {
            return capped;
        }

        let secs = capped.as_secs_f64();
        let range = secs * self.jitter_factor;
        let jitter = rand::thread_rng().gen_range(-range..=range);
        Duration::from_secs_f64((secs + jitter).max(0.0))
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_secs(30))
    }
}

// =============================================================================
// Tests
// =============================================================================
