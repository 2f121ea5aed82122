//! Periodic refresh timer for live map subscriptions.
//!
//! A live map re-reads the game snapshot and pushes a fresh view on a
//! fixed period. When a refresh fires late (the connection was busy
//! sending, the runtime was starved), missed periods are skipped: the
//! next refresh is scheduled from *now*, never back-to-back.

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Refresh timing for one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Time between refreshes. `Duration::ZERO` = manual mode: the
    /// scheduler never fires and views are only rebuilt on request.
    pub period: Duration,

    /// Random delay (0..jitter) added to the *first* refresh, so that
    /// viewers who opened the map at the same moment don't all hit the
    /// snapshot file in the same instant.
    pub initial_jitter: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            period: Self::DEFAULT_PERIOD,
            initial_jitter: Duration::from_secs(2),
        }
    }
}

impl RefreshConfig {
    /// The map page refreshes every 30 seconds.
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(30);

    /// Shortest non-manual period accepted.
    pub const MIN_PERIOD: Duration = Duration::from_secs(1);

    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            ..Default::default()
        }
    }

    /// Manual mode: refresh only on request.
    pub fn manual() -> Self {
        Self {
            period: Duration::ZERO,
            initial_jitter: Duration::ZERO,
        }
    }

    /// Clamp out-of-range values.
    ///
    /// - a non-zero `period` below [`Self::MIN_PERIOD`] is raised to it;
    /// - `initial_jitter` is capped at `period`.
    pub fn validated(mut self) -> Self {
        if !self.period.is_zero() && self.period < Self::MIN_PERIOD {
            warn!(
                period_ms = self.period.as_millis() as u64,
                min_ms = Self::MIN_PERIOD.as_millis() as u64,
                "refresh period below minimum, clamping"
            );
            self.period = Self::MIN_PERIOD;
        }
        if self.initial_jitter > self.period {
            self.initial_jitter = self.period;
        }
        self
    }

    pub fn is_manual(&self) -> bool {
        self.period.is_zero()
    }
}

// ---------------------------------------------------------------------------
// Refresh info
// ---------------------------------------------------------------------------

/// Returned by [`RefreshScheduler::wait_for_refresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshInfo {
    /// Monotonically increasing refresh number (starts at 1).
    pub refresh: u64,
    /// Whole periods that passed unnoticed before this refresh fired.
    pub missed: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Drives the refresh loop of a single subscription.
#[derive(Debug)]
pub struct RefreshScheduler {
    config: RefreshConfig,
    count: u64,
    next: Option<Instant>,
    paused: bool,
}

impl RefreshScheduler {
    pub fn new(config: RefreshConfig) -> Self {
        let config = config.validated();

        let next = (!config.is_manual()).then(|| {
            let jitter = if config.initial_jitter.is_zero() {
                Duration::ZERO
            } else {
                let max = config.initial_jitter.as_millis() as u64;
                Duration::from_millis(rand::rng().random_range(0..max.max(1)))
            };
            Instant::now() + config.period + jitter
        });

        if config.is_manual() {
            debug!("refresh scheduler created in manual mode");
        } else {
            debug!(
                period_s = config.period.as_secs_f64(),
                "refresh scheduler created"
            );
        }

        Self {
            config,
            count: 0,
            next,
            paused: false,
        }
    }

    pub fn with_period(period: Duration) -> Self {
        Self::new(RefreshConfig::with_period(period))
    }

    /// Wait until the next refresh is due.
    ///
    /// In manual mode or while paused this future never resolves, which
    /// keeps it harmless as a `tokio::select!` branch.
    pub async fn wait_for_refresh(&mut self) -> RefreshInfo {
        let next = match self.next {
            Some(next) if !self.paused => next,
            _ => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        time::sleep_until(next).await;

        let now = Instant::now();
        let period = self.config.period;
        let late_by = now.saturating_duration_since(next);
        let missed = (late_by.as_millis() / period.as_millis().max(1)) as u64;
        if missed > 0 {
            warn!(
                refresh = self.count + 1,
                missed,
                "refresh fired late, skipping ahead"
            );
        }

        self.count += 1;
        self.next = Some(now + period);

        trace!(refresh = self.count, "refresh due");

        RefreshInfo {
            refresh: self.count,
            missed,
        }
    }

    /// Push the next refresh one full period past now.
    ///
    /// Call after serving an on-demand refresh so the periodic one does
    /// not follow right behind it. No-op in manual mode.
    pub fn reset(&mut self) {
        if self.config.is_manual() {
            return;
        }
        self.next = Some(Instant::now() + self.config.period);
        trace!(refresh = self.count, "refresh timer reset");
    }

    /// Stop firing. [`wait_for_refresh`](Self::wait_for_refresh) pends
    /// until [`resume`](Self::resume).
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(refresh = self.count, "refresh scheduler paused");
        }
    }

    /// Resume firing. The next refresh is one full period from now.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            if !self.config.is_manual() {
                self.next = Some(Instant::now() + self.config.period);
            }
            debug!(refresh = self.count, "refresh scheduler resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_manual(&self) -> bool {
        self.config.is_manual()
    }

    /// Refreshes fired so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn period(&self) -> Duration {
        self.config.period
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }
}
