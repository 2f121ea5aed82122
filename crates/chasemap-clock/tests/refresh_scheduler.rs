//! Integration tests for the refresh scheduler.
//!
//! Tokio time is paused and auto-advanced, so a 30 s period elapses
//! instantly and deterministically.

use std::time::Duration;

use chasemap_clock::{RefreshConfig, RefreshScheduler};
use tokio::time::Instant;

// =========================================================================
// Helpers
// =========================================================================

fn no_jitter(period_secs: u64) -> RefreshConfig {
    RefreshConfig {
        period: Duration::from_secs(period_secs),
        initial_jitter: Duration::ZERO,
    }
}

// =========================================================================
// Creation
// =========================================================================

#[test]
fn test_scheduler_initial_state() {
    let s = RefreshScheduler::new(RefreshConfig::default());
    assert_eq!(s.count(), 0);
    assert_eq!(s.period(), Duration::from_secs(30));
    assert!(!s.is_manual());
    assert!(!s.is_paused());
}

#[test]
fn test_zero_period_is_manual() {
    let s = RefreshScheduler::with_period(Duration::ZERO);
    assert!(s.is_manual());
}

// =========================================================================
// Firing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_refreshes_fire_once_per_period() {
    let start = Instant::now();
    let mut s = RefreshScheduler::new(no_jitter(30));

    let first = s.wait_for_refresh().await;
    assert_eq!(first.refresh, 1);
    assert_eq!(first.missed, 0);
    assert_eq!(start.elapsed(), Duration::from_secs(30));

    let second = s.wait_for_refresh().await;
    assert_eq!(second.refresh, 2);
    assert_eq!(start.elapsed(), Duration::from_secs(60));
    assert_eq!(s.count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_first_refresh_within_jitter_window() {
    let start = Instant::now();
    let mut s = RefreshScheduler::new(RefreshConfig {
        period: Duration::from_secs(10),
        initial_jitter: Duration::from_secs(2),
    });
    s.wait_for_refresh().await;
    let waited = start.elapsed();
    assert!(waited >= Duration::from_secs(10), "{waited:?}");
    assert!(waited < Duration::from_secs(12), "{waited:?}");
}

#[tokio::test(start_paused = true)]
async fn test_late_refresh_skips_missed_periods() {
    let start = Instant::now();
    let mut s = RefreshScheduler::new(no_jitter(30));

    // Nobody polled for 95 s: deadline was at 30 s, two more periods passed.
    tokio::time::advance(Duration::from_secs(95)).await;
    let info = s.wait_for_refresh().await;
    assert_eq!(info.refresh, 1);
    assert_eq!(info.missed, 2);

    // Next one is a full period from the late firing, not from 30 s.
    s.wait_for_refresh().await;
    assert_eq!(start.elapsed(), Duration::from_secs(125));
}

#[tokio::test(start_paused = true)]
async fn test_reset_postpones_next_refresh() {
    let start = Instant::now();
    let mut s = RefreshScheduler::new(no_jitter(30));

    tokio::time::advance(Duration::from_secs(20)).await;
    s.reset();

    s.wait_for_refresh().await;
    assert_eq!(start.elapsed(), Duration::from_secs(50));
}

// =========================================================================
// Manual mode and pause
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_manual_mode_never_fires() {
    let mut s = RefreshScheduler::new(RefreshConfig::manual());
    let result = tokio::time::timeout(Duration::from_secs(3600), s.wait_for_refresh()).await;
    assert!(result.is_err(), "manual scheduler should pend forever");
    assert_eq!(s.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_paused_scheduler_pends_then_resumes() {
    let mut s = RefreshScheduler::new(no_jitter(30));
    s.pause();
    assert!(s.is_paused());

    let result = tokio::time::timeout(Duration::from_secs(300), s.wait_for_refresh()).await;
    assert!(result.is_err(), "paused scheduler should pend");

    let resumed_at = Instant::now();
    s.resume();
    let info = s.wait_for_refresh().await;
    assert_eq!(info.refresh, 1);
    assert_eq!(resumed_at.elapsed(), Duration::from_secs(30));
}

#[tokio::test(start_paused = true)]
async fn test_pause_and_resume_are_idempotent() {
    let mut s = RefreshScheduler::new(no_jitter(30));
    s.pause();
    s.pause();
    assert!(s.is_paused());
    s.resume();
    s.resume();
    assert!(!s.is_paused());
}
