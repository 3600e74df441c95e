//! Attempt countdown.
//!
//! Remaining time is always recomputed from elapsed wall time, never by
//! decrementing a counter, so a late or skipped tick cannot make the clock
//! drift. [`Countdown`] is the pure state machine; [`spawn_countdown`] drives
//! it from a tokio interval against the attempt's start time.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Refresh period of the display clock.
pub const DEFAULT_TICK: Duration = Duration::from_millis(250);

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running { remaining: Duration },
    /// The limit was reached on this tick. Reported once.
    Expired,
    /// Already expired or cancelled.
    Idle,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    limit: Duration,
    finished: bool,
}

impl Countdown {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            finished: false,
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Advance to `elapsed` since the start.
    pub fn tick(&mut self, elapsed: Duration) -> Tick {
        if self.finished {
            return Tick::Idle;
        }
        match self.limit.checked_sub(elapsed) {
            Some(remaining) if !remaining.is_zero() => Tick::Running { remaining },
            _ => {
                self.finished = true;
                Tick::Expired
            }
        }
    }

    /// Stop without expiring; later ticks are `Idle`.
    pub fn cancel(&mut self) {
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Wall time between `started_at` and `now`. A start in the future counts as zero.
pub fn wall_elapsed(started_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - started_at).to_std().unwrap_or(Duration::ZERO)
}

/// Event sent by a spawned countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    Tick { remaining: Duration },
    Expired,
}

/// Run a countdown of `limit` measured from `started_at`, emitting an event every `period`.
///
/// Each tick reads the system clock, so time the process spent suspended
/// still counts. An attempt already past its limit expires on the first tick.
/// Ticks are dropped when the receiver lags behind; `Expired` is always
/// delivered and ends the task.
pub fn spawn_countdown(started_at: DateTime<Utc>, limit: Duration, period: Duration) -> CountdownHandle {
    spawn_with_clock(limit, period, move || wall_elapsed(started_at, Utc::now()))
}

fn spawn_with_clock<F>(limit: Duration, period: Duration, elapsed: F) -> CountdownHandle
where
    F: Fn() -> Duration + Send + 'static,
{
    let (tx, rx) = mpsc::channel(8);

    let task = tokio::spawn(async move {
        let mut countdown = Countdown::new(limit);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            match countdown.tick(elapsed()) {
                Tick::Running { remaining } => {
                    if let Err(mpsc::error::TrySendError::Closed(_)) =
                        tx.try_send(CountdownEvent::Tick { remaining })
                    {
                        break;
                    }
                }
                Tick::Expired => {
                    tracing::debug!(limit_secs = limit.as_secs(), "countdown expired");
                    let _ = tx.send(CountdownEvent::Expired).await;
                    break;
                }
                Tick::Idle => break,
            }
        }
    });

    CountdownHandle { rx, task }
}

/// Receiving end of a spawned countdown. Dropping it stops the timer.
#[derive(Debug)]
pub struct CountdownHandle {
    rx: mpsc::Receiver<CountdownEvent>,
    task: JoinHandle<()>,
}

impl CountdownHandle {
    /// The next event, or `None` once the countdown has ended.
    pub async fn next_event(&mut self) -> Option<CountdownEvent> {
        self.rx.recv().await
    }

    pub fn cancel(&mut self) {
        self.task.abort();
        self.rx.close();
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
