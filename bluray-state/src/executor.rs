//! Single-flight command execution
//!
//! A command is one device action followed by a bounded wait for the
//! player to report the state the command should lead to. Only one such
//! sequence runs per device; a command issued while another is converging
//! is dropped and reported as [`ConvergenceOutcome::Superseded`].

use std::fmt;
use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::model::PlaybackState;
use crate::Result;

/// The state a command is expected to produce
#[derive(Clone, Copy)]
pub enum StateTarget {
    Fixed(PlaybackState),
    /// Derived from the state observed when the command is dispatched
    Computed(fn(PlaybackState) -> PlaybackState),
}

impl StateTarget {
    /// Target of the power button: on when off, off otherwise
    pub fn power_toggle() -> Self {
        StateTarget::Computed(toggle_power_target)
    }

    pub fn resolve(&self, current: PlaybackState) -> PlaybackState {
        match self {
            StateTarget::Fixed(state) => *state,
            StateTarget::Computed(compute) => compute(current),
        }
    }
}

impl From<PlaybackState> for StateTarget {
    fn from(state: PlaybackState) -> Self {
        StateTarget::Fixed(state)
    }
}

impl fmt::Debug for StateTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateTarget::Fixed(state) => f.debug_tuple("Fixed").field(state).finish(),
            StateTarget::Computed(_) => f.write_str("Computed"),
        }
    }
}

pub fn toggle_power_target(current: PlaybackState) -> PlaybackState {
    if current.is_off() {
        PlaybackState::Idle
    } else {
        PlaybackState::Off
    }
}

/// How a command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceOutcome {
    /// The player reached the expected state after `attempts` refreshes
    Converged { state: PlaybackState, attempts: u32 },
    /// The player never reported the expected state
    TimedOut {
        expected: PlaybackState,
        last_observed: PlaybackState,
    },
    /// Another command was converging; nothing was sent
    Superseded,
}

impl ConvergenceOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, ConvergenceOutcome::Converged { .. })
    }
}

/// Marks a device as having a command in flight
#[derive(Debug, Default)]
pub struct BusyFlag {
    busy: Mutex<bool>,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag, or `None` if it is already set
    pub fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        let mut busy = self.busy.lock();
        if *busy {
            return None;
        }
        *busy = true;
        Some(BusyGuard { flag: self })
    }

    pub fn is_busy(&self) -> bool {
        *self.busy.lock()
    }
}

/// Clears the busy flag when dropped
#[must_use]
pub struct BusyGuard<'a> {
    flag: &'a BusyFlag,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.flag.busy.lock() = false;
    }
}

/// Refresh until `expected` is observed or `attempts` run out
///
/// Sleeps `delay` between attempts but not after the last one.
pub(crate) async fn converge<F, Fut>(
    expected: PlaybackState,
    attempts: u32,
    delay: Duration,
    mut observe: F,
) -> Result<ConvergenceOutcome>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PlaybackState>>,
{
    let mut last_observed = PlaybackState::default();

    for attempt in 1..=attempts {
        last_observed = observe().await?;
        if last_observed == expected {
            debug!("Reached {} after {} attempt(s)", expected, attempt);
            return Ok(ConvergenceOutcome::Converged {
                state: expected,
                attempts: attempt,
            });
        }

        debug!(
            "Attempt {}/{}: waiting for {}, player reports {}",
            attempt, attempts, expected, last_observed
        );
        if attempt < attempts {
            tokio::time::sleep(delay).await;
        }
    }

    Ok(ConvergenceOutcome::TimedOut {
        expected,
        last_observed,
    })
}
