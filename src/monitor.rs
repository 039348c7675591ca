//! Up/down state tracking and the continuous monitor loop.
use anyhow::Result;
use chrono::{DateTime, Duration as Downtime, Utc};
use colored::Colorize;
use log::debug;
use tokio::time;

use crate::input::Opts;
use crate::probe::Prober;
use crate::report::Report;

/// What changed between the previous observation and the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State unchanged, or first ever observation.
    None,
    /// The target flipped from up to down.
    WentDown,
    /// The target recovered; carries the elapsed downtime.
    CameBackUp {
        /// Time between the down transition and this recovery.
        downtime: Downtime,
    },
}

/// Two-state flip-flop (plus an uninitialized pre-state) fed once per
/// monitor iteration.
///
/// The state is an explicit value owned by the loop that drives it; it is
/// never shared and never global.
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    last_up: Option<bool>,
    down_since: Option<DateTime<Utc>>,
}

impl MonitorState {
    /// Fresh, uninitialized tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the last observation saw the target up. `None` before the
    /// first observation.
    #[must_use]
    pub fn last_up(&self) -> Option<bool> {
        self.last_up
    }

    /// Feeds one observation into the tracker and reports the transition.
    ///
    /// The first observation never emits an event; it only seeds the state
    /// (and `down_since`, when the target starts out down). After that,
    /// up -> down emits [`Transition::WentDown`] and down -> up emits
    /// [`Transition::CameBackUp`] with the accumulated downtime. Repeats of
    /// the same state are silent.
    pub fn observe(&mut self, up: bool, now: DateTime<Utc>) -> Transition {
        let transition = match self.last_up {
            None => {
                if !up {
                    self.down_since = Some(now);
                }
                Transition::None
            }
            Some(true) if !up => {
                self.down_since = Some(now);
                Transition::WentDown
            }
            Some(false) if up => {
                let downtime = self
                    .down_since
                    .take()
                    .map_or_else(Downtime::zero, |since| now - since);
                Transition::CameBackUp { downtime }
            }
            Some(_) => Transition::None,
        };

        self.last_up = Some(up);
        transition
    }
}

/// Probes once, or keeps probing at `opts.interval` seconds when monitor
/// mode is on.
///
/// The loop is single threaded and cooperative: probe, evaluate the
/// transition, report, sleep, repeat. A down target is a valid steady state,
/// so the loop never terminates itself; monitor mode only ends with the
/// process.
pub async fn run(opts: &Opts) -> Result<()> {
    let prober = Prober::new()?;
    let mut state = MonitorState::new();
    let interval = std::time::Duration::from_secs(opts.interval);
    let mut first = true;

    loop {
        let mut result = prober.probe(&opts.target, opts.port, opts.proto).await;

        match state.observe(result.up, result.time) {
            Transition::None if first => {
                if !opts.json {
                    if result.up {
                        println!("{}", "Target is UP".green());
                    } else {
                        println!("{}", "Target is DOWN".red());
                    }
                }
            }
            Transition::None => {}
            Transition::WentDown => {
                if !opts.json {
                    println!("{}", "Target went DOWN".red());
                }
            }
            Transition::CameBackUp { downtime } => {
                let downtime = format!("{}s", downtime.num_seconds());
                if !opts.json {
                    println!(
                        "{}",
                        format!("Target is UP again (downtime: {downtime})").green()
                    );
                }
                result.downtime = Some(downtime);
            }
        }
        first = false;

        println!("{}", result.render(opts.json)?);

        if !opts.monitor {
            break;
        }

        debug!("Sleeping {}s until the next check", opts.interval);
        time::sleep(interval).await;
    }

    Ok(())
}
