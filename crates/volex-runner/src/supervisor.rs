//! Device supervisor: boot, restart on fatal init failure, main loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{error, info};
use volex_bridge::{Bridge, Clock, Radio, Serial};

use crate::error::{RunnerError, RunnerResult};

/// Supervisor settings.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Pause before restarting after a failed boot.
    pub restart_delay: Duration,
    /// Pause between main-loop iterations.
    pub poll_interval: Duration,
    /// Give up after this many restarts. `None` restarts forever, like the device.
    pub max_restarts: Option<u32>,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        SupervisorConfig {
            restart_delay: Duration::from_millis(1000),
            poll_interval: Duration::from_millis(1),
            max_restarts: None,
        }
    }
}

/// Runs one bridge the way the device would.
pub struct Supervisor<S, R, C> {
    bridge: Bridge<S, R, C>,
    config: SupervisorConfig,
    restarts: u32,
}

impl<S: Serial, R: Radio, C: Clock> Supervisor<S, R, C> {
    /// Create a supervisor for a bridge that has not been booted yet.
    pub fn new(bridge: Bridge<S, R, C>, config: SupervisorConfig) -> Self {
        Supervisor {
            bridge,
            config,
            restarts: 0,
        }
    }

    /// Boot the bridge, restarting it until the radio comes up.
    ///
    /// Returns `Ok(false)` if `running` was cleared before the boot succeeded.
    pub fn boot(&mut self, running: &AtomicBool) -> RunnerResult<bool> {
        loop {
            match self.bridge.boot() {
                Ok(()) => {
                    info!("device up after {} restarts", self.restarts);
                    return Ok(true);
                }
                Err(e) => {
                    error!("boot failed: {}; restarting", e);
                    if let Some(max) = self.config.max_restarts {
                        if self.restarts >= max {
                            return Err(RunnerError::RestartLimit(self.restarts));
                        }
                    }
                    self.restarts += 1;
                    thread::sleep(self.config.restart_delay);
                    if !running.load(Ordering::SeqCst) {
                        return Ok(false);
                    }
                }
            }
        }
    }

    /// Boot, then run the main loop until `running` is cleared.
    pub fn run(&mut self, running: &AtomicBool) -> RunnerResult<()> {
        if !self.boot(running)? {
            return Ok(());
        }

        while running.load(Ordering::SeqCst) {
            self.bridge.poll();
            thread::sleep(self.config.poll_interval);
        }

        let stats = self.bridge.stats();
        info!(
            "stopped: sent={} rejected={} relayed={} delivered={}/{} heartbeats={}",
            stats.commands_sent,
            stats.commands_rejected,
            stats.requests_relayed,
            stats.deliveries_succeeded,
            stats.deliveries_succeeded + stats.deliveries_failed,
            stats.heartbeats
        );
        Ok(())
    }

    /// Number of restarts so far.
    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    /// Borrow the bridge.
    pub fn bridge(&self) -> &Bridge<S, R, C> {
        &self.bridge
    }

    /// Mutably borrow the bridge.
    pub fn bridge_mut(&mut self) -> &mut Bridge<S, R, C> {
        &mut self.bridge
    }
}
