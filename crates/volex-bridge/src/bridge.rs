//! Device context and main loop.

use crossbeam_channel::Receiver;
use thiserror::Error;
use volex_protocol::LineCodec;

use crate::config::BridgeConfig;
use crate::framer::HostLink;
use crate::hal::{Clock, Serial};
use crate::heartbeat::Heartbeat;
use crate::radio::{event_channel, Radio, RadioError, RadioEvent, RadioEventSender};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that stop the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The radio could not be initialized; the device must restart.
    #[error("radio initialization failed: {0}")]
    RadioInit(#[from] RadioError),
}

// ============================================================================
// Statistics
// ============================================================================

/// Counters kept by the bridge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Commands forwarded to the radio.
    pub commands_sent: u32,
    /// Host lines dropped as malformed.
    pub commands_rejected: u32,
    /// Radio requests relayed to the host.
    pub requests_relayed: u32,
    /// Radio frames dropped as untagged.
    pub requests_rejected: u32,
    /// Successful delivery notifications.
    pub deliveries_succeeded: u32,
    /// Failed delivery notifications.
    pub deliveries_failed: u32,
    /// Heartbeat lines written.
    pub heartbeats: u32,
}

// ============================================================================
// Bridge
// ============================================================================

/// The bridge device context.
///
/// Owns the host link, the radio adapter, the clock and the heartbeat state.
/// Call [`Bridge::boot`] once, then [`Bridge::poll`] on every main-loop
/// iteration.
pub struct Bridge<S, R, C> {
    pub(crate) config: BridgeConfig,
    pub(crate) link: HostLink<S>,
    pub(crate) radio: R,
    clock: C,
    heartbeat: Heartbeat,
    codec: LineCodec,
    events_tx: RadioEventSender,
    events_rx: Receiver<RadioEvent>,
    pub(crate) stats: BridgeStats,
    booted: bool,
}

impl<S: Serial, R: Radio, C: Clock> Bridge<S, R, C> {
    /// Create a bridge. Nothing is written or initialized until [`Bridge::boot`].
    pub fn new(config: BridgeConfig, serial: S, radio: R, clock: C) -> Self {
        let (events_tx, events_rx) = event_channel();
        let heartbeat = Heartbeat::new(config.heartbeat_interval_ms, clock.millis());
        Bridge {
            config,
            link: HostLink::new(serial),
            radio,
            clock,
            heartbeat,
            codec: LineCodec::new(),
            events_tx,
            events_rx,
            stats: BridgeStats::default(),
            booted: false,
        }
    }

    /// Run the boot sequence.
    ///
    /// Writes an empty line to the host, initializes the radio, sets the self
    /// role and registers for notifications. If init or the self role fails,
    /// the error line is logged and [`BridgeError::RadioInit`] is returned; the
    /// caller must restart the device, which amounts to calling `boot` again.
    pub fn boot(&mut self) -> Result<(), BridgeError> {
        self.booted = false;
        self.codec.clear();
        while self.events_rx.try_recv().is_ok() {}

        self.link.write_line("");

        if let Err(e) = self
            .radio
            .init()
            .and_then(|()| self.radio.set_self_role(self.config.self_role))
        {
            self.link.log("Error initializing ESP-NOW.");
            log::error!("radio init failed: {}", e);
            return Err(e.into());
        }
        self.radio.register_events(self.events_tx.clone());

        self.heartbeat.reset(self.clock.millis());
        self.booted = true;
        log::info!("bridge booted");
        Ok(())
    }

    /// Run one main-loop iteration.
    ///
    /// Emits a heartbeat when due, handles pending radio notifications, then
    /// dispatches every complete host line received so far.
    pub fn poll(&mut self) {
        if !self.booted {
            return;
        }

        if self.heartbeat.poll(self.clock.millis()) {
            self.link.heartbeat();
            self.stats.heartbeats += 1;
        }

        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_radio_event(event);
        }

        while let Some(data) = self.link.read() {
            self.codec.push(&data);
        }

        while let Some(result) = self.codec.decode_line() {
            match result {
                // Blank lines never get here; see `LineCodec::decode_line`.
                Ok(line) => {
                    // Rejections are logged to the host by the dispatcher.
                    let _ = self.handle_command(&line);
                }
                Err(e) => {
                    self.stats.commands_rejected += 1;
                    self.link.log(&format!("Invalid cmd: {}", e));
                }
            }
        }
    }

    /// Whether [`Bridge::boot`] has completed.
    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Get the configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Get the counters.
    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    /// Borrow the serial port.
    pub fn serial(&self) -> &S {
        self.link.serial()
    }

    /// Mutably borrow the serial port.
    pub fn serial_mut(&mut self) -> &mut S {
        self.link.serial_mut()
    }

    /// Borrow the radio adapter.
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Mutably borrow the radio adapter.
    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    /// Borrow the clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}
