//! Simulated ESP-NOW medium.
//!
//! [`SimAir`] is a shared registry of stations keyed by hardware address. A
//! station receives frames as [`RadioEvent::Received`] on its notification
//! channel. [`SimRadio`] is the bridge's radio adapter on this medium, and
//! [`SimPeer`] is a remote node that answers every frame with a request.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};
use volex_bridge::{
    event_channel, DeliveryStatus, PeerRole, Radio, RadioError, RadioEvent, RadioEventSender,
};
use volex_protocol::constants::MAX_RADIO_PAYLOAD;
use volex_protocol::{nul_terminated_text, InboundRequest, MacAddress};

use crate::error::RunnerResult;

/// Size of the radio peer table.
pub const MAX_PEERS: usize = 20;

/// How often a peer thread checks for shutdown.
const PEER_POLL_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// Air
// ============================================================================

/// The shared medium. Clones refer to the same air.
#[derive(Debug, Clone, Default)]
pub struct SimAir {
    stations: Arc<Mutex<HashMap<MacAddress, RadioEventSender>>>,
}

impl SimAir {
    /// Create an empty medium.
    pub fn new() -> Self {
        SimAir::default()
    }

    /// Put a station on the air, replacing any previous one at that address.
    pub fn join(&self, addr: MacAddress, events: RadioEventSender) {
        self.stations.lock().insert(addr, events);
    }

    /// Take a station off the air.
    pub fn leave(&self, addr: MacAddress) {
        self.stations.lock().remove(&addr);
    }

    /// Check if a station is listening at `addr`.
    pub fn is_on_air(&self, addr: MacAddress) -> bool {
        self.stations.lock().contains_key(&addr)
    }

    /// Deliver a frame. Returns `true` if a station at `to` took it.
    pub fn transmit(&self, from: MacAddress, to: MacAddress, data: &[u8]) -> bool {
        let station = self.stations.lock().get(&to).cloned();
        match station {
            Some(events) => {
                trace!("air: {} -> {} ({} bytes)", from, to, data.len());
                events
                    .send(RadioEvent::Received {
                        from,
                        data: data.to_vec(),
                    })
                    .is_ok()
            }
            None => false,
        }
    }
}

// ============================================================================
// Radio Adapter
// ============================================================================

/// The bridge's radio on the simulated air.
#[derive(Debug)]
pub struct SimRadio {
    address: MacAddress,
    air: SimAir,
    peers: Vec<MacAddress>,
    events: Option<RadioEventSender>,
    initialized: bool,
    role: Option<PeerRole>,
    /// Remaining forced init failures.
    init_failures: u32,
    /// Probability that a frame is lost in flight.
    loss: f64,
    rng: ChaCha8Rng,
    frames_sent: u64,
}

impl SimRadio {
    /// Create a radio at `address`. It joins the air once events are registered.
    pub fn new(air: SimAir, address: MacAddress) -> Self {
        SimRadio {
            address,
            air,
            peers: Vec::new(),
            events: None,
            initialized: false,
            role: None,
            init_failures: 0,
            loss: 0.0,
            rng: ChaCha8Rng::seed_from_u64(0),
            frames_sent: 0,
        }
    }

    /// Drop frames with probability `loss` (clamped to `0.0..=1.0`), drawn from
    /// a generator seeded with `seed`.
    pub fn with_loss(mut self, loss: f64, seed: u64) -> Self {
        self.loss = loss.clamp(0.0, 1.0);
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    /// Fail the next `count` calls to [`Radio::init`].
    pub fn with_init_failures(mut self, count: u32) -> Self {
        self.init_failures = count;
        self
    }

    /// Current peer table.
    pub fn peers(&self) -> &[MacAddress] {
        &self.peers
    }

    /// Role set by the device, if any.
    pub fn role(&self) -> Option<PeerRole> {
        self.role
    }

    /// Number of frames accepted for transmission.
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    fn ensure_initialized(&self) -> Result<(), RadioError> {
        if self.initialized {
            Ok(())
        } else {
            Err(RadioError::NotInitialized)
        }
    }
}

impl Radio for SimRadio {
    fn init(&mut self) -> Result<(), RadioError> {
        if self.init_failures > 0 {
            self.init_failures -= 1;
            debug!("radio {}: forced init failure ({} left)", self.address, self.init_failures);
            return Err(RadioError::InitFailed(-1));
        }
        self.initialized = true;
        self.peers.clear();
        Ok(())
    }

    fn set_self_role(&mut self, role: PeerRole) -> Result<(), RadioError> {
        self.ensure_initialized()?;
        self.role = Some(role);
        Ok(())
    }

    fn register_events(&mut self, events: RadioEventSender) {
        self.air.join(self.address, events.clone());
        self.events = Some(events);
    }

    fn add_peer(&mut self, addr: MacAddress, _role: PeerRole, _channel: u8) -> Result<(), RadioError> {
        self.ensure_initialized()?;
        if self.peers.contains(&addr) {
            return Ok(());
        }
        if self.peers.len() >= MAX_PEERS {
            return Err(RadioError::PeerTableFull);
        }
        self.peers.push(addr);
        Ok(())
    }

    fn send(&mut self, addr: MacAddress, data: &[u8]) -> Result<(), RadioError> {
        self.ensure_initialized()?;
        if !self.peers.contains(&addr) {
            return Err(RadioError::PeerNotFound(addr));
        }
        if data.len() > MAX_RADIO_PAYLOAD {
            return Err(RadioError::SendFailed(format!(
                "payload of {} bytes exceeds {}",
                data.len(),
                MAX_RADIO_PAYLOAD
            )));
        }

        self.frames_sent += 1;
        let lost = self.loss > 0.0 && self.rng.gen_bool(self.loss);
        let delivered = !lost && self.air.transmit(self.address, addr, data);
        let status = if delivered {
            DeliveryStatus::Success
        } else {
            DeliveryStatus::Fail
        };
        debug!("radio {}: send to {} -> {:?}", self.address, addr, status);

        if let Some(events) = &self.events {
            let _ = events.send(RadioEvent::DeliveryStatus { to: addr, status });
        }
        Ok(())
    }

    fn remove_peer(&mut self, addr: MacAddress) -> Result<(), RadioError> {
        self.ensure_initialized()?;
        match self.peers.iter().position(|p| *p == addr) {
            Some(idx) => {
                self.peers.remove(idx);
                Ok(())
            }
            None => Err(RadioError::PeerNotFound(addr)),
        }
    }
}

impl Drop for SimRadio {
    fn drop(&mut self) {
        if self.events.is_some() {
            self.air.leave(self.address);
        }
    }
}

// ============================================================================
// Remote Peer
// ============================================================================

/// A remote node that answers each frame it receives with
/// `[volex-conn]<frame text>` to the sender.
pub struct SimPeer {
    address: MacAddress,
    air: SimAir,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SimPeer {
    /// Put a peer on the air at `address` and start its thread.
    pub fn spawn(air: &SimAir, address: MacAddress) -> RunnerResult<Self> {
        let (events_tx, events_rx) = event_channel();
        air.join(address, events_tx);

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();
        let thread_air = air.clone();
        let handle = thread::Builder::new()
            .name(format!("peer-{}", address))
            .spawn(move || loop {
                if thread_stop.load(Ordering::Relaxed) {
                    break;
                }
                match events_rx.recv_timeout(PEER_POLL_INTERVAL) {
                    Ok(RadioEvent::Received { from, data }) => {
                        let text = nul_terminated_text(&data);
                        debug!("peer {}: got {:?} from {}", address, text, from);
                        let reply = InboundRequest::encode_frame(&text);
                        thread_air.transmit(address, from, &reply);
                    }
                    Ok(RadioEvent::DeliveryStatus { .. }) => {}
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        Ok(SimPeer {
            address,
            air: air.clone(),
            stop,
            handle: Some(handle),
        })
    }

    /// Address of this peer.
    pub fn address(&self) -> MacAddress {
        self.address
    }

    /// Take the peer off the air and stop its thread.
    pub fn shutdown(&mut self) {
        self.air.leave(self.address);
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SimPeer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
