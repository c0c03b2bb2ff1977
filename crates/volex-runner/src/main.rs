//! `volex`: run the bridge on a development machine.
//!
//! The device UART is served over TCP and the radio side is a simulated
//! ESP-NOW medium populated with echoing peers.
//!
//! ```text
//! volex --port 7000 --peer 11:22:33:44:55:66
//! printf '[cmd]11:22:33:44:55:66|hello\n' | nc localhost 7000
//! ```

use std::net::{Ipv4Addr, SocketAddr};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use volex_bridge::{Bridge, BridgeConfig, SystemClock};
use volex_protocol::constants::BAUD_RATE;
use volex_protocol::MacAddress;
use volex_runner::{
    RunnerError, RunnerResult, SimAir, SimPeer, SimRadio, Supervisor, SupervisorConfig, UartServer,
};

#[derive(Parser, Debug)]
#[command(name = "volex", version, about = "Volex serial to ESP-NOW bridge (host simulation)")]
struct Args {
    /// TCP port serving the device UART.
    #[arg(short, long, default_value_t = 7000)]
    port: u16,

    /// Hardware address of the bridge radio.
    #[arg(long, default_value = "5C:CF:7F:00:00:01")]
    address: MacAddress,

    /// Add a simulated peer at this address (repeatable).
    #[arg(long = "peer", value_name = "ADDRESS")]
    peers: Vec<MacAddress>,

    /// Probability that a transmitted frame is lost (0.0 to 1.0).
    #[arg(long, default_value_t = 0.0)]
    loss: f64,

    /// Seed for the loss model.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of radio initializations that fail before one succeeds.
    #[arg(long, default_value_t = 0)]
    init_failures: u32,

    /// Delay before restarting after a failed boot (milliseconds).
    #[arg(long, default_value_t = 1000)]
    restart_delay_ms: u64,

    /// Pause between main-loop iterations (milliseconds).
    #[arg(long, default_value_t = 1)]
    poll_interval_ms: u64,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> RunnerResult<()> {
    if !(0.0..=1.0).contains(&args.loss) {
        return Err(RunnerError::InvalidArgument(format!(
            "--loss must be between 0 and 1, got {}",
            args.loss
        )));
    }

    let running = Arc::new(AtomicBool::new(true));
    let handler_running = running.clone();
    ctrlc::set_handler(move || {
        handler_running.store(false, Ordering::SeqCst);
    })?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    let bind = SocketAddr::from((Ipv4Addr::UNSPECIFIED, args.port));
    let (uart, local_addr) = UartServer::start_blocking(runtime.handle(), bind)?;

    let air = SimAir::new();
    let mut peers = Vec::with_capacity(args.peers.len());
    for addr in &args.peers {
        peers.push(SimPeer::spawn(&air, *addr)?);
        info!("simulated peer {}", addr);
    }

    let radio = SimRadio::new(air, args.address)
        .with_loss(args.loss, args.seed)
        .with_init_failures(args.init_failures);
    let bridge = Bridge::new(BridgeConfig::default(), uart, radio, SystemClock::new());

    info!(
        "bridge {} on {} ({} baud nominal), {} peers",
        args.address,
        local_addr,
        BAUD_RATE,
        peers.len()
    );

    let mut supervisor = Supervisor::new(
        bridge,
        SupervisorConfig {
            restart_delay: Duration::from_millis(args.restart_delay_ms),
            poll_interval: Duration::from_millis(args.poll_interval_ms),
            max_restarts: None,
        },
    );
    supervisor.run(&running)?;

    for mut peer in peers {
        peer.shutdown();
    }
    runtime.shutdown_timeout(Duration::from_millis(100));
    Ok(())
}
