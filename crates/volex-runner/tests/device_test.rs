//! End-to-end tests: a bridge on the simulated air, driven through its serial
//! port, talking to simulated peers.

use std::io::{BufRead, BufReader, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::{Duration, Instant};

use serial_test::serial;
use volex_bridge::{Bridge, BridgeConfig, ManualClock, MemorySerial, PeerRole, SystemClock};
use volex_protocol::{DeviceLine, LineCodec, MacAddress, SendCommand};
use volex_runner::{
    RunnerError, SimAir, SimPeer, SimRadio, Supervisor, SupervisorConfig, UartServer,
};

const DEVICE: MacAddress = MacAddress::new([0x5C, 0xCF, 0x7F, 0x00, 0x00, 0x01]);
const PEER: MacAddress = MacAddress::new([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);

type SimBridge = Bridge<MemorySerial, SimRadio, ManualClock>;

fn sim_bridge(air: &SimAir) -> SimBridge {
    let mut bridge = Bridge::new(
        BridgeConfig::default(),
        MemorySerial::new(),
        SimRadio::new(air.clone(), DEVICE),
        ManualClock::new(),
    );
    bridge.boot().expect("boot should succeed");
    bridge.serial_mut().take_lines();
    bridge
}

/// Poll until `pred` holds for the collected output lines, or time out.
fn poll_until(bridge: &mut SimBridge, pred: impl Fn(&[DeviceLine]) -> bool) -> Vec<DeviceLine> {
    let deadline = Instant::now() + Duration::from_secs(3);
    let mut lines = Vec::new();
    while Instant::now() < deadline {
        bridge.poll();
        lines.extend(bridge.serial_mut().take_lines().iter().map(|l| DeviceLine::parse(l)));
        if pred(&lines) {
            return lines;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("timed out; got {:?}", lines);
}

// ============================================================================
// Simulated Air Tests
// ============================================================================

#[test]
fn test_command_round_trip_through_peer() {
    let air = SimAir::new();
    let _peer = SimPeer::spawn(&air, PEER).unwrap();
    let mut bridge = sim_bridge(&air);

    let cmd = SendCommand::new(PEER, "hello");
    bridge.serial_mut().inject(&LineCodec::encode_host_line(&cmd.encode()));

    let lines = poll_until(&mut bridge, |lines| {
        lines.iter().any(|l| matches!(l, DeviceLine::Relay { .. }))
            && lines.iter().any(|l| matches!(l, DeviceLine::Log(t) if t.starts_with("Delivery")))
    });

    assert!(lines.contains(&DeviceLine::Log(
        "Got command: [cmd]11:22:33:44:55:66|hello".to_string()
    )));
    assert!(lines.contains(&DeviceLine::Log("Delivery Success".to_string())));
    assert!(lines.contains(&DeviceLine::Relay {
        from: PEER,
        payload: "hello".to_string()
    }));

    // The transient peer entry is gone after the send.
    assert!(bridge.radio().peers().is_empty());
    assert_eq!(bridge.radio().frames_sent(), 1);
}

#[test]
fn test_command_to_absent_peer_reports_failure() {
    let air = SimAir::new();
    let mut bridge = sim_bridge(&air);

    bridge
        .serial_mut()
        .inject(b"[cmd]11:22:33:44:55:66|anyone?\n");

    let lines = poll_until(&mut bridge, |lines| {
        lines.iter().any(|l| matches!(l, DeviceLine::Log(t) if t.starts_with("Delivery")))
    });
    assert!(lines.contains(&DeviceLine::Log("Delivery Fail".to_string())));
    assert!(!lines.iter().any(|l| matches!(l, DeviceLine::Relay { .. })));
}

#[test]
fn test_untagged_frame_from_air_is_logged() {
    let air = SimAir::new();
    let mut bridge = sim_bridge(&air);

    assert!(air.transmit(PEER, DEVICE, b"who's there\0"));

    let lines = poll_until(&mut bridge, |lines| !lines.is_empty());
    assert_eq!(
        lines,
        vec![DeviceLine::Log("Invalid request: who's there".to_string())]
    );
}

#[test]
fn test_malformed_commands_never_reach_air() {
    let air = SimAir::new();
    let (peer_tx, peer_rx) = volex_bridge::event_channel();
    air.join(PEER, peer_tx);
    let mut bridge = sim_bridge(&air);

    bridge
        .serial_mut()
        .inject(b"notacmd\n[cmd]noseparator\n[cmd]11:22:33:44:55|x\n");
    bridge.poll();

    assert!(peer_rx.try_recv().is_err());
    assert_eq!(bridge.radio().frames_sent(), 0);
    assert_eq!(bridge.stats().commands_rejected, 3);
}

// ============================================================================
// Supervisor Tests
// ============================================================================

#[test]
fn test_supervisor_restarts_until_radio_is_up() {
    let air = SimAir::new();
    let radio = SimRadio::new(air.clone(), DEVICE).with_init_failures(2);
    let bridge = Bridge::new(BridgeConfig::default(), MemorySerial::new(), radio, ManualClock::new());
    let mut supervisor = Supervisor::new(
        bridge,
        SupervisorConfig {
            restart_delay: Duration::from_millis(1),
            ..Default::default()
        },
    );

    let running = AtomicBool::new(true);
    assert!(supervisor.boot(&running).unwrap());
    assert_eq!(supervisor.restarts(), 2);
    assert!(air.is_on_air(DEVICE));
    assert_eq!(supervisor.bridge().radio().role(), Some(PeerRole::Combo));

    let lines = supervisor.bridge_mut().serial_mut().take_lines();
    let errors = lines
        .iter()
        .filter(|l| *l == "[log]Error initializing ESP-NOW.")
        .count();
    assert_eq!(errors, 2);
}

#[test]
fn test_supervisor_restart_limit() {
    let radio = SimRadio::new(SimAir::new(), DEVICE).with_init_failures(10);
    let bridge = Bridge::new(BridgeConfig::default(), MemorySerial::new(), radio, ManualClock::new());
    let mut supervisor = Supervisor::new(
        bridge,
        SupervisorConfig {
            restart_delay: Duration::from_millis(1),
            max_restarts: Some(3),
            ..Default::default()
        },
    );

    let running = AtomicBool::new(true);
    let err = supervisor.boot(&running).unwrap_err();
    assert!(matches!(err, RunnerError::RestartLimit(3)));
}

// ============================================================================
// TCP UART Tests
// ============================================================================

#[test]
#[serial]
fn test_uart_over_tcp() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();
    let bind = SocketAddr::from((Ipv4Addr::LOCALHOST, 0));
    let (uart, local_addr) = UartServer::start_blocking(runtime.handle(), bind).unwrap();

    let air = SimAir::new();
    let _peer = SimPeer::spawn(&air, PEER).unwrap();
    let mut bridge = Bridge::new(
        BridgeConfig::default(),
        uart,
        SimRadio::new(air.clone(), DEVICE),
        SystemClock::new(),
    );
    bridge.boot().unwrap();

    let mut client = TcpStream::connect(local_addr).unwrap();
    client.set_read_timeout(Some(Duration::from_millis(20))).unwrap();

    // Wait for the server to register the client before sending.
    let deadline = Instant::now() + Duration::from_secs(3);
    while !bridge.serial().is_client_connected() {
        assert!(Instant::now() < deadline, "client never registered");
        thread::sleep(Duration::from_millis(5));
    }

    client.write_all(b"[cmd]11:22:33:44:55:66|over tcp\n").unwrap();

    let mut reader = BufReader::new(client);
    let mut relay = None;
    // Partial reads stay in `line` across timeouts.
    let mut line = String::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    while relay.is_none() && Instant::now() < deadline {
        bridge.poll();
        let _ = reader.read_line(&mut line);
        if line.ends_with('\n') {
            if let DeviceLine::Relay { from, payload } = DeviceLine::parse(&line) {
                relay = Some((from, payload));
            }
            line.clear();
        }
    }

    assert_eq!(relay, Some((PEER, "over tcp".to_string())));
}
