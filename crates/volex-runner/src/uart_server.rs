//! UART TCP Server Module
//!
//! Exposes the bridge's serial port as a TCP socket. Bytes a client writes
//! become serial input of the device; device output is forwarded to the
//! connected client. One client is served at a time, and output produced
//! while no client is connected is dropped, like a serial line with nothing
//! attached.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use volex_bridge::Serial;

/// Capacity of the per-direction chunk queues.
const CHANNEL_CAPACITY: usize = 256;

// ============================================================================
// Handle
// ============================================================================

/// The device side of a UART server: implements [`Serial`] for the bridge.
pub struct UartHandle {
    tx_sender: mpsc::Sender<Vec<u8>>,
    rx_receiver: mpsc::Receiver<Vec<u8>>,
    connected: Arc<AtomicBool>,
}

impl UartHandle {
    /// Check if a TCP client is connected.
    pub fn is_client_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl Serial for UartHandle {
    fn write(&mut self, data: &[u8]) {
        // Only send if a client is actually connected
        if !self.is_client_connected() {
            return;
        }

        // Use try_send to avoid blocking the device loop - drop data if the
        // client is not keeping up
        if let Err(e) = self.tx_sender.try_send(data.to_vec()) {
            match e {
                mpsc::error::TrySendError::Full(_) => {
                    warn!("UART TX buffer full, dropping {} bytes", data.len());
                }
                mpsc::error::TrySendError::Closed(_) => {
                    warn!("UART channel closed");
                }
            }
        }
    }

    fn read(&mut self) -> Option<Vec<u8>> {
        self.rx_receiver.try_recv().ok()
    }
}

// ============================================================================
// Server
// ============================================================================

/// A TCP listener bound to the device UART.
pub struct UartServer;

impl UartServer {
    /// Bind `addr` and start serving. Must be called within a tokio runtime.
    ///
    /// Returns the device-side handle and the bound address (useful with port 0).
    pub async fn start(addr: SocketAddr) -> io::Result<(UartHandle, SocketAddr)> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        let (tx_sender, tx_receiver) = mpsc::channel::<Vec<u8>>(CHANNEL_CAPACITY);
        let (rx_sender, rx_receiver) = mpsc::channel::<Vec<u8>>(CHANNEL_CAPACITY);
        let connected = Arc::new(AtomicBool::new(false));

        let task_connected = connected.clone();
        tokio::spawn(async move {
            if let Err(e) = run_uart_listener(listener, tx_receiver, rx_sender, task_connected).await {
                warn!("UART listener error: {}", e);
            }
        });

        info!("UART listening on {}", local_addr);
        Ok((
            UartHandle {
                tx_sender,
                rx_receiver,
                connected,
            },
            local_addr,
        ))
    }

    /// Synchronous wrapper around [`UartServer::start`] for the device loop.
    pub fn start_blocking(
        runtime: &tokio::runtime::Handle,
        addr: SocketAddr,
    ) -> io::Result<(UartHandle, SocketAddr)> {
        runtime.block_on(Self::start(addr))
    }
}

/// Accept clients one after another.
async fn run_uart_listener(
    listener: TcpListener,
    mut tx_receiver: mpsc::Receiver<Vec<u8>>,
    rx_sender: mpsc::Sender<Vec<u8>>,
    connected: Arc<AtomicBool>,
) -> io::Result<()> {
    loop {
        let (stream, peer_addr) = listener.accept().await?;
        info!("UART client connected from {}", peer_addr);

        // Output queued while nobody was listening is stale.
        while tx_receiver.try_recv().is_ok() {}
        connected.store(true, Ordering::SeqCst);

        let result = handle_uart_connection(stream, &mut tx_receiver, &rx_sender).await;

        connected.store(false, Ordering::SeqCst);
        match result {
            Ok(()) => info!("UART client {} disconnected", peer_addr),
            Err(e) => warn!("UART connection error from {}: {}", peer_addr, e),
        }
    }
}

/// Shuttle bytes between one TCP client and the device.
async fn handle_uart_connection(
    mut stream: TcpStream,
    tx_receiver: &mut mpsc::Receiver<Vec<u8>>,
    rx_sender: &mpsc::Sender<Vec<u8>>,
) -> io::Result<()> {
    let (mut reader, mut writer) = stream.split();
    let mut read_buf = [0u8; 1024];

    loop {
        tokio::select! {
            // Read from TCP client -> device serial input
            result = reader.read(&mut read_buf) => {
                let n = result?;
                if n == 0 {
                    return Ok(());
                }
                debug!("UART rx {} bytes", n);
                if rx_sender.send(read_buf[..n].to_vec()).await.is_err() {
                    // Device side dropped
                    return Ok(());
                }
            }

            // Device serial output -> TCP client
            Some(data) = tx_receiver.recv() => {
                writer.write_all(&data).await?;
                writer.flush().await?;
            }
        }
    }
}
