//! Common test helpers and utilities for Oscar tests
//!
//! This crate provides:
//! - Condition-based waiting (no hardcoded sleeps)
//! - An in-memory datagram socket for driving a listener deterministically
//! - Message collectors for verifying dispatch

use async_trait::async_trait;
use oscar_core::Message;
use oscar_transport::{DatagramSocket, Result as TransportResult, TransportError};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Default test timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default condition check interval
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_millis(10);

// ============================================================================
// Condition-Based Waiting
// ============================================================================

/// Wait for a condition with timeout - condition-based, not time-based
pub async fn wait_for<F, Fut>(check: F, interval: Duration, max_wait: Duration) -> bool
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = Instant::now();
    while start.elapsed() < max_wait {
        if check().await {
            return true;
        }
        tokio::time::sleep(interval).await;
    }
    false
}

/// Wait for an atomic counter to reach a target value
pub async fn wait_for_count(counter: &AtomicUsize, target: usize, max_wait: Duration) -> bool {
    wait_for(
        || async { counter.load(Ordering::SeqCst) >= target },
        DEFAULT_CHECK_INTERVAL,
        max_wait,
    )
    .await
}

// ============================================================================
// Memory Socket
// ============================================================================

enum Incoming {
    Datagram(Vec<u8>),
    Failure(String),
}

/// In-memory [`DatagramSocket`].
///
/// Tests push datagrams with [`inject`](Self::inject) and the socket hands them
/// out from `recv_from` in order. [`close`](Self::close) makes `recv_from` fail
/// with [`TransportError::Closed`] once the backlog is drained, and
/// [`fail`](Self::fail) queues a one-off receive error. Sent datagrams are
/// recorded for inspection.
pub struct MemorySocket {
    local: SocketAddr,
    peer: SocketAddr,
    tx: parking_lot::Mutex<Option<mpsc::UnboundedSender<Incoming>>>,
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Incoming>>,
    received: AtomicUsize,
    sent: parking_lot::Mutex<Vec<(Vec<u8>, SocketAddr)>>,
}

impl MemorySocket {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            local: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 9000)),
            peer: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 9001)),
            tx: parking_lot::Mutex::new(Some(tx)),
            rx: tokio::sync::Mutex::new(rx),
            received: AtomicUsize::new(0),
            sent: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Create a socket already wrapped for sharing with a listener
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Queue a raw datagram. Returns false once the socket is closed.
    pub fn inject(&self, datagram: impl Into<Vec<u8>>) -> bool {
        self.push(Incoming::Datagram(datagram.into()))
    }

    /// Queue an encoded message
    pub fn inject_message(&self, message: &Message) -> bool {
        self.inject(message.encode().to_vec())
    }

    /// Queue a receive failure
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.push(Incoming::Failure(reason.into()))
    }

    /// Stop accepting datagrams; receivers see `Closed` after the backlog
    pub fn close(&self) {
        self.tx.lock().take();
    }

    /// Number of datagrams handed out by `recv_from`
    pub fn received(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }

    /// Counter behind [`received`](Self::received), for `wait_for_count`
    pub fn received_counter(&self) -> &AtomicUsize {
        &self.received
    }

    /// Datagrams written through `send_to`
    pub fn sent(&self) -> Vec<(Vec<u8>, SocketAddr)> {
        self.sent.lock().clone()
    }

    fn push(&self, item: Incoming) -> bool {
        match self.tx.lock().as_ref() {
            Some(tx) => tx.send(item).is_ok(),
            None => false,
        }
    }
}

impl Default for MemorySocket {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatagramSocket for MemorySocket {
    async fn send_to(&self, data: &[u8], target: SocketAddr) -> TransportResult<usize> {
        self.sent.lock().push((data.to_vec(), target));
        Ok(data.len())
    }

    async fn recv_from(&self, buf: &mut [u8]) -> TransportResult<(usize, SocketAddr)> {
        let next = self.rx.lock().await.recv().await;
        match next {
            Some(Incoming::Datagram(data)) => {
                let len = data.len().min(buf.len());
                buf[..len].copy_from_slice(&data[..len]);
                self.received.fetch_add(1, Ordering::SeqCst);
                Ok((len, self.peer))
            }
            Some(Incoming::Failure(reason)) => Err(TransportError::ReceiveFailed(reason)),
            None => Err(TransportError::Closed),
        }
    }

    fn local_addr(&self) -> TransportResult<SocketAddr> {
        Ok(self.local)
    }
}

// ============================================================================
// Message Collector - for verifying dispatched messages
// ============================================================================

/// Collector for dispatched messages with thread-safe access
#[derive(Clone, Default)]
pub struct MessageCollector {
    messages: Arc<parking_lot::Mutex<Vec<Message>>>,
    count: Arc<AtomicUsize>,
}

impl MessageCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message
    pub fn record(&self, message: &Message) {
        self.messages.lock().push(message.clone());
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    /// Get the count of received messages
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Wait for at least n messages to be received
    pub async fn wait_for_count(&self, n: usize, max_wait: Duration) -> bool {
        wait_for_count(&self.count, n, max_wait).await
    }

    /// Get all collected messages
    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().clone()
    }

    /// Get the last message received
    pub fn last(&self) -> Option<Message> {
        self.messages.lock().last().cloned()
    }

    /// Clear all collected messages
    pub fn clear(&self) {
        self.messages.lock().clear();
        self.count.store(0, Ordering::SeqCst);
    }
}
