//! Transport trait definitions

use async_trait::async_trait;
use std::net::SocketAddr;

use crate::error::Result;

/// A connectionless, message-oriented socket.
///
/// Each `recv_from` yields exactly one datagram. Implementations are shared
/// between tasks by reference, so both calls take `&self`.
#[async_trait]
pub trait DatagramSocket: Send + Sync {
    /// Write one datagram to `target`, returning the bytes written
    async fn send_to(&self, data: &[u8], target: SocketAddr) -> Result<usize>;

    /// Wait for the next datagram, copying it into `buf`.
    ///
    /// Returns the datagram length and sender address, or an error once the
    /// socket is closed or broken.
    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)>;

    /// Local bound address
    fn local_addr(&self) -> Result<SocketAddr>;
}

#[async_trait]
impl<T: DatagramSocket + ?Sized> DatagramSocket for std::sync::Arc<T> {
    async fn send_to(&self, data: &[u8], target: SocketAddr) -> Result<usize> {
        (**self).send_to(data, target).await
    }

    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        (**self).recv_from(buf).await
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        (**self).local_addr()
    }
}
