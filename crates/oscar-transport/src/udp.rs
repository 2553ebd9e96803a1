//! UDP transport implementation

use async_trait::async_trait;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::DatagramSocket;

/// UDP configuration
#[derive(Debug, Clone)]
pub struct UdpConfig {
    /// Maximum packet size accepted by `send_to`
    pub max_packet_size: usize,
    /// Allow sending to broadcast addresses
    pub broadcast: bool,
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            max_packet_size: 65507, // Max UDP payload
            broadcast: false,
        }
    }
}

/// UDP transport (connectionless)
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    config: UdpConfig,
}

impl UdpTransport {
    /// Bind to a local address
    pub async fn bind(addr: &str) -> Result<Self> {
        Self::bind_with_config(addr, UdpConfig::default()).await
    }

    /// Bind with config
    pub async fn bind_with_config(addr: &str, config: UdpConfig) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| TransportError::ConnectionFailed(format!("bind {}: {}", addr, e)))?;

        if config.broadcast {
            socket.set_broadcast(true)?;
        }

        info!("UDP bound to {}", socket.local_addr()?);

        Ok(Self { socket, config })
    }

    /// Wrap an already-bound tokio socket
    pub fn from_socket(socket: UdpSocket) -> Self {
        Self {
            socket,
            config: UdpConfig::default(),
        }
    }

    pub fn config(&self) -> &UdpConfig {
        &self.config
    }
}

#[async_trait]
impl DatagramSocket for UdpTransport {
    async fn send_to(&self, data: &[u8], target: SocketAddr) -> Result<usize> {
        if data.len() > self.config.max_packet_size {
            return Err(TransportError::SendFailed(format!(
                "packet of {} bytes exceeds limit of {}",
                data.len(),
                self.config.max_packet_size
            )));
        }
        let sent = self
            .socket
            .send_to(data, target)
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        debug!("UDP sent {} bytes to {}", sent, target);
        Ok(sent)
    }

    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        let (len, from) = self
            .socket
            .recv_from(buf)
            .await
            .map_err(|e| TransportError::ReceiveFailed(e.to_string()))?;
        debug!("UDP received {} bytes from {}", len, from);
        Ok((len, from))
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(TransportError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_udp_bind() {
        let transport = UdpTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap();
        assert!(addr.port() > 0);
    }

    #[tokio::test]
    async fn test_udp_bind_invalid() {
        let result = UdpTransport::bind("not-an-address").await;
        assert!(matches!(result, Err(TransportError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn test_oversized_packet_rejected() {
        let config = UdpConfig {
            max_packet_size: 8,
            ..Default::default()
        };
        let transport = UdpTransport::bind_with_config("127.0.0.1:0", config)
            .await
            .unwrap();
        let target = transport.local_addr().unwrap();
        let result = transport.send_to(&[0u8; 16], target).await;
        assert!(matches!(result, Err(TransportError::SendFailed(_))));
    }
}
