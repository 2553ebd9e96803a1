//! One-shot message sending

use oscar_core::Message;
use std::net::SocketAddr;
use tokio::net::lookup_host;
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::DatagramSocket;

/// Resolve `host:port` to the first socket address it names
pub async fn resolve(target: &str) -> Result<SocketAddr> {
    lookup_host(target)
        .await
        .map_err(|e| TransportError::InvalidAddress(format!("{}: {}", target, e)))?
        .next()
        .ok_or_else(|| TransportError::InvalidAddress(format!("{}: no addresses", target)))
}

/// Encode `message` and write it to `target` as a single datagram
pub async fn send_message<S>(socket: &S, target: SocketAddr, message: &Message) -> Result<()>
where
    S: DatagramSocket + ?Sized,
{
    let bytes = message.encode();
    socket.send_to(&bytes, target).await?;
    debug!("Sent {} to {}", message, target);
    Ok(())
}

/// Resolve `target` (`host:port`), encode `message` and send it as one
/// datagram
pub async fn send<S>(socket: &S, target: &str, message: &Message) -> Result<()>
where
    S: DatagramSocket + ?Sized,
{
    let target = resolve(target).await?;
    send_message(socket, target, message).await
}
