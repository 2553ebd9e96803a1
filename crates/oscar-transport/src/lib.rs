//! Oscar Transport Layer
//!
//! Datagram transports for OSC:
//! - [`DatagramSocket`], the seam the listener reads from and senders write to
//! - [`UdpTransport`], the tokio UDP implementation
//! - [`send`] / [`send_message`] for one-shot sends

pub mod error;
pub mod send;
pub mod traits;
pub mod udp;

pub use error::{Result, TransportError};
pub use send::{resolve, send, send_message};
pub use traits::DatagramSocket;
pub use udp::{UdpConfig, UdpTransport};
