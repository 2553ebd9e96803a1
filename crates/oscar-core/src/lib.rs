//! Oscar Core
//!
//! Core types, encoding, and address matching for Open Sound Control.
//!
//! This crate provides:
//! - Argument and message types ([`Argument`], [`Message`])
//! - Binary encoding/decoding ([`codec`]) with a type-tag registry
//! - Address-pattern compilation and matching ([`Pattern`])
//! - NTP time tags ([`TimeTag`])

pub mod codec;
pub mod error;
pub mod pattern;
pub mod time;
pub mod types;

pub use codec::{decode, encode, WireValue};
pub use error::{Error, Result};
pub use pattern::{CharClass, Matcher, Pattern};
pub use time::TimeTag;
pub use types::{Argument, Message};

/// Largest datagram payload a receiver needs to buffer
pub const MAX_DATAGRAM_SIZE: usize = 1 << 16;
