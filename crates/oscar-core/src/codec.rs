//! OSC binary codec
//!
//! Wire format of a message, all integers big-endian:
//!
//! ```text
//! address:  ASCII string, NUL-terminated, zero-padded to a multiple of 4
//! tags:     ',' + one character per argument, NUL-terminated, padded
//! args:     each argument's encoding, concatenated in tag order
//! ```
//!
//! Every argument encodes to a multiple of 4 bytes. The zero-width markers
//! (`T`, `F`, `N`, `I`) encode to nothing.

use bytes::{BufMut, Bytes, BytesMut};

use crate::time::TimeTag;
use crate::types::{tag, Argument, Message};
use crate::{Error, Result};

/// Longest prefix of an unterminated buffer echoed back in errors
const ERROR_PREVIEW_LEN: usize = 64;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Encode a message into a fresh buffer
#[inline]
pub fn encode(message: &Message) -> Bytes {
    message.encode()
}

/// Decode a buffer holding exactly one message
#[inline]
pub fn decode(bytes: &[u8]) -> Result<Message> {
    Message::parse(bytes)
}

/// A value with a fixed OSC type tag and wire representation
pub trait WireValue: Sized {
    /// Type tag character
    const TAG: char;

    /// Append the canonical encoding to `buf`
    fn append<B: BufMut>(&self, buf: &mut B);

    /// Read one value from the front of `buf`, returning the unread rest
    fn consume(buf: &[u8]) -> Result<(Self, &[u8])>;
}

impl WireValue for i32 {
    const TAG: char = tag::INT32;

    #[inline]
    fn append<B: BufMut>(&self, buf: &mut B) {
        buf.put_i32(*self);
    }

    #[inline]
    fn consume(buf: &[u8]) -> Result<(Self, &[u8])> {
        let (bytes, rest) = take::<4>(buf, "int32")?;
        Ok((i32::from_be_bytes(bytes), rest))
    }
}

impl WireValue for f32 {
    const TAG: char = tag::FLOAT32;

    #[inline]
    fn append<B: BufMut>(&self, buf: &mut B) {
        // Through the bit pattern so NaN payloads survive untouched.
        buf.put_u32(self.to_bits());
    }

    #[inline]
    fn consume(buf: &[u8]) -> Result<(Self, &[u8])> {
        let (bytes, rest) = take::<4>(buf, "float32")?;
        Ok((f32::from_bits(u32::from_be_bytes(bytes)), rest))
    }
}

impl WireValue for String {
    const TAG: char = tag::STRING;

    #[inline]
    fn append<B: BufMut>(&self, buf: &mut B) {
        append_str(buf, self);
    }

    #[inline]
    fn consume(buf: &[u8]) -> Result<(Self, &[u8])> {
        let (s, rest) = consume_str(buf)?;
        Ok((s.to_string(), rest))
    }
}

impl WireValue for TimeTag {
    const TAG: char = tag::TIME_TAG;

    #[inline]
    fn append<B: BufMut>(&self, buf: &mut B) {
        buf.put_u64(self.to_raw());
    }

    #[inline]
    fn consume(buf: &[u8]) -> Result<(Self, &[u8])> {
        let (bytes, rest) = take::<8>(buf, "timetag")?;
        Ok((TimeTag::from_raw(u64::from_be_bytes(bytes)), rest))
    }
}

// ============================================================================
// TYPE TAG REGISTRY
// ============================================================================

/// Decodes one argument of a known type from the front of a buffer
pub type Decoder = fn(&[u8]) -> Result<(Argument, &[u8])>;

/// Every type tag this codec understands. Supporting a new type means adding
/// an entry here plus an `Argument` variant.
static REGISTRY: &[(char, Decoder)] = &[
    (tag::INT32, decode_as::<i32>),
    (tag::FLOAT32, decode_as::<f32>),
    (tag::STRING, decode_as::<String>),
    (tag::TIME_TAG, decode_as::<TimeTag>),
    (tag::TRUE, decode_true),
    (tag::FALSE, decode_false),
    (tag::NULL, decode_null),
    (tag::IMPULSE, decode_impulse),
];

/// Look up the decoder registered for a type tag
pub fn decoder_for(type_tag: char) -> Option<Decoder> {
    REGISTRY
        .iter()
        .find(|(t, _)| *t == type_tag)
        .map(|(_, decoder)| *decoder)
}

/// All registered type tags, in registry order
pub fn registered_tags() -> impl Iterator<Item = char> {
    REGISTRY.iter().map(|(t, _)| *t)
}

fn decode_as<T: WireValue>(buf: &[u8]) -> Result<(Argument, &[u8])>
where
    Argument: From<T>,
{
    let (value, rest) = T::consume(buf)?;
    Ok((Argument::from(value), rest))
}

fn decode_true(buf: &[u8]) -> Result<(Argument, &[u8])> {
    Ok((Argument::True, buf))
}

fn decode_false(buf: &[u8]) -> Result<(Argument, &[u8])> {
    Ok((Argument::False, buf))
}

fn decode_null(buf: &[u8]) -> Result<(Argument, &[u8])> {
    Ok((Argument::Null, buf))
}

fn decode_impulse(buf: &[u8]) -> Result<(Argument, &[u8])> {
    Ok((Argument::Impulse, buf))
}

// ============================================================================
// ARGUMENTS
// ============================================================================

impl Argument {
    /// Append this argument's encoding (without its type tag)
    pub fn append<B: BufMut>(&self, buf: &mut B) {
        match self {
            Argument::Int32(i) => i.append(buf),
            Argument::Float32(f) => f.append(buf),
            Argument::String(s) => s.append(buf),
            Argument::TimeTag(t) => t.append(buf),
            Argument::True | Argument::False | Argument::Null | Argument::Impulse => {}
        }
    }

    /// Decode an argument of the given type from the front of `buf`,
    /// returning the unread rest
    pub fn consume(type_tag: char, buf: &[u8]) -> Result<(Argument, &[u8])> {
        let decode = decoder_for(type_tag).ok_or(Error::UnknownTypeTag(type_tag))?;
        decode(buf)
    }

    /// Number of bytes `append` writes
    pub fn encoded_len(&self) -> usize {
        match self {
            Argument::Int32(_) | Argument::Float32(_) => 4,
            Argument::TimeTag(_) => 8,
            Argument::String(s) => padded_str_len(s.len()),
            Argument::True | Argument::False | Argument::Null | Argument::Impulse => 0,
        }
    }
}

// ============================================================================
// MESSAGES
// ============================================================================

impl Message {
    /// Parse a buffer holding exactly one message.
    ///
    /// Bytes after the last argument are ignored and not reported, unlike
    /// [`WireValue::consume`] which hands back its remainder.
    pub fn parse(buf: &[u8]) -> Result<Message> {
        let (address, buf) = consume_str(buf).map_err(|e| Error::Address(Box::new(e)))?;
        let (tags, mut buf) = consume_str(buf).map_err(|e| Error::TypeTag(Box::new(e)))?;

        let tags = match tags.strip_prefix(',') {
            Some(tags) => tags,
            None => return Err(Error::InvalidTypeTags(tags.to_string())),
        };

        let mut arguments = Vec::with_capacity(tags.len());
        for (index, tag) in tags.chars().enumerate() {
            let decode = decoder_for(tag).ok_or(Error::UnknownTypeTag(tag))?;
            let (arg, rest) = decode(buf).map_err(|e| Error::Argument {
                index,
                tag,
                source: Box::new(e),
            })?;
            arguments.push(arg);
            buf = rest;
        }

        Ok(Message {
            address: address.to_string(),
            arguments,
        })
    }

    /// Append the encoded message to `buf`.
    ///
    /// Strings are written as is. An address or string argument holding a
    /// NUL decodes cut short at that NUL.
    pub fn append<B: BufMut>(&self, buf: &mut B) {
        append_str(buf, &self.address);
        append_str(buf, &self.type_tags());
        for arg in &self.arguments {
            arg.append(buf);
        }
    }

    /// Encode into a buffer sized up front
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.append(&mut buf);
        buf.freeze()
    }

    /// Exact encoded size in bytes
    pub fn encoded_len(&self) -> usize {
        padded_str_len(self.address.len())
            + padded_str_len(self.arguments.len() + 1)
            + self.arguments.iter().map(Argument::encoded_len).sum::<usize>()
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Size of a string of `len` bytes once terminated and padded
#[inline(always)]
fn padded_str_len(len: usize) -> usize {
    len + 4 - len % 4
}

#[inline]
fn append_str<B: BufMut>(buf: &mut B, s: &str) {
    buf.put_slice(s.as_bytes());
    // At least one NUL, at most four, landing on a 4-byte boundary.
    buf.put_bytes(0, 4 - s.len() % 4);
}

/// Read a NUL-terminated string. The padding after the terminator is
/// skipped without checking it is actually zero.
#[inline]
fn consume_str(buf: &[u8]) -> Result<(&str, &[u8])> {
    let end = match buf.iter().position(|&b| b == 0) {
        Some(end) => end,
        None => {
            let preview = &buf[..buf.len().min(ERROR_PREVIEW_LEN)];
            return Err(Error::UnterminatedString(
                String::from_utf8_lossy(preview).into_owned(),
            ));
        }
    };
    let s = std::str::from_utf8(&buf[..end]).map_err(|e| Error::InvalidString(e.to_string()))?;
    let next = (end + 4 - end % 4).min(buf.len());
    Ok((s, &buf[next..]))
}

#[inline(always)]
fn take<'a, const N: usize>(
    buf: &'a [u8],
    expected: &'static str,
) -> Result<([u8; N], &'a [u8])> {
    if buf.len() < N {
        return Err(Error::Truncated {
            expected,
            needed: N,
            have: buf.len(),
        });
    }
    let (head, rest) = buf.split_at(N);
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(head);
    Ok((bytes, rest))
}
