//! OSC argument and message types

use std::fmt;

use crate::time::TimeTag;

/// A single typed OSC argument
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// 32-bit big-endian two's complement integer
    Int32(i32),
    /// 32-bit big-endian IEEE 754 float
    Float32(f32),
    /// NUL-terminated string, padded to a multiple of 4 bytes.
    ///
    /// The text must not contain NUL itself: it is encoded unchanged and the
    /// receiver stops reading at the first NUL.
    String(String),
    /// 64-bit NTP time tag
    TimeTag(TimeTag),
    /// Boolean true, no payload
    True,
    /// Boolean false, no payload
    False,
    /// Empty value, no payload
    Null,
    /// "Bang" (Infinitum in OSC 1.0), no payload
    Impulse,
}

/// Type tag characters
pub mod tag {
    pub const INT32: char = 'i';
    pub const FLOAT32: char = 'f';
    pub const STRING: char = 's';
    pub const TIME_TAG: char = 't';
    pub const TRUE: char = 'T';
    pub const FALSE: char = 'F';
    pub const NULL: char = 'N';
    pub const IMPULSE: char = 'I';
}

impl Argument {
    /// The single-character type tag for this argument
    pub fn type_tag(&self) -> char {
        match self {
            Argument::Int32(_) => tag::INT32,
            Argument::Float32(_) => tag::FLOAT32,
            Argument::String(_) => tag::STRING,
            Argument::TimeTag(_) => tag::TIME_TAG,
            Argument::True => tag::TRUE,
            Argument::False => tag::FALSE,
            Argument::Null => tag::NULL,
            Argument::Impulse => tag::IMPULSE,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Argument::Int32(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Argument::Float32(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Argument::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_time_tag(&self) -> Option<TimeTag> {
        match self {
            Argument::TimeTag(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Argument::True => Some(true),
            Argument::False => Some(false),
            _ => None,
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Int32(i) => write!(f, "Int32({})", i),
            Argument::Float32(v) => write!(f, "Float32({:?})", v),
            Argument::String(s) => write!(f, "String({:?})", s),
            Argument::TimeTag(t) => write!(f, "TimeTag({})", t),
            Argument::True => f.write_str("True"),
            Argument::False => f.write_str("False"),
            Argument::Null => f.write_str("Null"),
            Argument::Impulse => f.write_str("Impulse"),
        }
    }
}

impl From<i32> for Argument {
    fn from(i: i32) -> Self {
        Argument::Int32(i)
    }
}

impl From<f32> for Argument {
    fn from(f: f32) -> Self {
        Argument::Float32(f)
    }
}

impl From<String> for Argument {
    fn from(s: String) -> Self {
        Argument::String(s)
    }
}

impl From<&str> for Argument {
    fn from(s: &str) -> Self {
        Argument::String(s.to_string())
    }
}

impl From<TimeTag> for Argument {
    fn from(t: TimeTag) -> Self {
        Argument::TimeTag(t)
    }
}

impl From<bool> for Argument {
    fn from(b: bool) -> Self {
        if b {
            Argument::True
        } else {
            Argument::False
        }
    }
}

/// An OSC message: an address pattern plus ordered arguments
///
/// The address is expected to start with `/`, but nothing here checks it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    pub address: String,
    pub arguments: Vec<Argument>,
}

impl Message {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            arguments: Vec::new(),
        }
    }

    /// Builder-style argument append
    pub fn with_arg(mut self, arg: impl Into<Argument>) -> Self {
        self.arguments.push(arg.into());
        self
    }

    pub fn push(&mut self, arg: impl Into<Argument>) {
        self.arguments.push(arg.into());
    }

    /// The type tag string as sent on the wire, e.g. `",ifs"`
    pub fn type_tags(&self) -> String {
        let mut tags = String::with_capacity(self.arguments.len() + 1);
        tags.push(',');
        tags.extend(self.arguments.iter().map(Argument::type_tag));
        tags
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.address)?;
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags() {
        let msg = Message::new("/synth/1/freq")
            .with_arg(440)
            .with_arg(0.5f32)
            .with_arg("sine")
            .with_arg(true)
            .with_arg(Argument::Impulse);
        assert_eq!(msg.type_tags(), ",ifsTI");
        assert_eq!(Message::new("/x").type_tags(), ",");
    }

    #[test]
    fn test_display() {
        let msg = Message::new("/test").with_arg(12).with_arg("hi");
        assert_eq!(msg.to_string(), "/test [Int32(12), String(\"hi\")]");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Argument::Int32(7).as_i32(), Some(7));
        assert_eq!(Argument::Int32(7).as_f32(), None);
        assert_eq!(Argument::False.as_bool(), Some(false));
        assert_eq!(Argument::from("x").as_str(), Some("x"));
    }
}
