//! OSC address-pattern compilation and matching
//!
//! Pattern syntax:
//! - any byte matches itself
//! - `?` matches exactly one byte
//! - `*` matches zero or more bytes
//! - `[abc]`, `[a-z]` match one byte in the set; `[!...]` one byte not in it.
//!   A `-` first or last in the brackets is a literal hyphen.
//!
//! Matching is a depth-first search over `(matcher, input)` positions rather
//! than a regex translation, so `*`, `?`, classes and literals can be freely
//! interleaved.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A compiled address pattern
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pattern {
    matchers: Vec<Matcher>,
}

/// One element of a compiled pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Exactly this byte
    Char(u8),
    /// `?`
    Single,
    /// `*`
    Multi,
    /// `[...]`
    Class(CharClass),
}

/// A set of bytes, optionally inverted
#[derive(Clone, PartialEq, Eq, Default)]
pub struct CharClass {
    bits: [u64; 4],
    invert: bool,
}

/// Legal moves out of a search state, as a bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Transitions(u8);

impl Transitions {
    const NONE: Transitions = Transitions(0);
    /// Matcher and input both advance
    const ADVANCE_BOTH: Transitions = Transitions(1 << 0);
    /// Matcher advances, input stays (`*` matching nothing more)
    const ADVANCE_MATCHER: Transitions = Transitions(1 << 1);
    /// Input advances, matcher stays (`*` swallowing another byte)
    const ADVANCE_INPUT: Transitions = Transitions(1 << 2);

    fn contains(self, other: Transitions) -> bool {
        self.0 & other.0 != 0
    }

    fn union(self, other: Transitions) -> Transitions {
        Transitions(self.0 | other.0)
    }
}

impl Matcher {
    fn transitions(&self, b: u8) -> Transitions {
        match self {
            Matcher::Char(c) if *c == b => Transitions::ADVANCE_BOTH,
            Matcher::Char(_) => Transitions::NONE,
            Matcher::Single => Transitions::ADVANCE_BOTH,
            Matcher::Multi => Transitions::ADVANCE_BOTH
                .union(Transitions::ADVANCE_MATCHER)
                .union(Transitions::ADVANCE_INPUT),
            Matcher::Class(cc) if cc.matches(b) => Transitions::ADVANCE_BOTH,
            Matcher::Class(_) => Transitions::NONE,
        }
    }
}

impl CharClass {
    pub fn new(invert: bool) -> Self {
        Self {
            bits: [0; 4],
            invert,
        }
    }

    /// Build a non-inverted class from the given bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut cc = Self::default();
        for &b in bytes {
            cc.insert(b);
        }
        cc
    }

    pub fn insert(&mut self, b: u8) {
        self.bits[(b >> 6) as usize] |= 1u64 << (b & 63);
    }

    /// Insert every byte in `start..=end`
    pub fn insert_range(&mut self, start: u8, end: u8) {
        for b in start..=end {
            self.insert(b);
        }
    }

    pub fn contains(&self, b: u8) -> bool {
        self.bits[(b >> 6) as usize] & (1u64 << (b & 63)) != 0
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    pub fn inverted(mut self) -> Self {
        self.invert = !self.invert;
        self
    }

    /// Whether `b` is accepted, taking inversion into account
    pub fn matches(&self, b: u8) -> bool {
        self.contains(b) != self.invert
    }
}

impl fmt::Debug for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CharClass({})", self)
    }
}

impl CharClass {
    /// Append the class as pattern text.
    ///
    /// A member `-` goes first so it stays literal, and a member `!` goes
    /// after the others so it is not read as inversion. A non-inverted class
    /// holding only `!` (or `]`) has no text form.
    fn write_text(&self, out: &mut Vec<u8>) {
        out.push(b'[');
        if self.invert {
            out.push(b'!');
        }
        if self.contains(b'-') {
            out.push(b'-');
        }
        out.extend((0..=u8::MAX).filter(|&b| b != b'-' && b != b'!' && self.contains(b)));
        if self.contains(b'!') {
            out.push(b'!');
        }
        out.push(b']');
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = Vec::new();
        self.write_text(&mut text);
        f.write_str(&String::from_utf8_lossy(&text))
    }
}

impl Matcher {
    fn write_text(&self, out: &mut Vec<u8>) {
        match self {
            Matcher::Char(c) => out.push(*c),
            Matcher::Single => out.push(b'?'),
            Matcher::Multi => out.push(b'*'),
            Matcher::Class(cc) => cc.write_text(out),
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = Vec::new();
        self.write_text(&mut text);
        f.write_str(&String::from_utf8_lossy(&text))
    }
}

impl Pattern {
    /// Compile pattern text
    pub fn parse(s: &str) -> Result<Self> {
        let mut rest = s.as_bytes();
        let mut matchers = Vec::with_capacity(rest.len());
        while !rest.is_empty() {
            let (matcher, tail) = parse_matcher(rest)?;
            matchers.push(matcher);
            rest = tail;
        }
        Ok(Self { matchers })
    }

    /// Build a pattern directly from matchers
    pub fn from_matchers(matchers: Vec<Matcher>) -> Self {
        Self { matchers }
    }

    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }

    /// True if the pattern contains no wildcards or classes
    pub fn is_literal(&self) -> bool {
        self.matchers.iter().all(|m| matches!(m, Matcher::Char(_)))
    }

    /// Check whether `text` matches this pattern
    pub fn matches(&self, text: &str) -> bool {
        let input = text.as_bytes();
        let mut stack = vec![(0usize, 0usize)];
        let mut seen = HashSet::new();

        while let Some((m, i)) = stack.pop() {
            if !seen.insert((m, i)) {
                continue;
            }
            let matchers = &self.matchers[m..];

            if i == input.len() {
                // Out of input: only trailing `*`s may remain, and an empty
                // pattern accepts only empty input.
                if matchers.iter().all(|rest| *rest == Matcher::Multi) {
                    return true;
                }
                continue;
            }
            let Some(head) = matchers.first() else {
                // Input left over with nothing to match it.
                continue;
            };

            let moves = head.transitions(input[i]);
            if moves.contains(Transitions::ADVANCE_BOTH) {
                stack.push((m + 1, i + 1));
            }
            if moves.contains(Transitions::ADVANCE_MATCHER) {
                stack.push((m + 1, i));
            }
            if moves.contains(Transitions::ADVANCE_INPUT) {
                stack.push((m, i + 1));
            }
        }
        false
    }
}

impl fmt::Display for Pattern {
    /// Bytes are gathered before decoding so multi-byte UTF-8 literals
    /// survive. Class members above 0x7F are rendered lossily.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = Vec::with_capacity(self.matchers.len());
        for m in &self.matchers {
            m.write_text(&mut text);
        }
        f.write_str(&String::from_utf8_lossy(&text))
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Pattern::parse(s)
    }
}

impl TryFrom<&str> for Pattern {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Pattern::parse(s)
    }
}

/// Compile one matcher from the front of `s`
pub fn parse_matcher(s: &[u8]) -> Result<(Matcher, &[u8])> {
    match s.first() {
        None => Err(Error::UnexpectedEnd),
        Some(b'[') => {
            let (cc, rest) = parse_char_class(s)?;
            Ok((Matcher::Class(cc), rest))
        }
        Some(b'*') => Ok((Matcher::Multi, &s[1..])),
        Some(b'?') => Ok((Matcher::Single, &s[1..])),
        Some(&c) => Ok((Matcher::Char(c), &s[1..])),
    }
}

/// Compile a `[...]` character class from the front of `s`
pub fn parse_char_class(s: &[u8]) -> Result<(CharClass, &[u8])> {
    let Some(s) = s.strip_prefix(b"[") else {
        return Err(Error::UnexpectedToken {
            expected: '[',
            found: String::from_utf8_lossy(s).into_owned(),
        });
    };
    if s.is_empty() {
        return Err(Error::UnterminatedClass(String::new()));
    }

    let (invert, s) = match s.strip_prefix(b"!") {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let mut cc = CharClass::new(invert);

    let Some(end) = s.iter().position(|&b| b == b']') else {
        return Err(Error::UnterminatedClass(
            String::from_utf8_lossy(s).into_owned(),
        ));
    };
    let body = &s[..end];

    for (i, &c) in body.iter().enumerate() {
        // A hyphen between two bytes is a range; at either edge it is literal.
        if c == b'-' && i > 0 && i + 1 < body.len() {
            let (start, stop) = (body[i - 1], body[i + 1]);
            if stop < start {
                return Err(Error::InvalidRange {
                    start: start as char,
                    end: stop as char,
                });
            }
            cc.insert_range(start, stop);
            continue;
        }
        cc.insert(c);
    }

    Ok((cc, &s[end + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cc(s: &str) -> CharClass {
        CharClass::from_bytes(s.as_bytes())
    }

    #[test]
    fn test_parse_char_class() {
        let ok: &[(&str, CharClass, &str)] = &[
            ("[a]", cc("a"), ""),
            ("[!a]", cc("a").inverted(), ""),
            ("[abc]", cc("abc"), ""),
            ("[!abc]", cc("abc").inverted(), ""),
            ("[a-e]", cc("abcde"), ""),
            ("[!a-e]", cc("abcde").inverted(), ""),
            ("[a!]", cc("a!"), ""),
            ("[-a]", cc("-a"), ""),
            ("[a-]", cc("-a"), ""),
            ("[!-]", cc("-").inverted(), ""),
            ("[!!--]", cc("!\"#$%&'()*+,-").inverted(), ""),
            ("[a]bc", cc("a"), "bc"),
            ("[!a][b]", cc("a").inverted(), "[b]"),
        ];
        for (input, want, rem) in ok {
            let (got, rest) = parse_char_class(input.as_bytes())
                .unwrap_or_else(|e| panic!("parse_char_class({:?}): {}", input, e));
            assert_eq!(&got, want, "parse_char_class({:?})", input);
            assert_eq!(rest, rem.as_bytes(), "remainder of {:?}", input);
        }

        for input in ["[b-a]", "abc", "[abc", "abc]", "[", "[!"] {
            assert!(
                parse_char_class(input.as_bytes()).is_err(),
                "parse_char_class({:?}) should fail",
                input
            );
        }
    }

    #[test]
    fn test_invalid_range_error() {
        assert_eq!(
            parse_char_class(b"[b-a]").unwrap_err(),
            Error::InvalidRange { start: 'b', end: 'a' }
        );
    }

    #[test]
    fn test_parse_matcher_empty() {
        assert_eq!(parse_matcher(b"").unwrap_err(), Error::UnexpectedEnd);
    }

    #[test]
    fn test_parse_pattern() {
        let p = Pattern::parse("/a?[xy]*").unwrap();
        assert_eq!(
            p.matchers(),
            &[
                Matcher::Char(b'/'),
                Matcher::Char(b'a'),
                Matcher::Single,
                Matcher::Class(cc("xy")),
                Matcher::Multi,
            ]
        );
        assert_eq!(p.to_string(), "/a?[xy]*");
        assert!(!p.is_literal());
        assert!(Pattern::parse("/plain").unwrap().is_literal());
    }

    #[test]
    fn test_char_class_text() {
        assert_eq!(cc("a!").to_string(), "[a!]");
        assert_eq!(cc("a!").inverted().to_string(), "[!a!]");
        assert_eq!(cc("+-/").to_string(), "[-+/]");
        assert_eq!(cc("-!").to_string(), "[-!]");
        assert_eq!(CharClass::new(true).to_string(), "[!]");

        for class in [cc("a!"), cc("+-/"), cc("-!").inverted(), cc("!-a")] {
            let text = class.to_string();
            let (parsed, rest) = parse_char_class(text.as_bytes()).unwrap();
            assert_eq!(parsed, class, "{}", text);
            assert!(rest.is_empty());
        }
    }

    #[test]
    fn test_empty_pattern() {
        let p = Pattern::default();
        assert!(p.matches(""));
        assert!(!p.matches("a"));
        assert!(Pattern::parse("").unwrap().matches(""));
    }

    #[test]
    fn test_transitions() {
        assert_eq!(Matcher::Char(b'a').transitions(b'b'), Transitions::NONE);
        assert!(Matcher::Single
            .transitions(b'z')
            .contains(Transitions::ADVANCE_BOTH));
        let star = Matcher::Multi.transitions(b'z');
        assert!(star.contains(Transitions::ADVANCE_MATCHER));
        assert!(star.contains(Transitions::ADVANCE_INPUT));
    }
}
