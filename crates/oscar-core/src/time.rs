//! OSC time tags
//!
//! A time tag is a 64-bit fixed-point NTP timestamp: the high 32 bits count
//! whole seconds since 1900-01-01T00:00:00 UTC, the low 32 bits count
//! fractions of a second in steps of 2^-32.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Seconds between the NTP epoch (1900) and the Unix epoch (1970)
pub const NTP_UNIX_OFFSET_SECS: u64 = 2_208_988_800;

const FRACTION_STEPS: u64 = 1 << 32;
const NANOS_PER_SEC: u64 = 1_000_000_000;

/// OSC time tag, kept as the raw wire value so encoding is exact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TimeTag {
    /// Whole seconds since 1900-01-01
    pub seconds: u32,
    /// Fractional seconds in units of 2^-32 s
    pub fraction: u32,
}

impl TimeTag {
    /// The special "execute immediately" time tag
    pub const IMMEDIATELY: TimeTag = TimeTag {
        seconds: 0,
        fraction: 1,
    };

    pub const fn new(seconds: u32, fraction: u32) -> Self {
        Self { seconds, fraction }
    }

    /// Build from the raw 64-bit wire value
    pub const fn from_raw(raw: u64) -> Self {
        Self {
            seconds: (raw >> 32) as u32,
            fraction: raw as u32,
        }
    }

    /// The raw 64-bit wire value
    pub const fn to_raw(self) -> u64 {
        ((self.seconds as u64) << 32) | self.fraction as u64
    }

    /// Current wall-clock time
    pub fn now() -> Self {
        SystemTime::now().into()
    }

    /// Build from a duration since 1900-01-01. Seconds beyond the 32-bit
    /// era wrap, as on the wire.
    pub fn from_duration_since_epoch(d: Duration) -> Self {
        let fraction = ((d.subsec_nanos() as u64) << 32) / NANOS_PER_SEC;
        Self {
            seconds: d.as_secs() as u32,
            fraction: fraction as u32,
        }
    }

    /// Duration since 1900-01-01, truncated to whole nanoseconds
    pub fn as_duration_since_epoch(self) -> Duration {
        let nanos = (self.fraction as u64 * NANOS_PER_SEC) / FRACTION_STEPS;
        Duration::new(self.seconds as u64, nanos as u32)
    }

    /// Wall-clock time for this tag, or `None` if the platform cannot
    /// represent it
    pub fn to_system_time(self) -> Option<SystemTime> {
        let since_ntp = self.as_duration_since_epoch();
        let offset = Duration::from_secs(NTP_UNIX_OFFSET_SECS);
        if since_ntp >= offset {
            UNIX_EPOCH.checked_add(since_ntp - offset)
        } else {
            UNIX_EPOCH.checked_sub(offset - since_ntp)
        }
    }
}

impl From<SystemTime> for TimeTag {
    /// Instants before 1900 clamp to the zero time tag.
    fn from(t: SystemTime) -> Self {
        let offset = Duration::from_secs(NTP_UNIX_OFFSET_SECS);
        let since_ntp = match t.duration_since(UNIX_EPOCH) {
            Ok(after) => offset + after,
            Err(before) => match offset.checked_sub(before.duration()) {
                Some(d) => d,
                None => return TimeTag::default(),
            },
        };
        TimeTag::from_duration_since_epoch(since_ntp)
    }
}

impl fmt::Display for TimeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.as_duration_since_epoch();
        write!(f, "{}.{:09}s since 1900", d.as_secs(), d.subsec_nanos())
    }
}
