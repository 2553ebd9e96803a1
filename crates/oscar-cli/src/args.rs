//! Command-line argument values
//!
//! Each message argument is written as `TAG:VALUE` (`i:12`, `f:0.5`,
//! `s:hello`, `t:now`, `t:16143559489372569600`) or as a bare marker tag
//! (`T`, `F`, `N`, `I`).

use oscar_core::{Argument, TimeTag};

/// Parse one argument spec, for use as a clap value parser
pub fn parse_argument(spec: &str) -> Result<Argument, String> {
    match spec {
        "T" => return Ok(Argument::True),
        "F" => return Ok(Argument::False),
        "N" => return Ok(Argument::Null),
        "I" => return Ok(Argument::Impulse),
        _ => {}
    }

    let (tag, value) = spec
        .split_once(':')
        .ok_or_else(|| format!("expected TAG:VALUE or a marker (T, F, N, I), got {:?}", spec))?;

    match tag {
        "i" => value
            .parse::<i32>()
            .map(Argument::Int32)
            .map_err(|e| format!("invalid int32 {:?}: {}", value, e)),
        "f" => value
            .parse::<f32>()
            .map(Argument::Float32)
            .map_err(|e| format!("invalid float32 {:?}: {}", value, e)),
        "s" => Ok(Argument::String(value.to_string())),
        "t" if value == "now" => Ok(Argument::TimeTag(TimeTag::now())),
        "t" if value == "immediately" => Ok(Argument::TimeTag(TimeTag::IMMEDIATELY)),
        "t" => value
            .parse::<u64>()
            .map(|raw| Argument::TimeTag(TimeTag::from_raw(raw)))
            .map_err(|e| format!("invalid time tag {:?}: {}", value, e)),
        other => Err(format!("unknown argument type {:?}", other)),
    }
}
