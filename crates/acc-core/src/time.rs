//! Time-of-day parsing.
//!
//! Opening times and activity end times are stored as `f64` seconds since
//! midnight of the simulated day.  Values past 24:00:00 are legal (a shop
//! open until 01:00 the next day closes at `25:00:00`).
//!
//! Accepted input forms:
//!
//! | Form         | Example     |
//! |--------------|-------------|
//! | `HH:MM:SS`   | `08:30:00`  |
//! | `HH:MM`      | `08:30`     |
//! | seconds      | `30600`     |
//!
//! A leading `-` negates the value.

use crate::{AccError, AccResult};

/// Parse a time-of-day string into seconds since midnight.
pub fn parse_time(s: &str) -> AccResult<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Err(AccError::Parse("empty time string".into()));
    }
    let (sign, body) = match s.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, s),
    };

    let parts: Vec<&str> = body.split(':').collect();
    let secs = match parts.as_slice() {
        [secs] => parse_component(secs, s)?,
        [h, m] => parse_component(h, s)? * 3_600.0 + parse_component(m, s)? * 60.0,
        [h, m, sec] => {
            parse_component(h, s)? * 3_600.0
                + parse_component(m, s)? * 60.0
                + parse_component(sec, s)?
        }
        _ => {
            return Err(AccError::Parse(format!(
                "invalid time {s:?}: expected HH:MM:SS, HH:MM, or seconds"
            )));
        }
    };
    Ok(sign * secs)
}

/// Format seconds since midnight as `HH:MM:SS` (hours may exceed 23).
pub fn format_time(secs: f64) -> String {
    let sign = if secs < 0.0 { "-" } else { "" };
    let total = secs.abs().round() as u64;
    let h = total / 3_600;
    let m = (total % 3_600) / 60;
    let s = total % 60;
    format!("{sign}{h:02}:{m:02}:{s:02}")
}

fn parse_component(part: &str, whole: &str) -> AccResult<f64> {
    part.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| AccError::Parse(format!("invalid time {whole:?}")))
}
