// src/data/timespec.rs

//! Parse a time-window specification like `-1h`, `-1h+5m8s`, `12:30+5m`, or
//! `12:30-48h+15m` into a [`TimeInterval`].
//!
//! A specification has up to three components:
//!
//! * a reference time before any sign; `HH:MM` or `HH:MM:SS` on the date of
//!   "now" (moved back a day if that is after "now"), or "now" when empty
//! * a duration after `-`, subtracted from the reference to get the start
//! * a duration after `+`, added to the start to get the end; without it the
//!   end is "now"
//!
//! A sign with nothing after it is the same as no sign, e.g. `12:30-` is
//! `12:30`.

use crate::data::datetime::{DateTimeL, Duration, NaiveTime, TimeInterval, TimeZone};

use ::si_trace_print::{defn, defx};
use ::thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum TimeSpecError {
    #[error("invalid time reference {0:?}, expected HH:MM or HH:MM:SS")]
    BadReference(String),
    #[error("invalid duration {0:?}, expected e.g. 1h30m, 5m8s, 1.5h")]
    BadDuration(String),
    #[error("time window start {start} is after end {end}")]
    StartAfterEnd { start: DateTimeL, end: DateTimeL },
}

/// The components of a specification, in order: reference, minus, plus.
/// A sign with nothing after it yields `Some("")`.
pub(crate) fn break_time_spec(spec: &str) -> (&str, Option<&str>, Option<&str>) {
    let mut reference: &str = spec;
    let mut minus: Option<&str> = None;
    let mut plus: Option<&str> = None;
    // (offset of sign, sign)
    let signs: Vec<(usize, char)> = spec
        .char_indices()
        .filter(|(_, c)| *c == '-' || *c == '+')
        .collect();
    if let Some((first, _)) = signs.first() {
        reference = &spec[..*first];
    }
    for (i, (at, sign)) in signs.iter().enumerate() {
        let end: usize = match signs.get(i + 1) {
            Some((next, _)) => *next,
            None => spec.len(),
        };
        let value: &str = &spec[at + 1..end];
        match sign {
            '-' => minus = Some(value),
            _ => plus = Some(value),
        }
    }

    (reference, minus, plus)
}

/// Parse a reference `HH:MM` or `HH:MM:SS` relative to `now`.
pub fn parse_time_reference(
    reference: &str,
    now: &DateTimeL,
) -> Result<DateTimeL, TimeSpecError> {
    let time: NaiveTime = match NaiveTime::parse_from_str(reference, "%H:%M:%S") {
        Ok(time) => time,
        Err(_) => match NaiveTime::parse_from_str(reference, "%H:%M") {
            Ok(time) => time,
            Err(_) => return Err(TimeSpecError::BadReference(reference.to_string())),
        },
    };
    let dt: DateTimeL = match now
        .offset()
        .from_local_datetime(&now.date_naive().and_time(time))
        .single()
    {
        Some(dt) => dt,
        None => return Err(TimeSpecError::BadReference(reference.to_string())),
    };
    if dt > *now {
        return Ok(dt - Duration::days(1));
    }

    Ok(dt)
}

/// Parse a duration made of `<number><unit>` pairs. Units are `d`, `h`,
/// `m`, `s`, `ms`, `us` (or `µs`, `μs`), `ns`. Numbers may have a decimal
/// fraction.
pub fn parse_duration(value: &str) -> Result<Duration, TimeSpecError> {
    let err = || TimeSpecError::BadDuration(value.to_string());
    if value.is_empty() {
        return Err(err());
    }
    let mut total_ns: f64 = 0.0;
    let mut rest: &str = value;
    while !rest.is_empty() {
        let number_len: usize = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(err)?;
        if number_len == 0 {
            return Err(err());
        }
        let number: f64 = rest[..number_len].parse::<f64>().map_err(|_| err())?;
        rest = &rest[number_len..];
        let unit_len: usize = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit_ns: f64 = match &rest[..unit_len] {
            "d" => 86_400e9,
            "h" => 3_600e9,
            "m" => 60e9,
            "s" => 1e9,
            "ms" => 1e6,
            "us" | "µs" | "μs" => 1e3,
            "ns" => 1.0,
            _ => return Err(err()),
        };
        rest = &rest[unit_len..];
        total_ns += number * unit_ns;
    }
    if !total_ns.is_finite() || total_ns > i64::MAX as f64 {
        return Err(err());
    }

    Ok(Duration::nanoseconds(total_ns.round() as i64))
}

/// Parse a time-window specification relative to `now`.
pub fn parse_time_interval(
    spec: &str,
    now: &DateTimeL,
) -> Result<TimeInterval, TimeSpecError> {
    defn!("({:?}, {:?})", spec, now);
    let (reference, minus, plus) = break_time_spec(spec.trim());
    let minus: Option<&str> = minus.filter(|m| !m.is_empty());
    let plus: Option<&str> = plus.filter(|p| !p.is_empty());
    let dt_ref: DateTimeL = match reference.is_empty() {
        true => *now,
        false => parse_time_reference(reference, now)?,
    };
    let start: DateTimeL = match minus {
        Some(minus) => dt_ref - parse_duration(minus)?,
        None => dt_ref,
    };
    let end: DateTimeL = match plus {
        Some(plus) => start + parse_duration(plus)?,
        None => *now,
    };
    if start > end {
        defx!("start {:?} > end {:?}", start, end);
        return Err(TimeSpecError::StartAfterEnd { start, end });
    }
    defx!("return [{:?}, {:?}]", start, end);

    Ok(TimeInterval::new(start, end))
}
