//! Go-style duration strings (`300ms`, `90s`, `5m`, `6h`, `1h30m`).

use std::time::Duration;

/// Error returned for malformed duration strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid duration: {value:?}")]
pub struct DurationError {
    pub value: String,
}

/// Parse a duration made of one or more `<number><unit>` segments.
///
/// Units: `ms`, `s`, `m`, `h`, `d`. Fractions are allowed (`1.5h`).
pub fn parse_duration(s: &str) -> Result<Duration, DurationError> {
    let invalid = || DurationError { value: s.to_string() };
    let mut rest = s.trim();
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total_ms = 0f64;
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        let (num_str, tail) = rest.split_at(num_end);
        let num: f64 = num_str.parse().map_err(|_| invalid())?;

        let unit_end = tail.find(|c: char| c.is_ascii_digit()).unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);

        let multiplier = match unit {
            "ms" => 1.0,
            "s" => 1_000.0,
            "m" => 60_000.0,
            "h" => 3_600_000.0,
            "d" => 86_400_000.0,
            _ => return Err(invalid()),
        };

        total_ms += num * multiplier;
        rest = tail;
    }

    Ok(Duration::from_millis(total_ms as u64))
}
