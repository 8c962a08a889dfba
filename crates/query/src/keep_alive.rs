//! Backend session keep-alive durations
//!
//! Keep-alives use the backend's time-unit syntax (`30s`, `5m`, `1h`). They
//! are parsed while the request is built so a bad value never reaches the
//! backend.

use docsearch_core::error::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepAlive {
    raw: String,
    duration: Duration,
}

impl KeepAlive {
    pub fn parse(value: &str) -> Result<Self> {
        let raw = value.trim();
        let split = raw
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| Error::invalid_keep_alive(raw, "missing time unit"))?;
        let (amount, unit) = raw.split_at(split);

        if amount.is_empty() {
            return Err(Error::invalid_keep_alive(raw, "missing amount"));
        }
        let amount: u64 = amount
            .parse()
            .map_err(|_| Error::invalid_keep_alive(raw, "amount out of range"))?;
        if amount == 0 {
            return Err(Error::invalid_keep_alive(raw, "must be positive"));
        }

        let duration = match unit {
            "nanos" => Some(Duration::from_nanos(amount)),
            "micros" => Some(Duration::from_micros(amount)),
            "ms" => Some(Duration::from_millis(amount)),
            "s" => Some(Duration::from_secs(amount)),
            "m" => amount.checked_mul(60).map(Duration::from_secs),
            "h" => amount.checked_mul(60 * 60).map(Duration::from_secs),
            "d" => amount.checked_mul(24 * 60 * 60).map(Duration::from_secs),
            other => {
                return Err(Error::invalid_keep_alive(
                    raw,
                    format!("unknown time unit '{other}'"),
                ))
            }
        }
        .ok_or_else(|| Error::invalid_keep_alive(raw, "amount out of range"))?;

        Ok(Self {
            raw: raw.to_string(),
            duration,
        })
    }

    /// The value exactly as sent to the backend
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Duration in whole milliseconds, saturating at `i64::MAX`
    pub fn as_millis(&self) -> i64 {
        i64::try_from(self.duration.as_millis()).unwrap_or(i64::MAX)
    }
}

impl FromStr for KeepAlive {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for KeepAlive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
