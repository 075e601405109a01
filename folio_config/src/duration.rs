use std::ops::Deref;

use serde::Deserialize;

/// A duration written as whitespace separated parts, e.g. `"1h 30m"`.
///
/// Supported units are `ms`, `s`, `m`, `h` and `d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration(pub std::time::Duration);

impl From<Duration> for std::time::Duration {
    fn from(value: Duration) -> Self {
        value.0
    }
}

impl Deref for Duration {
    type Target = std::time::Duration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::str::FromStr for Duration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_whitespace()
            .try_fold(std::time::Duration::ZERO, |total, part| {
                let split = part
                    .find(|c: char| !c.is_ascii_digit())
                    .ok_or_else(|| format!("Missing unit in duration part {part:?}"))?;
                let (value, unit) = part.split_at(split);
                let value = value
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid number in duration part {part:?}"))?;
                let part = match unit {
                    "ms" => std::time::Duration::from_millis(value),
                    "s" => std::time::Duration::from_secs(value),
                    "m" => std::time::Duration::from_secs(value * 60),
                    "h" => std::time::Duration::from_secs(value * 60 * 60),
                    "d" => std::time::Duration::from_secs(value * 24 * 60 * 60),
                    _ => return Err(format!("Invalid unit in duration part {part:?}")),
                };
                Ok(total + part)
            })
            .map(Self)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}
