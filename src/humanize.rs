//! Human-readable duration parsing for configuration values

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid duration format: {0}")]
    InvalidFormat(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(#[from] std::num::ParseIntError),

    #[error("Invalid unit: {0}")]
    InvalidUnit(String),
}

/// Duration wrapper accepting `"500ms"`, `"30s"`, `"2m"`, `"1h"` or a bare
/// number of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HumanDuration(pub Duration);

impl HumanDuration {
    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn to_human_readable(&self) -> String {
        let millis = self.0.as_millis();
        if millis == 0 {
            return "0s".to_string();
        }

        const UNITS: &[(&str, u128)] = &[("h", 3_600_000), ("m", 60_000), ("s", 1_000)];
        for &(unit, divisor) in UNITS {
            if millis % divisor == 0 {
                return format!("{}{}", millis / divisor, unit);
            }
        }
        format!("{}ms", millis)
    }
}

impl From<HumanDuration> for Duration {
    fn from(value: HumanDuration) -> Self {
        value.0
    }
}

impl Serialize for HumanDuration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_human_readable())
    }
}

impl<'de> Deserialize<'de> for HumanDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct HumanDurationVisitor;

        impl<'de> serde::de::Visitor<'de> for HumanDurationVisitor {
            type Value = HumanDuration;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a duration such as \"30s\" or \"500ms\", or integer seconds")
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(HumanDuration::from_secs(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u64::try_from(v)
                    .map(HumanDuration::from_secs)
                    .map_err(|_| E::custom(format!("negative duration: {v}")))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse::<HumanDuration>().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_any(HumanDurationVisitor)
    }
}

impl FromStr for HumanDuration {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s.is_empty() {
            return Err(ParseError::InvalidFormat(s));
        }

        // Try to parse as plain number of seconds first
        if let Ok(secs) = s.parse::<u64>() {
            return Ok(HumanDuration::from_secs(secs));
        }

        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| ParseError::InvalidFormat(s.clone()))?;
        let (num_str, unit) = s.split_at(split);
        if num_str.is_empty() {
            return Err(ParseError::InvalidFormat(s.clone()));
        }
        let num: u64 = num_str.parse()?;

        let millis_per_unit = match unit.trim() {
            "ms" => 1,
            "s" | "sec" | "secs" => 1_000,
            "m" | "min" | "mins" => 60_000,
            "h" | "hr" | "hrs" => 3_600_000,
            other => return Err(ParseError::InvalidUnit(other.to_string())),
        };

        Ok(HumanDuration::from_millis(num * millis_per_unit))
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_human_readable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!("500ms".parse::<HumanDuration>().unwrap().0, Duration::from_millis(500));
        assert_eq!("30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(30));
        assert_eq!("2m".parse::<HumanDuration>().unwrap().0, Duration::from_secs(120));
        assert_eq!("1h".parse::<HumanDuration>().unwrap().0, Duration::from_secs(3600));
        assert_eq!(" 10 s ".parse::<HumanDuration>().unwrap().0, Duration::from_secs(10));
    }

    #[test]
    fn test_parse_bare_seconds() {
        assert_eq!("45".parse::<HumanDuration>().unwrap().0, Duration::from_secs(45));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<HumanDuration>().is_err());
        assert!("fast".parse::<HumanDuration>().is_err());
        assert!(matches!(
            "5 weeks".parse::<HumanDuration>(),
            Err(ParseError::InvalidUnit(_))
        ));
    }

    #[test]
    fn test_to_human_readable() {
        assert_eq!(HumanDuration::from_secs(30).to_human_readable(), "30s");
        assert_eq!(HumanDuration::from_secs(120).to_human_readable(), "2m");
        assert_eq!(HumanDuration::from_millis(1500).to_human_readable(), "1500ms");
        assert_eq!(HumanDuration::from_millis(0).to_human_readable(), "0s");
    }

    #[test]
    fn test_deserialize_string_and_number() {
        #[derive(Deserialize)]
        struct TestStruct {
            a: HumanDuration,
            b: HumanDuration,
        }
        let parsed: TestStruct = toml::from_str("a = \"250ms\"\nb = 15").unwrap();
        assert_eq!(parsed.a.0, Duration::from_millis(250));
        assert_eq!(parsed.b.0, Duration::from_secs(15));
    }
}
