use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Duration – the parsed form of the `duration` column
// ---------------------------------------------------------------------------

/// A title length: running time for films, season count for series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duration {
    Minutes(u32),
    Seasons(u32),
}

impl Duration {
    fn unit(&self) -> Unit {
        match self {
            Duration::Minutes(_) => Unit::Minutes,
            Duration::Seasons(_) => Unit::Seasons,
        }
    }
}

/// Unit suffix of a duration string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    Minutes,
    Seasons,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Minutes => write!(f, "minutes"),
            Unit::Seasons => write!(f, "seasons"),
        }
    }
}

/// Why a duration string could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum DurationError {
    /// No space-separated unit after the magnitude.
    #[error("duration {value:?} has no unit")]
    MissingUnit { value: String },

    /// A unit other than `min`, `Season` or `Seasons`.
    #[error("duration {value:?} has unknown unit {unit:?}")]
    UnknownUnit { value: String, unit: String },

    /// The magnitude is not a non-negative integer.
    #[error("duration {value:?} has a non-numeric magnitude")]
    NonNumeric { value: String },

    /// Well-formed, but in a unit the caller cannot use.
    #[error("duration {value:?} is in {found}, expected {expected}")]
    WrongUnit {
        value: String,
        expected: Unit,
        found: Unit,
    },
}

impl FromStr for Duration {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let Some((magnitude, unit)) = text.split_once(' ') else {
            return Err(DurationError::MissingUnit {
                value: s.to_string(),
            });
        };

        let unit = match unit {
            "min" => Unit::Minutes,
            "Season" | "Seasons" => Unit::Seasons,
            other => {
                return Err(DurationError::UnknownUnit {
                    value: s.to_string(),
                    unit: other.to_string(),
                })
            }
        };

        let n: u32 = magnitude.parse().map_err(|_| DurationError::NonNumeric {
            value: s.to_string(),
        })?;

        Ok(match unit {
            Unit::Minutes => Duration::Minutes(n),
            Unit::Seasons => Duration::Seasons(n),
        })
    }
}

/// Parse a film running time, rejecting anything that is not `"<n> min"`.
pub fn parse_minutes(s: &str) -> Result<u32, DurationError> {
    match s.parse::<Duration>()? {
        Duration::Minutes(m) => Ok(m),
        other => Err(DurationError::WrongUnit {
            value: s.to_string(),
            expected: Unit::Minutes,
            found: other.unit(),
        }),
    }
}
