use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// An identity vector of trust.
///
/// `P0` is the bottom of the ladder: it is returned when no requested level
/// can be satisfied and is never a valid level to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrustVector {
    P0,
    P1,
    P2,
    P3,
    P4,
}

impl TrustVector {
    /// The wire label for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P0 => "P0",
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
            Self::P4 => "P4",
        }
    }
}

impl Ord for TrustVector {
    // Levels order by comparing their labels as strings. This is the single
    // place that defines the ordering; a ladder extension past single-digit
    // suffixes must change the comparison here and nowhere else.
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for TrustVector {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TrustVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TrustVector {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P0" => Ok(Self::P0),
            "P1" => Ok(Self::P1),
            "P2" => Ok(Self::P2),
            "P3" => Ok(Self::P3),
            "P4" => Ok(Self::P4),
            other => Err(CoreError::InvalidTrustVector(other.to_string())),
        }
    }
}

impl Serialize for TrustVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TrustVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Labels arrive from callers with occasional surrounding whitespace.
        let label = String::deserialize(deserializer)?;
        label.trim().parse().map_err(de::Error::custom)
    }
}
