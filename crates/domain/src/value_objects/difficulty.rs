use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Intended participant level for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(alias = "beginner")]
    Beginner,
    #[default]
    #[serde(alias = "intermediate")]
    Intermediate,
    #[serde(alias = "advanced")]
    Advanced,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Beginner => write!(f, "Beginner"),
            Self::Intermediate => write!(f, "Intermediate"),
            Self::Advanced => write!(f, "Advanced"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" | "basic" | "introductory" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" | "expert" => Ok(Self::Advanced),
            _ => Err(DomainError::parse(format!("Unknown difficulty: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("ADVANCED".parse::<Difficulty>().unwrap(), Difficulty::Advanced);
        assert_eq!("basic".parse::<Difficulty>().unwrap(), Difficulty::Beginner);
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn accepts_lowercase_json() {
        let d: Difficulty = serde_json::from_str("\"beginner\"").unwrap();
        assert_eq!(d, Difficulty::Beginner);
    }
}
