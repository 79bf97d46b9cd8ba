use crate::core::error::PolicyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Joins the primary and secondary threshold tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    pub fn combine(&self, primary_met: bool, secondary_met: bool) -> bool {
        match self {
            Combinator::And => primary_met && secondary_met,
            Combinator::Or => primary_met || secondary_met,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Combinator::And => "and",
            Combinator::Or => "or",
        }
    }
}

impl FromStr for Combinator {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "and" => Ok(Combinator::And),
            "or" => Ok(Combinator::Or),
            other => Err(PolicyError::UnknownCombinator(other.to_string())),
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
