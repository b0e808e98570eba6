use std::fmt;

use serde::{Deserialize, Serialize};

/// Result classification for a single processed item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutcomeKind {
    /// Retrieved with data
    Ok,
    /// Retrieved but carried no data
    Empty,
    /// Retrieval failed
    Fail,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 3] = [OutcomeKind::Ok, OutcomeKind::Empty, OutcomeKind::Fail];

    /// Label used on the progress line
    pub fn label(self) -> &'static str {
        match self {
            OutcomeKind::Ok => "OK",
            OutcomeKind::Empty => "EMPTY",
            OutcomeKind::Fail => "FAIL",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for OutcomeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ok" | "success" => Ok(OutcomeKind::Ok),
            "empty" => Ok(OutcomeKind::Empty),
            "fail" | "failed" => Ok(OutcomeKind::Fail),
            _ => Err(format!("Invalid outcome: '{}'. Valid options: ok, empty, fail", s)),
        }
    }
}

/// Per-outcome counters. The key set is fixed to the three outcome kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tallies {
    pub ok: u64,
    pub empty: u64,
    pub fail: u64,
}

impl Tallies {
    pub fn record(&mut self, outcome: OutcomeKind) {
        *self.slot(outcome) += 1;
    }

    pub fn get(&self, outcome: OutcomeKind) -> u64 {
        match outcome {
            OutcomeKind::Ok => self.ok,
            OutcomeKind::Empty => self.empty,
            OutcomeKind::Fail => self.fail,
        }
    }

    pub fn sum(&self) -> u64 {
        self.ok + self.empty + self.fail
    }

    fn slot(&mut self, outcome: OutcomeKind) -> &mut u64 {
        match outcome {
            OutcomeKind::Ok => &mut self.ok,
            OutcomeKind::Empty => &mut self.empty,
            OutcomeKind::Fail => &mut self.fail,
        }
    }
}
