use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::ObjectId;

/// Direction of the capacity search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// Smallest capacity that still holds the object.
    Best,
    /// Largest capacity in the pool.
    Worst,
}

/// Which bin wins when several share the chosen capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    LowestId,
    HighestId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub fit: Fit,
    pub tie_break: TieBreak,
}

/// Per-object tag selecting a placement policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Best fit, lowest id.
    Blue,
    /// Best fit, highest id.
    Yellow,
    /// Worst fit, lowest id.
    Red,
    /// Worst fit, highest id.
    Green,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Blue, Color::Yellow, Color::Red, Color::Green];

    pub const fn policy(self) -> Policy {
        match self {
            Color::Blue => Policy {
                fit: Fit::Best,
                tie_break: TieBreak::LowestId,
            },
            Color::Yellow => Policy {
                fit: Fit::Best,
                tie_break: TieBreak::HighestId,
            },
            Color::Red => Policy {
                fit: Fit::Worst,
                tie_break: TieBreak::LowestId,
            },
            Color::Green => Policy {
                fit: Fit::Worst,
                tie_break: TieBreak::HighestId,
            },
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::Red => "red",
            Color::Green => "green",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown color: {0}")]
pub struct ParseColorError(String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::ALL
            .into_iter()
            .find(|color| color.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseColorError(s.to_string()))
    }
}

/// An object resident in some bin. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Object {
    id: ObjectId,
    size: u64,
    color: Color,
}

impl Object {
    pub fn new(id: ObjectId, size: u64, color: Color) -> Self {
        Object { id, size, color }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn color(&self) -> Color {
        self.color
    }
}
