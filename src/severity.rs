//! Severity classes as produced by the classifier and as shown to users.
//!
//! The classifier numbers classes from most to least severe (0 = fatal),
//! while the historical dataset and the public-facing report use the
//! inverted scale (3 = fatal).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity class of an incident in the classifier's native numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionClass {
    Fatal = 0,
    Severe = 1,
    Light = 2,
}

impl PredictionClass {
    /// All classes in classifier order, aligned with the probability vector.
    pub const ALL: [PredictionClass; 3] = [Self::Fatal, Self::Severe, Self::Light];

    /// Maps a classifier class id to a class. Returns `None` outside `0..=2`.
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            0 => Some(Self::Fatal),
            1 => Some(Self::Severe),
            2 => Some(Self::Light),
            _ => None,
        }
    }

    pub fn id(self) -> usize {
        self as usize
    }

    /// Severity code on the public scale used by the dataset (`humrat_teuna`).
    pub fn public_code(self) -> u8 {
        match self {
            Self::Fatal => 3,
            Self::Severe => 2,
            Self::Light => 1,
        }
    }

    /// Type name used by the map layer.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Fatal => "fatal",
            Self::Severe => "severe",
            Self::Light => "light",
        }
    }

    /// True for the classes that trigger a prediction-based warning.
    pub fn is_serious(self) -> bool {
        matches!(self, Self::Fatal | Self::Severe)
    }
}

impl fmt::Display for PredictionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}
