#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Format {
    /// Fractional digits printed for durations (clamped to 9 when rendering).
    pub precision: usize,
}

impl Default for Format {
    fn default() -> Self {
        Self { precision: 9 }
    }
}
