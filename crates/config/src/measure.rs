#![forbid(unsafe_code)]

use monotime::Duration;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Measure {
    /// How many times `mtime measure` runs the command.
    pub runs: u32,

    /// Pause between consecutive runs, e.g. `"250ms"`.
    pub pause: Duration,
}

impl Default for Measure {
    fn default() -> Self {
        Self {
            runs: 1,
            pause: Duration::ZERO,
        }
    }
}
