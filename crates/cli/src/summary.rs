use monotime::Duration;

/// Spread of a set of timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub min: Duration,
    pub mean: Duration,
    pub max: Duration,
}

impl Summary {
    /// `None` for an empty set.
    pub fn of(samples: &[Duration]) -> Option<Self> {
        let min = samples.iter().min().copied()?;
        let max = samples.iter().max().copied()?;
        let count = i64::try_from(samples.len()).ok()?;
        let total: Duration = samples.iter().sum();
        Some(Self {
            min,
            mean: total / count,
            max,
        })
    }
}
