//! Fallback identifiers for rows that carry no invoice number.

use chrono::Utc;

/// Source of synthesized row identifiers.
pub trait IdGenerator: Send + Sync {
    /// Build an id for the row that would become the `index`-th accepted row.
    fn fallback_id(&self, prefix: &str, index: usize) -> String;
}

/// Stamps ids with the current time in milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockIdGenerator;

impl IdGenerator for ClockIdGenerator {
    fn fallback_id(&self, prefix: &str, index: usize) -> String {
        format!("{}-{}-{}", prefix, Utc::now().timestamp_millis(), index)
    }
}

/// Stamps every id with the same value. Useful for reproducible output.
#[derive(Debug, Clone, Copy)]
pub struct FixedStampIdGenerator {
    stamp: i64,
}

impl FixedStampIdGenerator {
    pub fn new(stamp: i64) -> Self {
        Self { stamp }
    }
}

impl IdGenerator for FixedStampIdGenerator {
    fn fallback_id(&self, prefix: &str, index: usize) -> String {
        format!("{}-{}-{}", prefix, self.stamp, index)
    }
}

impl<F> IdGenerator for F
where
    F: Fn(&str, usize) -> String + Send + Sync,
{
    fn fallback_id(&self, prefix: &str, index: usize) -> String {
        self(prefix, index)
    }
}
