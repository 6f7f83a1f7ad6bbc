#![forbid(unsafe_code)]

//! Synthetic node ids for sub-layouts whose natural id is taken.

use std::time::Duration;

use crate::toolkit::Clock;

const STEP: Duration = Duration::from_micros(1);

/// Clock-derived id source. Successive ids strictly advance even when the
/// clock stalls or goes backwards.
#[derive(Debug, Clone, Default)]
pub struct SyntheticIds {
    last: Option<Duration>,
}

impl SyntheticIds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next candidate, formatted `"{secs}.{micros:06}"`.
    pub fn next_id(&mut self, clock: &dyn Clock) -> String {
        let now = truncate_to_micros(clock.now());
        let stamp = match self.last {
            Some(last) if now <= last => last + STEP,
            _ => now,
        };
        self.last = Some(stamp);
        format!("{}.{:06}", stamp.as_secs(), stamp.subsec_micros())
    }

    /// Draw candidates until `taken` rejects none.
    pub fn unique(&mut self, clock: &dyn Clock, mut taken: impl FnMut(&str) -> bool) -> String {
        loop {
            let candidate = self.next_id(clock);
            if !taken(&candidate) {
                return candidate;
            }
            tracing::debug!(
                target: "sbx.dispatch",
                candidate = %candidate,
                "synthetic id collides, retrying"
            );
        }
    }
}

fn truncate_to_micros(value: Duration) -> Duration {
    Duration::new(value.as_secs(), value.subsec_micros() * 1_000)
}
