//! Coarse per-style progress thresholds.
//!
//! Each style gets the thresholds `25, 50, 75, 100` when processing starts.
//! After every derivative that is actually generated, [`ProgressState::report`]
//! compares the running count against the total and hands back at most one
//! threshold, the smallest one reached:
//!
//! ```text
//! total = 4     count:  1    2    3    4
//!               report: 25%  50%  75%  100%
//!
//! total = 2     count:  1    2
//!               report: 25%  50%          (75 and 100 are never reached)
//! ```
//!
//! Reporting only one threshold per call means a run where few files are
//! generated may not reach 100%. Skipped files never report.

use std::collections::HashMap;

/// Percentages reported per style, in ascending order.
pub const THRESHOLDS: [u32; 4] = [25, 50, 75, 100];

/// Remaining thresholds for each style started in this run.
#[derive(Debug, Default)]
pub struct ProgressState {
    remaining: HashMap<String, Vec<u32>>,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset `style` to the full threshold list.
    pub fn start(&mut self, style: &str) {
        self.remaining.insert(style.to_string(), THRESHOLDS.to_vec());
    }

    /// Record that `count` of `total` files have been visited for `style`.
    ///
    /// Returns the smallest remaining threshold with
    /// `threshold × total ≤ count × 100` and consumes it, or `None`.
    pub fn report(&mut self, style: &str, count: usize, total: usize) -> Option<u32> {
        let remaining = self.remaining.get_mut(style)?;
        let next = *remaining.first()?;
        if next as u64 * total as u64 <= count as u64 * 100 {
            remaining.remove(0);
            Some(next)
        } else {
            None
        }
    }

    /// Thresholds not yet reported for `style`.
    #[cfg(test)]
    pub(crate) fn remaining(&self, style: &str) -> &[u32] {
        self.remaining.get(style).map(Vec::as_slice).unwrap_or(&[])
    }
}
