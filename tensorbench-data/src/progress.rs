//! Coarse progress tracking for streamed downloads.
//!
//! Progress is reported at most once per chunk, when the cumulative byte
//! count reaches a multiple of ten percent that has not been reported yet.
//! Transfers without a usable declared length never report milestones.

use std::fmt;

const BYTES_PER_MEBIBYTE: f64 = 1_048_576.0;
const MILESTONE_STEP: u64 = 10;

/// Mutable state of one transfer.
///
/// # Examples
/// ```
/// use tensorbench_data::DownloadProgress;
///
/// let mut progress = DownloadProgress::new(Some(100));
/// assert!(progress.record(5).is_none());
/// let report = progress.record(20).expect("crossed 20 percent");
/// assert_eq!(report.percent(), 20);
/// assert_eq!(progress.received(), 25);
/// ```
#[derive(Clone, Debug)]
pub struct DownloadProgress {
    received: u64,
    total: Option<u64>,
    milestone: u64,
}

impl DownloadProgress {
    /// Starts tracking a transfer; a declared length of zero counts as unknown.
    #[must_use]
    pub fn new(total: Option<u64>) -> Self {
        Self {
            received: 0,
            total: total.filter(|bytes| *bytes > 0),
            milestone: 0,
        }
    }

    /// Adds `chunk_len` bytes and returns a report when a new milestone is
    /// reached.
    pub fn record(&mut self, chunk_len: usize) -> Option<ProgressReport> {
        let chunk = u64::try_from(chunk_len).unwrap_or(u64::MAX);
        self.received = self.received.saturating_add(chunk);
        let total = self.total?;

        let percent = self.received.saturating_mul(100).checked_div(total)?.min(100);
        let reached = percent
            .checked_div(MILESTONE_STEP)?
            .saturating_mul(MILESTONE_STEP);
        if reached <= self.milestone {
            return None;
        }
        self.milestone = reached;
        Some(ProgressReport {
            received: self.received,
            total,
            percent: reached,
        })
    }

    /// Bytes received so far.
    #[must_use]
    pub const fn received(&self) -> u64 {
        self.received
    }

    /// Declared transfer length, if the server supplied a non-zero one.
    #[must_use]
    pub const fn total(&self) -> Option<u64> {
        self.total
    }
}

/// A milestone crossed during a transfer.
///
/// Displays as ` {received} / {total} MB ({percent} %)` with megabytes to one
/// decimal place.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProgressReport {
    received: u64,
    total: u64,
    percent: u64,
}

impl ProgressReport {
    /// Bytes received when the milestone was reached.
    #[must_use]
    pub const fn received(&self) -> u64 {
        self.received
    }

    /// Declared transfer length.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Milestone reached, a multiple of ten between 10 and 100.
    #[must_use]
    pub const fn percent(&self) -> u64 {
        self.percent
    }
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            " {:.1} / {:.1} MB ({} %)",
            mebibytes(self.received),
            mebibytes(self.total),
            self.percent
        )
    }
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "megabyte figures are display-only and rounded to one decimal"
)]
pub(crate) fn mebibytes(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MEBIBYTE
}
