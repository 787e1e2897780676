//! Progress readings derived from status frames.
//!
//! The bar always has a max of 100.  The value placed on it is the
//! `progress / duration` ratio scaled by that max, so a frame halfway
//! through a track reads 50 of 100 rather than 0.5 of 100.

use listen_proto::protocol::StatusFrame;

/// Fixed scale of the progress bar.
pub const PROGRESS_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressReading {
    ratio: f64,
}

impl ProgressReading {
    /// `None` when the frame has no usable duration.
    pub fn from_status(frame: &StatusFrame) -> Option<Self> {
        frame.ratio().map(|ratio| Self {
            ratio: ratio.clamp(0.0, 1.0),
        })
    }

    /// 0.0..=1.0
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Position on the 0..=[`PROGRESS_MAX`] scale.
    pub fn value(&self) -> f64 {
        self.ratio * PROGRESS_MAX
    }

    pub fn max(&self) -> f64 {
        PROGRESS_MAX
    }

    pub fn percent_label(&self) -> String {
        format!("{:.0}%", self.value())
    }
}
