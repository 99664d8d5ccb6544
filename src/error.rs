//! Error types and the per-document sticky error slot.
//!
//! Layout calls do not return `Result`: every placement failure is funneled
//! into the document's single [`ErrorSlot`] so long call sequences can be
//! written without a check after each line. The slot is surfaced once, by
//! [`Composer::finish`](crate::compose::Composer::finish).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All failure kinds the layout engine can produce.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// A cursor or geometry coordinate fell outside its valid interval.
    #[error("{what} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        what: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    /// A bad call argument: unknown alignment code, non-positive cell size,
    /// zero image scale, negative margin, and the like.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Two parallel slices that must line up have different lengths.
    #[error("{left} has {left_len} entries but {right} has {right_len}")]
    DimensionMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    /// An image resource declared a content type outside jpeg/png/gif.
    #[error("unsupported image format {0:?}")]
    UnsupportedFormat(String),

    /// An image was placed before being registered.
    #[error("image {0:?} is not registered")]
    NotRegistered(String),

    /// The footer content function reported a start position outside the
    /// band between body start and page bottom.
    #[error("footer band started at y = {y}, outside ({min}, {max}]")]
    LayoutOverflow { y: f32, min: f32, max: f32 },

    /// An image resource could not be fetched or decoded.
    #[error("image fetch failed: {0}")]
    ImageFetch(String),
}

/// How the sticky slot treats errors after the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// First error wins; every later placement call becomes a no-op.
    #[default]
    Strict,
    /// Calls keep executing and a later error overwrites an earlier one.
    /// Useful for inspecting partial output while debugging.
    Lenient,
}

/// The single per-document error slot.
#[derive(Debug)]
pub struct ErrorSlot {
    mode: ErrorMode,
    slot: Option<LayoutError>,
}

impl ErrorSlot {
    pub fn new(mode: ErrorMode) -> Self {
        Self { mode, slot: None }
    }

    /// Record an error according to the mode: strict keeps the first value,
    /// lenient lets the last write win.
    pub fn set(&mut self, err: LayoutError) {
        match self.mode {
            ErrorMode::Strict => {
                if self.slot.is_none() {
                    self.slot = Some(err);
                }
            }
            ErrorMode::Lenient => self.slot = Some(err),
        }
    }

    /// True when placement calls must be skipped (strict mode with an error
    /// already recorded).
    pub fn halted(&self) -> bool {
        self.mode == ErrorMode::Strict && self.slot.is_some()
    }

    pub fn is_ok(&self) -> bool {
        self.slot.is_none()
    }

    pub fn get(&self) -> Option<&LayoutError> {
        self.slot.as_ref()
    }

    pub fn into_inner(self) -> Option<LayoutError> {
        self.slot
    }
}
