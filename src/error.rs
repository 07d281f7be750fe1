// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The single error type shared by every stage of the pipeline.

use std::io;

/// Everything that can go wrong between reading the configuration
/// and writing the last byte of the animation.
#[derive(Debug, Fail)]
pub enum Error {
    /// The end of a parameter sweep lies before its start.  Checked
    /// before any frame is scheduled.
    #[fail(
        display = "powerEnd ({}) must not be less than powerStart ({})",
        end, start
    )]
    InvalidParameterRange {
        /// First value of the sweep.
        start: f64,
        /// Last value of the sweep.
        end: f64,
    },

    /// Some other configuration value is unusable.
    #[fail(display = "invalid configuration: {}", _0)]
    InvalidConfig(String),

    /// Fewer results arrived than tasks were submitted, either because
    /// every worker went away or because the per-frame deadline passed.
    #[fail(display = "stalled after {} of {} frames", received, total)]
    StalledTask {
        /// Results received before the stall.
        received: usize,
        /// Results expected.
        total: usize,
    },

    /// A render was abandoned because the run was being torn down.
    /// Never escapes the pipeline.
    #[fail(display = "frame render was cancelled")]
    Cancelled,

    /// A render thread panicked.
    #[fail(display = "a render worker panicked")]
    WorkerPanicked,

    /// Two results claimed the same sequence index.
    #[fail(display = "frame {} was delivered twice", _0)]
    DuplicateFrame(usize),

    /// A result claimed an index outside the run.
    #[fail(display = "frame {} is outside 0..{}", index, total)]
    FrameOutOfRange {
        /// The offending sequence index.
        index: usize,
        /// Number of frames in the run.
        total: usize,
    },

    /// A slot was still empty when ordering finished.
    #[fail(display = "frame {} was never delivered", _0)]
    MissingFrame(usize),

    /// The encoder, or the stream under it, rejected the animation.
    #[fail(display = "encoding failed: {}", _0)]
    EncodingFailure(#[cause] io::Error),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::EncodingFailure(err)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = ::std::result::Result<T, Error>;
