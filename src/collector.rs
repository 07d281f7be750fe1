// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Gathers finished frames, in whatever order the workers finish
//! them, back into animation order.

use std::io::Write;
use std::time::Duration;

use crossbeam::channel::Receiver;

use error::{Error, Result};
use render::{FrameResult, Raster};

/// Told about every frame as it arrives.
pub trait Progress {
    /// `completed` of `total` frames have arrived.
    fn update(&mut self, completed: usize, total: usize);

    /// Every frame has arrived.
    fn finish(&mut self) {}
}

impl<F: FnMut(usize, usize)> Progress for F {
    fn update(&mut self, completed: usize, total: usize) {
        self(completed, total)
    }
}

/// Writes `Frame: completed / total` over itself on a terminal line.
pub struct ProgressLine<W: Write> {
    out: W,
}

impl<W: Write> ProgressLine<W> {
    /// Reports to `out`, usually standard error.
    pub fn new(out: W) -> ProgressLine<W> {
        ProgressLine { out }
    }

    /// Gives back the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

// A progress line that cannot be written is not worth failing a
// render over.
impl<W: Write> Progress for ProgressLine<W> {
    fn update(&mut self, completed: usize, total: usize) {
        let _ = write!(self.out, "\rFrame: {:4} / {}", completed, total);
        let _ = self.out.flush();
    }

    fn finish(&mut self) {
        let _ = writeln!(self.out);
        let _ = self.out.flush();
    }
}

/// Places each frame straight into its slot.  No sorting happens,
/// and a slot filled twice is an error rather than an overwrite.
#[derive(Debug)]
pub struct FrameOrderer {
    slots: Vec<Option<Raster>>,
    filled: usize,
}

impl FrameOrderer {
    /// Slots for frames `0..total`.
    pub fn with_capacity(total: usize) -> FrameOrderer {
        FrameOrderer {
            slots: (0..total).map(|_| None).collect(),
            filled: 0,
        }
    }

    /// Number of frames placed so far.
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Number of slots.
    pub fn total(&self) -> usize {
        self.slots.len()
    }

    /// True once every slot holds a frame.
    pub fn is_complete(&self) -> bool {
        self.filled == self.slots.len()
    }

    /// Takes ownership of `result` and files it under its sequence index.
    pub fn place(&mut self, result: FrameResult) -> Result<()> {
        let total = self.slots.len();
        let index = result.sequence_index;
        match self.slots.get_mut(index) {
            None => Err(Error::FrameOutOfRange { index, total }),
            Some(&mut Some(_)) => Err(Error::DuplicateFrame(index)),
            Some(slot) => {
                *slot = Some(result.raster);
                self.filled += 1;
                Ok(())
            }
        }
    }

    /// Hands over every frame in sequence order.
    pub fn into_ordered(self) -> Result<Vec<Raster>> {
        self.slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.ok_or(Error::MissingFrame(index)))
            .collect()
    }
}

/// Receives exactly `total` results from the worker pool.
#[derive(Copy, Clone, Debug)]
pub struct Collector {
    total: usize,
    timeout: Option<Duration>,
}

impl Collector {
    /// Waits for `total` frames, forever if need be.
    pub fn new(total: usize) -> Collector {
        Collector {
            total,
            timeout: None,
        }
    }

    /// Gives up if no frame arrives within `timeout` of the last one.
    pub fn with_timeout(self, timeout: Option<Duration>) -> Collector {
        Collector { timeout, ..self }
    }

    /// Blocks until all frames have arrived, reporting each to
    /// `progress`, and returns them in sequence order.
    ///
    /// Without a timeout, a worker that never finishes blocks this
    /// forever.  If every sender disconnects first, or the timeout
    /// passes, the result is `Error::StalledTask`.  An error sent by a
    /// worker is returned as is.
    pub fn collect<P: Progress + ?Sized>(
        &self,
        results: &Receiver<Result<FrameResult>>,
        progress: &mut P,
    ) -> Result<Vec<Raster>> {
        let mut orderer = FrameOrderer::with_capacity(self.total);
        while !orderer.is_complete() {
            let next = match self.timeout {
                None => results.recv().ok(),
                Some(timeout) => results.recv_timeout(timeout).ok(),
            };
            let placed = match next {
                Some(result) => result.and_then(|frame| {
                    debug!("received frame {}", frame.sequence_index);
                    orderer.place(frame)
                }),
                None => {
                    warn!(
                        "gave up waiting after {} of {} frames",
                        orderer.filled(),
                        self.total
                    );
                    Err(Error::StalledTask {
                        received: orderer.filled(),
                        total: self.total,
                    })
                }
            };
            if let Err(e) = placed {
                if orderer.filled() > 0 {
                    progress.finish();
                }
                return Err(e);
            }
            progress.update(orderer.filled(), self.total);
        }
        progress.finish();
        orderer.into_ordered()
    }
}
