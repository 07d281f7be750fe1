// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turns a run configuration into the ordered list of frames to draw.
//! Each frame differs from its neighbours only in the swept parameter.

use config::Config;
use error::Result;
use planes::{Domain, Endpoints};

/// Which knob the animation turns from one frame to the next.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SweepTarget {
    /// The exponent `p` in `z = z^p + c`.
    Exponent,
    /// The half-width of a square domain centred on the origin.
    Extent,
}

impl Default for SweepTarget {
    fn default() -> SweepTarget {
        SweepTarget::Exponent
    }
}

/// Everything one worker needs to draw one frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameTask {
    /// Position of the frame in the finished animation.
    pub sequence_index: usize,
    /// The region of the complex plane to draw.
    pub domain: Domain,
    /// The exponent of the recurrence.
    pub exponent: f64,
    /// Maximum iterations per pixel.
    pub iteration_cap: usize,
    /// Raster width in pixels.
    pub width: usize,
    /// Raster height in pixels.
    pub height: usize,
}

/// A validated, restartable source of FrameTasks.
#[derive(Clone, Debug)]
pub struct Scheduler {
    total: usize,
    start: f64,
    end: f64,
    target: SweepTarget,
    endpoints: Endpoints,
    exponent: f64,
    domain: Domain,
    iteration_cap: usize,
    width: usize,
    height: usize,
}

impl Scheduler {
    /// Validates the configuration.  An inverted sweep is refused
    /// here, so no task ever exists for it.
    pub fn new(config: &Config) -> Result<Scheduler> {
        config.validate()?;
        Ok(Scheduler {
            total: config.frames,
            start: config.power_start,
            end: config.power_end,
            target: config.sweep,
            endpoints: config.endpoints,
            exponent: config.exponent,
            domain: config.domain,
            iteration_cap: config.iterations,
            width: config.dimension,
            height: config.dimension,
        })
    }

    /// The number of frames in the run.
    pub fn len(&self) -> usize {
        self.total
    }

    /// True for a run with no frames.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// The value of the swept parameter on frame `index`.
    pub fn parameter(&self, index: usize) -> f64 {
        self.endpoints.lerp(self.start, self.end, index, self.total)
    }

    /// The task for frame `index`.
    pub fn task(&self, index: usize) -> FrameTask {
        let value = self.parameter(index);
        let (domain, exponent) = match self.target {
            SweepTarget::Exponent => (self.domain, value),
            SweepTarget::Extent => (Domain::square(value), self.exponent),
        };
        FrameTask {
            sequence_index: index,
            domain,
            exponent,
            iteration_cap: self.iteration_cap,
            width: self.width,
            height: self.height,
        }
    }

    /// A fresh, lazy pass over every task, in sequence order.
    pub fn tasks<'a>(&'a self) -> impl ExactSizeIterator<Item = FrameTask> + 'a {
        (0..self.total).map(move |index| self.task(index))
    }
}
