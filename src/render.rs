// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time kernel.  A frame is rendered start to finish by a
//! single thread; the pool parallelises across frames, never within
//! one.

use image::{ImageBuffer, Luma};
use itertools::iproduct;
use num::Complex;

use error::{Error, Result};
use palette::Palette;
use planes::{Domain, Endpoints, Pixel, PlaneMapper};
use pool::CancelToken;
use scheduler::FrameTask;

/// One palette index per pixel, row-major.
pub type Raster = ImageBuffer<Luma<u8>, Vec<u8>>;

/// The escape test applied to `|z|`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Bailout {
    /// Escape once `|z|` reaches the domain's right edge.  Not the
    /// textbook radius of 2; the classic animations depend on it.
    DomainBound,
    /// Escape once `|z|` reaches a fixed radius.
    Radius(f64),
}

impl Default for Bailout {
    fn default() -> Bailout {
        Bailout::DomainBound
    }
}

impl Bailout {
    /// The threshold for a frame drawn over `domain`.
    pub fn threshold(self, domain: &Domain) -> f64 {
        match self {
            Bailout::DomainBound => domain.x_max,
            Bailout::Radius(r) => r,
        }
    }
}

/// A finished frame, tagged with where it belongs in the animation.
#[derive(Debug)]
pub struct FrameResult {
    /// Copied from the FrameTask that produced it.
    pub sequence_index: usize,
    /// The pixels.
    pub raster: Raster,
}

/// Iterates `z = z^exponent + c` from `z = 0` while `|z|` stays below
/// `threshold`, up to `cap` times.  Returns the number of iterations
/// performed, which is always in `0..=cap`.
#[inline]
pub fn escape_time(c: Complex<f64>, exponent: f64, cap: usize, threshold: f64) -> usize {
    let mut z: Complex<f64> = Complex { re: 0.0, im: 0.0 };
    let mut iterations = 0;
    while iterations < cap && z.norm() < threshold {
        z = if exponent == 2.0 {
            z * z + c
        } else {
            z.powf(exponent) + c
        };
        iterations += 1;
    }
    iterations
}

/// Draws FrameTasks.  Holds only borrowed, read-only state, so one
/// renderer is shared by every worker.
#[derive(Copy, Clone, Debug)]
pub struct Renderer<'a> {
    palette: &'a Palette,
    bailout: Bailout,
    endpoints: Endpoints,
}

impl<'a> Renderer<'a> {
    /// Constructor.
    pub fn new(palette: &'a Palette, bailout: Bailout, endpoints: Endpoints) -> Renderer<'a> {
        Renderer {
            palette,
            bailout,
            endpoints,
        }
    }

    /// Renders one frame to completion.
    pub fn render(&self, task: &FrameTask) -> Result<FrameResult> {
        self.render_until(task, &CancelToken::new())
    }

    /// Renders one frame, checking `cancel` at the start of every row.
    /// Returns `Error::Cancelled` if the token fired first.
    pub fn render_until(&self, task: &FrameTask, cancel: &CancelToken) -> Result<FrameResult> {
        let plane = PlaneMapper::new(task.width, task.height, task.domain, self.endpoints)?;
        let threshold = self.bailout.threshold(&task.domain);
        let mut pixels = Vec::with_capacity(plane.len());
        for (row, column) in iproduct!(0..task.height, 0..task.width) {
            if column == 0 && cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let c = plane.pixel_to_point(&Pixel(column, row));
            let iterations = escape_time(c, task.exponent, task.iteration_cap, threshold);
            pixels.push(self.palette.index_for(iterations));
        }
        let raster = ImageBuffer::from_raw(task.width as u32, task.height as u32, pixels)
            .ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "a {}x{} frame does not fit in a raster",
                    task.width, task.height
                ))
            })?;
        Ok(FrameResult {
            sequence_index: task.sequence_index,
            raster,
        })
    }
}
