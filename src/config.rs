// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The run configuration.  Built once, validated once, and then lent
//! to every stage of the pipeline.

use std::time::Duration;

use animation::LoopCount;
use error::{Error, Result};
use palette::Palette;
use planes::{Domain, Endpoints};
use render::Bailout;
use scheduler::SweepTarget;

/// Every knob a run exposes.  `Config::default()` matches the
/// defaults of the command line.
#[derive(Clone, Debug)]
pub struct Config {
    /// Width and height of every (square) frame, in pixels.
    pub dimension: usize,
    /// Number of frames in the animation.
    pub frames: usize,
    /// Delay between frames in hundredths of a second.
    pub delay: u16,
    /// Maximum iterations per pixel.
    pub iterations: usize,
    /// First value of the sweep.
    pub power_start: f64,
    /// Last value of the sweep.
    pub power_end: f64,
    /// What the sweep varies.
    pub sweep: SweepTarget,
    /// The exponent used when the sweep is not over the exponent.
    pub exponent: f64,
    /// The region drawn when the sweep is not over the extent.
    pub domain: Domain,
    /// Interpolation convention for both pixels and frames.
    pub endpoints: Endpoints,
    /// The escape test.
    pub bailout: Bailout,
    /// Maximum number of frames rendered at once.
    pub threads: usize,
    /// GIF loop count.  `None` means one loop per frame.
    pub loops: Option<LoopCount>,
    /// Longest wait for the next finished frame.  `None` waits forever.
    pub frame_timeout: Option<Duration>,
    /// The colour table.
    pub palette: Palette,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            dimension: 1000,
            frames: 1000,
            delay: 2,
            iterations: 1000,
            power_start: 2.0,
            power_end: 10.0,
            sweep: SweepTarget::default(),
            exponent: 2.0,
            domain: Domain::default(),
            endpoints: Endpoints::default(),
            bailout: Bailout::default(),
            threads: ::num_cpus::get(),
            loops: None,
            frame_timeout: None,
            palette: Palette::default(),
        }
    }
}

impl Config {
    /// Checks the sweep first, so an inverted range is always the
    /// error reported for it, and then everything else.
    pub fn validate(&self) -> Result<()> {
        let finite = self.power_start.is_finite() && self.power_end.is_finite();
        if !(finite && self.power_start <= self.power_end) {
            return Err(Error::InvalidParameterRange {
                start: self.power_start,
                end: self.power_end,
            });
        }
        if self.dimension == 0 || self.dimension > usize::from(::std::u16::MAX) {
            return Err(Error::InvalidConfig(format!(
                "dimension must be between 1 and {}, not {}",
                ::std::u16::MAX,
                self.dimension
            )));
        }
        if self.iterations == 0 {
            return Err(Error::InvalidConfig(
                "iterations must be at least 1".to_string(),
            ));
        }
        if !self.exponent.is_finite() {
            return Err(Error::InvalidConfig("exponent must be finite".to_string()));
        }
        if self.sweep == SweepTarget::Extent && !(self.power_start >= 0.0) {
            return Err(Error::InvalidConfig(
                "an extent sweep must start at or above zero".to_string(),
            ));
        }
        if let Bailout::Radius(r) = self.bailout {
            if !(r.is_finite() && r > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "bailout radius must be positive and finite, not {}",
                    r
                )));
            }
        }
        self.domain.validate()
    }

    /// The loop count actually written to the animation.
    pub fn loop_count(&self) -> LoopCount {
        self.loops.unwrap_or_else(|| {
            LoopCount::Finite(self.frames.min(usize::from(::std::u16::MAX)) as u16)
        })
    }
}
