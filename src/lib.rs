#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Multibrot animator
//!
//! The Mandelbrot set takes a point `c` on the complex plane and
//! repeatedly applies `z = z^2 + c`, starting from zero, counting how
//! many steps it takes for `z` to run away.  The "multibrots" replace
//! the square with an arbitrary power `p`, and as `p` climbs the set
//! sprouts more and more lobes.  This crate draws one frame per value
//! of `p` (or per zoom level) and strings the frames together into an
//! animated GIF.
//!
//! Every frame is independent, so frames are rendered in parallel,
//! one whole frame per thread, with the number of frames in flight
//! capped by a permit pool.  Frames finish in whatever order they
//! like; each is dropped straight into its slot in the animation as
//! it arrives, and once every slot is filled the animation is handed
//! to the encoder.

extern crate crossbeam;
#[macro_use]
extern crate failure;
extern crate gif;
extern crate image;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

#[cfg(test)]
extern crate rand;

pub mod animation;
pub mod collector;
pub mod config;
pub mod encoder;
pub mod error;
pub mod palette;
pub mod pipeline;
pub mod planes;
pub mod pool;
pub mod render;
pub mod scheduler;

pub use animation::{Animation, AnimationEncoder, Assembler, Delays, LoopCount};
pub use collector::{Collector, FrameOrderer, Progress, ProgressLine};
pub use config::Config;
pub use encoder::GifEncoder;
pub use error::{Error, Result};
pub use palette::Palette;
pub use pipeline::{execute, render_frames, run};
pub use planes::{Domain, Endpoints};
pub use pool::{CancelToken, WorkerPool};
pub use render::{escape_time, Bailout, FrameResult, Raster, Renderer};
pub use scheduler::{FrameTask, Scheduler, SweepTarget};
