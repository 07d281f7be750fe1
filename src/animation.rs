// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pairs ordered frames with their display times and hands the lot to
//! an encoder.

use error::{Error, Result};
use render::Raster;

/// How many times a player should run the animation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LoopCount {
    /// Forever.
    Infinite,
    /// This many times.
    Finite(u16),
}

/// Display time of each frame, in hundredths of a second.
#[derive(Clone, Debug, PartialEq)]
pub enum Delays {
    /// The same delay for every frame.
    Constant(u16),
    /// One delay per frame.
    PerFrame(Vec<u16>),
}

impl Delays {
    fn for_frame(&self, index: usize) -> u16 {
        match *self {
            Delays::Constant(delay) => delay,
            Delays::PerFrame(ref delays) => delays[index],
        }
    }
}

/// One frame of the finished animation.
#[derive(Debug)]
pub struct AnimationFrame {
    /// Palette indices.
    pub raster: Raster,
    /// Display time in hundredths of a second.
    pub delay: u16,
}

/// The ordered frames plus a loop count.
#[derive(Debug)]
pub struct Animation {
    /// Frames in display order.
    pub frames: Vec<AnimationFrame>,
    /// How often to play them.
    pub loop_count: LoopCount,
}

/// Something that can serialise a whole Animation.
pub trait AnimationEncoder {
    /// Writes `animation` out in full.
    fn encode(&mut self, animation: &Animation) -> Result<()>;
}

/// Builds Animations out of ordered rasters.
#[derive(Clone, Debug)]
pub struct Assembler {
    delays: Delays,
    loop_count: LoopCount,
}

impl Assembler {
    /// Constructor.
    pub fn new(delays: Delays, loop_count: LoopCount) -> Assembler {
        Assembler { delays, loop_count }
    }

    /// Pairs each raster with its delay.
    pub fn assemble(&self, rasters: Vec<Raster>) -> Result<Animation> {
        if let Delays::PerFrame(ref delays) = self.delays {
            if delays.len() != rasters.len() {
                return Err(Error::InvalidConfig(format!(
                    "{} delays given for {} frames",
                    delays.len(),
                    rasters.len()
                )));
            }
        }
        let frames = rasters
            .into_iter()
            .enumerate()
            .map(|(index, raster)| AnimationFrame {
                raster,
                delay: self.delays.for_frame(index),
            })
            .collect();
        Ok(Animation {
            frames,
            loop_count: self.loop_count,
        })
    }

    /// Assembles `rasters` and passes the result to `encoder`.  An
    /// empty run never reaches the encoder; that case returns
    /// `Ok(None)`.  Otherwise returns the number of frames encoded.
    pub fn deliver<E: AnimationEncoder + ?Sized>(
        &self,
        rasters: Vec<Raster>,
        encoder: &mut E,
    ) -> Result<Option<usize>> {
        if rasters.is_empty() {
            warn!("no frames to encode; nothing written");
            return Ok(None);
        }
        let animation = self.assemble(rasters)?;
        info!("encoding {} frames", animation.frames.len());
        encoder.encode(&animation)?;
        Ok(Some(animation.frames.len()))
    }
}
