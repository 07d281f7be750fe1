// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Writes Animations as GIF89a streams.  Rasters already hold palette
//! indices, so frames go out as-is against a single global colour
//! table, with no quantisation step.

use std::borrow::Cow;
use std::io::Write;

use gif::{Repeat, SetParameter};

use animation::{Animation, AnimationEncoder, LoopCount};
use error::{Error, Result};
use palette::Palette;

/// A GIF encoder writing to `out`.
pub struct GifEncoder<W: Write> {
    out: W,
    palette: Palette,
}

impl<W: Write> GifEncoder<W> {
    /// Every frame is drawn against `palette`.
    pub fn new(out: W, palette: Palette) -> GifEncoder<W> {
        GifEncoder { out, palette }
    }

    /// Gives back the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

fn dimension(value: u32) -> Result<u16> {
    if value > u32::from(::std::u16::MAX) {
        return Err(Error::InvalidConfig(format!(
            "a GIF side is at most {} pixels, not {}",
            ::std::u16::MAX,
            value
        )));
    }
    Ok(value as u16)
}

impl<W: Write> AnimationEncoder for GifEncoder<W> {
    fn encode(&mut self, animation: &Animation) -> Result<()> {
        let (width, height) = match animation.frames.first() {
            Some(frame) => frame.raster.dimensions(),
            None => return Ok(()),
        };
        if animation
            .frames
            .iter()
            .any(|frame| frame.raster.dimensions() != (width, height))
        {
            return Err(Error::InvalidConfig(
                "every frame of an animation must be the same size".to_string(),
            ));
        }
        let (width, height) = (dimension(width)?, dimension(height)?);

        let colors = self.palette.to_rgb_bytes();
        {
            // The trailer is written when the gif encoder is dropped.
            let mut encoder = gif::Encoder::new(&mut self.out, width, height, &colors)?;
            encoder.set(match animation.loop_count {
                LoopCount::Infinite => Repeat::Infinite,
                LoopCount::Finite(n) => Repeat::Finite(n),
            })?;
            for (index, frame) in animation.frames.iter().enumerate() {
                let mut gif_frame = gif::Frame::default();
                gif_frame.width = width;
                gif_frame.height = height;
                gif_frame.delay = frame.delay;
                gif_frame.buffer = Cow::Borrowed(&*frame.raster);
                encoder.write_frame(&gif_frame)?;
                debug!("wrote frame {}", index);
            }
        }
        self.out.flush()?;
        Ok(())
    }
}
