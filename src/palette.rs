// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The fixed colour table every frame is indexed into.

use image::Rgb;

use error::{Error, Result};

/// The largest table an indexed GIF frame can address.
pub const MAX_COLORS: usize = 256;

/// An ordered, immutable table of between 1 and 256 colours.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: Vec<Rgb<u8>>,
}

impl Default for Palette {
    fn default() -> Palette {
        Palette::plan9()
    }
}

impl Palette {
    /// Wraps a caller-supplied colour table.
    pub fn new(colors: Vec<Rgb<u8>>) -> Result<Palette> {
        if colors.is_empty() || colors.len() > MAX_COLORS {
            return Err(Error::InvalidConfig(format!(
                "a palette needs between 1 and {} colours, not {}",
                MAX_COLORS,
                colors.len()
            )));
        }
        Ok(Palette { colors })
    }

    /// The 256-colour Plan 9 colour map: a 4x4x4 RGB cube crossed
    /// with four brightness levels, with the achromatic corner of
    /// each level replaced by a grey ramp.
    pub fn plan9() -> Palette {
        let mut colors = Vec::with_capacity(MAX_COLORS);
        for r in 0..4u32 {
            for v in 0..4u32 {
                for g in 0..4u32 {
                    for b in 0..4u32 {
                        let den = r.max(g).max(b);
                        let rgb = if den == 0 {
                            let grey = (v * 17) as u8;
                            [grey, grey, grey]
                        } else {
                            let num = 17 * (4 * den + v);
                            [
                                (r * num / den) as u8,
                                (g * num / den) as u8,
                                (b * num / den) as u8,
                            ]
                        };
                        colors.push(Rgb(rgb));
                    }
                }
            }
        }
        Palette { colors }
    }

    /// Number of colours.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Never true for a constructed palette; present for symmetry with len.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The colour at `index`.
    pub fn get(&self, index: usize) -> Option<&Rgb<u8>> {
        self.colors.get(index)
    }

    /// Folds an iteration count onto the table.
    #[inline]
    pub fn index_for(&self, iterations: usize) -> u8 {
        (iterations % self.colors.len()) as u8
    }

    /// The table flattened to `r, g, b, r, g, b, ...` bytes.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.colors.iter().flat_map(|c| c.0.iter().cloned()).collect()
    }
}
