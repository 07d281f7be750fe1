// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a rectangle on the complex plane bounded by a Domain.  The
//! same Endpoints convention that places pixels on the plane also
//! places frames along a parameter sweep, so both live here.

use num::Complex;

use error::{Error, Result};

/// How a position `i` out of `n` is turned into a fraction of a
/// span.  Used both for pixels across the domain and for frames
/// across a sweep, so the two can never disagree.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Endpoints {
    /// `i / (n - 1)`: the last position lands exactly on the end of
    /// the span.  A span of one position stays at its start.
    Inclusive,
    /// `i / n`: the end of the span is never reached.
    Exclusive,
}

impl Default for Endpoints {
    fn default() -> Endpoints {
        Endpoints::Inclusive
    }
}

impl Endpoints {
    /// Fraction of the span covered by position `i` of `n`.
    pub fn fraction(self, i: usize, n: usize) -> f64 {
        match self {
            Endpoints::Inclusive if n > 1 => (i as f64) / ((n - 1) as f64),
            Endpoints::Exclusive if n > 0 => (i as f64) / (n as f64),
            _ => 0.0,
        }
    }

    /// Linear interpolation from `start` towards `end`.
    pub fn lerp(self, start: f64, end: f64, i: usize, n: usize) -> f64 {
        start + (end - start) * self.fraction(i, n)
    }
}

/// A rectangle on the complex plane, with the real part as x and
/// the imaginary part as y.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Domain {
    /// Left edge.
    pub x_min: f64,
    /// Right edge.  Also the default escape threshold.
    pub x_max: f64,
    /// Bottom edge.
    pub y_min: f64,
    /// Top edge.
    pub y_max: f64,
}

impl Default for Domain {
    fn default() -> Domain {
        Domain::square(2.0)
    }
}

impl Domain {
    /// A square of half-width `extent` centred on the origin.
    pub fn square(extent: f64) -> Domain {
        Domain {
            x_min: -extent,
            x_max: extent,
            y_min: -extent,
            y_max: extent,
        }
    }

    /// Rejects rectangles whose corners are the wrong way around.
    pub fn validate(&self) -> Result<()> {
        let edges = [self.x_min, self.x_max, self.y_min, self.y_max];
        if !edges.iter().all(|e| e.is_finite()) {
            return Err(Error::InvalidConfig(
                "Every edge of the domain must be a finite number.".to_string(),
            ));
        }
        if !(self.x_min <= self.x_max) {
            return Err(Error::InvalidConfig(
                "The left edge of the domain is not to the left of the right edge.".to_string(),
            ));
        }
        if !(self.y_min <= self.y_max) {
            return Err(Error::InvalidConfig(
                "The bottom edge of the domain is not below the top edge.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the x, y of a pixel in an integral plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Maps pixels of an integral plane onto a Domain.
#[derive(Debug)]
pub struct PlaneMapper {
    /// The size of the integral cartesian plane.
    pub integral_plane: IntegralPlane,
    /// The rectangle of the complex plane the pixels cover.
    pub domain: Domain,
    endpoints: Endpoints,
}

impl PlaneMapper {
    /// Constructor.  Fails if the domain's corners are swapped.
    pub fn new(
        width: usize,
        height: usize,
        domain: Domain,
        endpoints: Endpoints,
    ) -> Result<PlaneMapper> {
        domain.validate()?;
        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            domain,
            endpoints,
        })
    }

    /// The total number of points in the integral grid.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.integral_plane.0 == 0 || self.integral_plane.1 == 0
    }

    /// Real part of every point in pixel column `column`.
    #[inline]
    pub fn column_to_re(&self, column: usize) -> f64 {
        self.endpoints.lerp(
            self.domain.x_min,
            self.domain.x_max,
            column,
            self.integral_plane.0,
        )
    }

    /// Imaginary part of every point in pixel row `row`.
    #[inline]
    pub fn row_to_im(&self, row: usize) -> f64 {
        self.endpoints.lerp(
            self.domain.y_min,
            self.domain.y_max,
            row,
            self.integral_plane.1,
        )
    }

    /// Given a pixel on the integral cartesian plane, map it to the
    /// corresponding point on the complex plane.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(self.column_to_re(pixel.0), self.row_to_im(pixel.1))
    }
}
