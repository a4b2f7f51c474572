//! Coordinate space marker types.
//!
//! These are zero-sized types (ZSTs) used as type parameters to distinguish
//! between image pixels and calibrated plot values at compile time.

use std::fmt;

/// Marker type for pixel coordinates on the digitized image.
///
/// (0, 0) is the top-left corner; y grows downwards.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Marker type for data-space coordinates (the plot's own units).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Data {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // This is unreachable since Pixel has no variants
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // This is unreachable since Data has no variants
    }
}
