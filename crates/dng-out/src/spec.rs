//! Image specification consumed by output sessions.
//!
//! [`ImageSpec`] describes the image a host wants written: data window,
//! full (display) window, channel count, sample format, and an open-ended
//! attribute map. Writers never mutate the caller's spec; they normalize a
//! private working copy on open.

use crate::attrs::{AttrValue, Attrs};
use crate::PixelFormat;

/// Mode flag for opening an output session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Create or truncate the destination file.
    #[default]
    Create,
    /// Append a further subimage to an existing file.
    AppendSubimage,
}

/// Semantic description of an image to be written.
///
/// The data window (`x`, `y`, `width`, `height`) is the stored pixel
/// region; the full window (`full_*`) is the display window it sits in.
/// The two coincide unless a host sets them apart.
///
/// # Example
///
/// ```rust
/// use dng_out::{ImageSpec, PixelFormat};
///
/// let mut spec = ImageSpec::new(1920, 1080, PixelFormat::U16);
/// spec.attribute("raw:FilterPattern", "RGGB");
/// assert_eq!(spec.full_width, 1920);
/// ```
#[derive(Debug, Clone)]
pub struct ImageSpec {
    /// Data window origin, x.
    pub x: i32,
    /// Data window origin, y.
    pub y: i32,
    /// Data window width in pixels.
    pub width: u32,
    /// Data window height in pixels.
    pub height: u32,
    /// Full (display) window origin, x.
    pub full_x: i32,
    /// Full (display) window origin, y.
    pub full_y: i32,
    /// Full (display) window width in pixels.
    pub full_width: u32,
    /// Full (display) window height in pixels.
    pub full_height: u32,
    /// Number of channels per pixel.
    pub nchannels: u32,
    /// Sample format.
    pub format: PixelFormat,
    /// Typed attributes (calibration inputs and host pass-through).
    pub attrs: Attrs,
}

impl ImageSpec {
    /// Creates a spec with the given dimensions and format.
    ///
    /// The full window defaults to the data window at origin (0, 0) and
    /// the channel count to 1.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
            full_x: 0,
            full_y: 0,
            full_width: width,
            full_height: height,
            nchannels: 1,
            format,
            attrs: Attrs::new(),
        }
    }

    /// Sets an attribute value. Shorthand for `spec.attrs.set(..)`.
    #[inline]
    pub fn attribute(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.attrs.set(key, value);
    }

    /// Resolves a caller-supplied x-stride, substituting the packed
    /// default (sample size x channel count) for `None`.
    #[inline]
    pub fn resolve_xstride(&self, xstride: Option<usize>, format: PixelFormat) -> usize {
        xstride.unwrap_or(format.bytes_per_channel() * self.nchannels as usize)
    }

    /// Bytes in one packed scanline of this spec's own format.
    #[inline]
    pub fn scanline_bytes(&self) -> usize {
        self.width as usize * self.nchannels as usize * self.format.bytes_per_channel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_window_defaults_to_data_window() {
        let spec = ImageSpec::new(640, 480, PixelFormat::U16);
        assert_eq!(spec.full_x, 0);
        assert_eq!(spec.full_y, 0);
        assert_eq!(spec.full_width, 640);
        assert_eq!(spec.full_height, 480);
        assert_eq!(spec.nchannels, 1);
    }

    #[test]
    fn test_resolve_xstride() {
        let spec = ImageSpec::new(16, 16, PixelFormat::U16);
        assert_eq!(spec.resolve_xstride(None, PixelFormat::U16), 2);
        assert_eq!(spec.resolve_xstride(None, PixelFormat::F32), 4);
        assert_eq!(spec.resolve_xstride(Some(8), PixelFormat::U16), 8);
    }

    #[test]
    fn test_scanline_bytes() {
        let spec = ImageSpec::new(640, 480, PixelFormat::U16);
        assert_eq!(spec.scanline_bytes(), 1280);
    }
}
