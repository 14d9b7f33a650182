//! # dng-out
//!
//! DNG output for raw CFA sensor data.
//!
//! This crate writes Bayer mosaic (color filter array) images into Adobe
//! Digital Negative files: DNG-flavored TIFF containers carrying the
//! calibration tags raw processors expect. It is the writing half of a
//! raw pipeline; decoding is somebody else's job.
//!
//! - **Streaming** - one scanline at a time, constant memory
//! - **Calibration tags** - CFA pattern, ColorMatrix1/2, AsShotNeutral,
//!   active area, with documented defaults when attributes are absent
//! - **Format conversion** - u8/u16/f16/f32 input rows, stored as 16-bit
//!   unsigned samples
//!
//! # Architecture
//!
//! - [`ImageOutput`] - session trait for scanline-oriented writers
//! - [`DngOutput`] - the DNG implementation
//! - [`write`] - one-call convenience for whole u16 images
//! - [`create_output`] - resolve a writer by format name or extension
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dng_out::{write, ImageSpec, PixelFormat};
//!
//! # fn main() -> dng_out::DngResult<()> {
//! let mut spec = ImageSpec::new(4, 4, PixelFormat::U16);
//! spec.attribute("raw:FilterPattern", "RGGB");
//!
//! let pixels = vec![0x2000u16; 16];
//! write("frame.dng", &spec, &pixels)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Session Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use dng_out::{DngOutput, ImageOutput, ImageSpec, OpenMode, PixelFormat};
//!
//! # fn main() -> dng_out::DngResult<()> {
//! let mut spec = ImageSpec::new(1920, 1080, PixelFormat::U16);
//! spec.attribute("raw:FilterPattern", "RGGB");
//! spec.attribute("raw:asShotNeutral", [0.81f32, 1.0, 0.91]);
//!
//! let mut out = DngOutput::new();
//! out.open(Path::new("frame_000001.dng"), &spec, OpenMode::Create)?;
//! let row = vec![0u8; 1920 * 2];
//! for y in 0..1080 {
//!     out.write_scanline(y, 0, PixelFormat::U16, &row, None)?;
//! }
//! out.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Produced Files
//!
//! Little-endian classic TIFF, single subimage, uncompressed, photometric
//! CFA, one 16-bit unsigned sample per pixel, strip height 1, top-left
//! orientation. Extension: `.dng`.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod attrs;
mod convert;
mod dng;
mod error;
mod output;
mod spec;
mod tiff;

pub use attrs::{AttrValue, Attrs};
pub use dng::{library_version, write, DngOutput};
pub use error::{DngError, DngResult};
pub use output::{create_output, ImageOutput};
pub use spec::{ImageSpec, OpenMode};

/// Pixel sample format for scanline input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit unsigned integer per channel.
    U8,
    /// 16-bit unsigned integer per channel.
    U16,
    /// 16-bit float per channel.
    F16,
    /// 32-bit float per channel.
    F32,
}

impl PixelFormat {
    /// Returns bytes per channel for this format.
    pub fn bytes_per_channel(&self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 | Self::F16 => 2,
            Self::F32 => 4,
        }
    }

    /// Returns true if this is a floating-point format.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::F16 | Self::F32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_format_sizes() {
        assert_eq!(PixelFormat::U8.bytes_per_channel(), 1);
        assert_eq!(PixelFormat::U16.bytes_per_channel(), 2);
        assert_eq!(PixelFormat::F16.bytes_per_channel(), 2);
        assert_eq!(PixelFormat::F32.bytes_per_channel(), 4);
        assert!(PixelFormat::F16.is_float());
        assert!(!PixelFormat::U16.is_float());
    }
}
