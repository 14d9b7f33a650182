//! Scanline sample conversion.
//!
//! Converts one row of caller-format samples into the session's native
//! 16-bit unsigned representation, honoring an arbitrary byte stride
//! between samples. The output lands in a caller-provided scratch vector
//! so sessions can reuse one allocation across rows.
//!
//! Scaling conventions: u8 widens by bit replication (0xff -> 0xffff),
//! u16 passes through, f16/f32 clamp to [0, 1] and scale to 65535. No
//! dithering is applied at a 16-bit target depth.

use half::f16;

use crate::error::{DngError, DngResult};
use crate::PixelFormat;

/// Converts one scanline into `out` as native u16 samples.
///
/// `data` holds `width` samples of `format` in native byte order, spaced
/// `xstride` bytes apart. `out` is cleared and refilled; its previous
/// contents are discarded.
pub(crate) fn to_native_u16(
    format: PixelFormat,
    data: &[u8],
    xstride: usize,
    width: usize,
    out: &mut Vec<u16>,
) -> DngResult<()> {
    let sample_bytes = format.bytes_per_channel();
    if xstride < sample_bytes {
        return Err(DngError::InvalidArgument(format!(
            "xstride {} smaller than one {:?} sample ({} bytes)",
            xstride, format, sample_bytes
        )));
    }

    if width == 0 {
        out.clear();
        return Ok(());
    }

    let needed = (width - 1) * xstride + sample_bytes;
    if data.len() < needed {
        return Err(DngError::DimensionMismatch {
            expected: needed,
            actual: data.len(),
        });
    }

    out.clear();
    out.reserve(width);
    for i in 0..width {
        let off = i * xstride;
        let v = match format {
            PixelFormat::U8 => u16::from(data[off]) * 257,
            PixelFormat::U16 => u16::from_ne_bytes([data[off], data[off + 1]]),
            PixelFormat::F16 => {
                let h = f16::from_ne_bytes([data[off], data[off + 1]]);
                (h.to_f32().clamp(0.0, 1.0) * 65535.0) as u16
            }
            PixelFormat::F32 => {
                let x = f32::from_ne_bytes([
                    data[off],
                    data[off + 1],
                    data[off + 2],
                    data[off + 3],
                ]);
                (x.clamp(0.0, 1.0) * 65535.0) as u16
            }
        };
        out.push(v);
    }
    Ok(())
}
