//! DNG output writer.
//!
//! Writes raw Bayer CFA sensor data as a DNG-flavored TIFF: little-endian,
//! single subimage, uncompressed, photometric CFA, one 16-bit sample per
//! pixel, strip height of one row. Calibration metadata (filter pattern,
//! color matrices, as-shot neutral) comes from spec attributes and falls
//! back to documented defaults when absent.
//!
//! # Consumed attributes
//!
//! | Attribute | Type | Default |
//! |-----------|------|---------|
//! | `raw:FilterPattern` | string | all-Red pattern |
//! | `raw:ColorMatrix1` | 3x3 matrix | identity |
//! | `raw:ColorMatrix2` | 3x3 matrix | tag omitted |
//! | `raw:asShotNeutral` | color triple | {1, 1, 1} |
//!
//! An attribute of the wrong type counts as absent.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use dng_out::{DngOutput, ImageOutput, ImageSpec, OpenMode, PixelFormat};
//!
//! # fn main() -> dng_out::DngResult<()> {
//! let mut spec = ImageSpec::new(64, 48, PixelFormat::U16);
//! spec.attribute("raw:FilterPattern", "RGGB");
//!
//! let mut out = DngOutput::new();
//! out.open(Path::new("frame.dng"), &spec, OpenMode::Create)?;
//! let row = vec![0u8; 64 * 2];
//! for y in 0..48 {
//!     out.write_scanline(y, 0, PixelFormat::U16, &row, None)?;
//! }
//! out.close()?;
//! # Ok(())
//! # }
//! ```

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::convert;
use crate::error::{DngError, DngResult};
use crate::output::ImageOutput;
use crate::spec::{ImageSpec, OpenMode};
use crate::tiff::{TagValue, TiffSink};
use crate::PixelFormat;

// === DNG/TIFF tag numbers ===

const TAG_NEW_SUBFILE_TYPE: u16 = 254;
const TAG_IMAGE_WIDTH: u16 = 256;
const TAG_IMAGE_LENGTH: u16 = 257;
const TAG_BITS_PER_SAMPLE: u16 = 258;
const TAG_COMPRESSION: u16 = 259;
const TAG_PHOTOMETRIC: u16 = 262;
const TAG_MAKE: u16 = 271;
const TAG_MODEL: u16 = 272;
const TAG_ORIENTATION: u16 = 274;
const TAG_SAMPLES_PER_PIXEL: u16 = 277;
const TAG_ROWS_PER_STRIP: u16 = 278;
const TAG_PLANAR_CONFIG: u16 = 284;
const TAG_SAMPLE_FORMAT: u16 = 339;
const TAG_CFA_REPEAT_PATTERN_DIM: u16 = 33421;
const TAG_CFA_PATTERN: u16 = 33422;
const TAG_DNG_VERSION: u16 = 50706;
const TAG_UNIQUE_CAMERA_MODEL: u16 = 50708;
const TAG_CFA_PLANE_COLOR: u16 = 50710;
const TAG_CFA_LAYOUT: u16 = 50711;
const TAG_COLOR_MATRIX_1: u16 = 50721;
const TAG_COLOR_MATRIX_2: u16 = 50722;
const TAG_AS_SHOT_NEUTRAL: u16 = 50728;
const TAG_ACTIVE_AREA: u16 = 50829;

const COMPRESSION_NONE: u16 = 1;
const PHOTOMETRIC_CFA: u16 = 32803;
const ORIENTATION_TOP_LEFT: u16 = 1;
const PLANAR_CONFIG_CONTIG: u16 = 1;
const SAMPLE_FORMAT_UINT: u16 = 1;
const CFA_LAYOUT_RECTANGULAR: u16 = 1;

/// Denominator for ColorMatrix srational encoding.
const MATRIX_DENOM: i32 = 10_000;
/// Denominator for AsShotNeutral rational encoding.
const NEUTRAL_DENOM: u32 = 100_000;

const IDENTITY_MATRIX: [f32; 9] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
const NEUTRAL_WHITE: [f32; 3] = [1.0, 1.0, 1.0];

// === Tag encoding ===

/// Encodes a 4-character filter string (e.g. "RGGB") as CFA pattern bytes.
///
/// Characters map as R=0, G=1, B=2, C=3, M=4, Y=5, W=6; unrecognized
/// characters map to 0. Any input not exactly 4 characters yields the
/// all-zero (all-Red) pattern. Hosts rely on this lenient fallback, so it
/// is not an error.
fn cfa_pattern_from_filter(filter: &str) -> [u8; 4] {
    let mut pattern = [0u8; 4];
    if filter.chars().count() != 4 {
        return pattern;
    }
    for (slot, c) in pattern.iter_mut().zip(filter.chars()) {
        *slot = match c {
            'R' => 0,
            'G' => 1,
            'B' => 2,
            'C' => 3,
            'M' => 4,
            'Y' => 5,
            'W' => 6,
            _ => 0,
        };
    }
    pattern
}

fn matrix_to_srationals(m: &[f32; 9]) -> Vec<(i32, i32)> {
    m.iter()
        .map(|&v| ((v * MATRIX_DENOM as f32) as i32, MATRIX_DENOM))
        .collect()
}

fn neutral_to_rationals(n: &[f32; 3]) -> Vec<(u32, u32)> {
    n.iter()
        .map(|&v| ((v * NEUTRAL_DENOM as f32) as u32, NEUTRAL_DENOM))
        .collect()
}

/// Stages the full DNG tag set for `spec` into the sink.
///
/// Every mandatory tag is staged unconditionally in one pass, before any
/// pixel data exists. ColorMatrix2 is the only tag whose presence depends
/// on the input.
fn stage_tags<W: Write + Seek>(sink: &mut TiffSink<W>, spec: &ImageSpec) {
    sink.set(TAG_DNG_VERSION, TagValue::Byte(vec![1, 1, 0, 0]));
    sink.set(TAG_NEW_SUBFILE_TYPE, TagValue::Long(vec![0]));
    sink.set(TAG_COMPRESSION, TagValue::Short(vec![COMPRESSION_NONE]));
    sink.set(TAG_MAKE, TagValue::Ascii(String::new()));
    sink.set(TAG_MODEL, TagValue::Ascii(String::new()));

    sink.set(TAG_IMAGE_WIDTH, TagValue::Long(vec![spec.width]));
    sink.set(TAG_IMAGE_LENGTH, TagValue::Long(vec![spec.height]));
    sink.set(TAG_BITS_PER_SAMPLE, TagValue::Short(vec![16]));
    sink.set(TAG_ROWS_PER_STRIP, TagValue::Long(vec![1]));
    sink.set(TAG_ORIENTATION, TagValue::Short(vec![ORIENTATION_TOP_LEFT]));
    sink.set(TAG_PHOTOMETRIC, TagValue::Short(vec![PHOTOMETRIC_CFA]));
    sink.set(TAG_SAMPLES_PER_PIXEL, TagValue::Short(vec![1]));
    sink.set(TAG_PLANAR_CONFIG, TagValue::Short(vec![PLANAR_CONFIG_CONTIG]));
    sink.set(TAG_SAMPLE_FORMAT, TagValue::Short(vec![SAMPLE_FORMAT_UINT]));

    // Filter pattern
    sink.set(TAG_CFA_REPEAT_PATTERN_DIM, TagValue::Short(vec![2, 2]));
    let filter = spec.attrs.get_str("raw:FilterPattern").unwrap_or("");
    let pattern = cfa_pattern_from_filter(filter);
    sink.set(TAG_CFA_PATTERN, TagValue::Byte(pattern.to_vec()));

    // Make is staged empty above and overwritten here; Model stays empty.
    sink.set(TAG_MAKE, TagValue::Ascii("DNG".to_string()));
    sink.set(TAG_UNIQUE_CAMERA_MODEL, TagValue::Ascii("DNG".to_string()));

    // ColorMatrix1 (mandatory)
    let m1 = spec
        .attrs
        .get_matrix33("raw:ColorMatrix1")
        .unwrap_or(IDENTITY_MATRIX);
    sink.set(TAG_COLOR_MATRIX_1, TagValue::SRational(matrix_to_srationals(&m1)));

    // ColorMatrix2 (optional)
    if let Some(m2) = spec.attrs.get_matrix33("raw:ColorMatrix2") {
        sink.set(TAG_COLOR_MATRIX_2, TagValue::SRational(matrix_to_srationals(&m2)));
    }

    // AsShotNeutral (mandatory)
    let neutral = spec
        .attrs
        .get_float3("raw:asShotNeutral")
        .unwrap_or(NEUTRAL_WHITE);
    sink.set(TAG_AS_SHOT_NEUTRAL, TagValue::Rational(neutral_to_rationals(&neutral)));

    sink.set(TAG_CFA_LAYOUT, TagValue::Short(vec![CFA_LAYOUT_RECTANGULAR]));
    sink.set(TAG_CFA_PLANE_COLOR, TagValue::Byte(vec![0, 1, 2]));

    // Active area, stored unsigned as {top, left, bottom, right}.
    let area = [
        spec.full_y as u32,
        spec.full_x as u32,
        (spec.full_y + spec.full_height as i32) as u32,
        (spec.full_x + spec.full_width as i32) as u32,
    ];
    sink.set(TAG_ACTIVE_AREA, TagValue::Long(area.to_vec()));
}

// === Session ===

/// DNG output session.
///
/// One session writes one file at a time: [`open`](ImageOutput::open)
/// validates the spec and stages every tag,
/// [`write_scanline`](ImageOutput::write_scanline) appends rows in order,
/// and [`close`](ImageOutput::close) finalizes the directory. Dropping an
/// open session closes it.
///
/// The session normalizes its working spec on open: channel count 1,
/// 16-bit unsigned samples, regardless of what the caller asked for.
pub struct DngOutput {
    sink: Option<TiffSink<BufWriter<File>>>,
    spec: Option<ImageSpec>,
    next_y: u32,
    scratch: Vec<u16>,
}

impl DngOutput {
    /// Creates a closed session; call [`open`](ImageOutput::open) to use it.
    pub fn new() -> Self {
        Self {
            sink: None,
            spec: None,
            next_y: 0,
            scratch: Vec::new(),
        }
    }

    /// Returns true while a file is open.
    pub fn is_open(&self) -> bool {
        self.sink.is_some()
    }
}

impl Default for DngOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageOutput for DngOutput {
    fn format_name(&self) -> &'static str {
        "dng"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["dng"]
    }

    fn supports(&self, feature: &str) -> bool {
        feature == "displaywindow"
    }

    fn open(&mut self, path: &Path, spec: &ImageSpec, mode: OpenMode) -> DngResult<()> {
        if mode == OpenMode::AppendSubimage {
            return Err(DngError::UnsupportedFeature(
                "appending subimages to an existing DNG".to_string(),
            ));
        }
        if spec.width == 0 || spec.height == 0 {
            return Err(DngError::InvalidArgument(format!(
                "image dimensions must be nonzero, got {}x{}",
                spec.width, spec.height
            )));
        }

        // Sessions are reusable; drop any file left open.
        self.close()?;

        let file = File::create(path).map_err(|e| DngError::Open {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut sink = TiffSink::new(BufWriter::new(file))?;

        let mut spec = spec.clone();
        spec.nchannels = 1;
        spec.format = PixelFormat::U16;

        stage_tags(&mut sink, &spec);

        debug!(
            path = %path.display(),
            width = spec.width,
            height = spec.height,
            "Opened DNG output"
        );

        self.sink = Some(sink);
        self.spec = Some(spec);
        self.next_y = 0;
        Ok(())
    }

    fn spec(&self) -> Option<&ImageSpec> {
        self.spec.as_ref()
    }

    fn write_scanline(
        &mut self,
        y: u32,
        z: u32,
        format: PixelFormat,
        data: &[u8],
        xstride: Option<usize>,
    ) -> DngResult<()> {
        let sink = self.sink.as_mut().ok_or(DngError::NotOpen)?;
        let spec = self.spec.as_ref().ok_or(DngError::NotOpen)?;
        if z != 0 {
            return Err(DngError::UnsupportedFeature(format!(
                "subimage index {} (single-subimage only)",
                z
            )));
        }
        if y != self.next_y {
            return Err(DngError::OutOfOrder {
                expected: self.next_y,
                actual: y,
            });
        }
        if y >= spec.height {
            return Err(DngError::InvalidArgument(format!(
                "row {} beyond image height {}",
                y, spec.height
            )));
        }

        let xstride = spec.resolve_xstride(xstride, format);
        convert::to_native_u16(format, data, xstride, spec.width as usize, &mut self.scratch)?;
        trace!(y, bytes = self.scratch.len() * 2, "write_scanline");
        sink.append_strip_u16(&self.scratch)?;
        self.next_y += 1;
        Ok(())
    }

    fn close(&mut self) -> DngResult<()> {
        let Some(sink) = self.sink.take() else {
            return Ok(());
        };
        let spec = self.spec.take();

        if let Some(spec) = &spec {
            if (sink.strips_written() as u32) < spec.height {
                warn!(
                    written = sink.strips_written(),
                    height = spec.height,
                    "Closing DNG with missing scanlines"
                );
            }
        }
        sink.finish()?;
        debug!("Closed DNG output");
        Ok(())
    }
}

impl Drop for DngOutput {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("implicit close failed: {}", e);
        }
    }
}

// === Convenience ===

/// Writes a complete u16 image to `path` in one call.
///
/// Opens a [`DngOutput`], writes every scanline in order, closes.
/// `pixels` must hold exactly width x height samples, row-major.
pub fn write<P: AsRef<Path>>(path: P, spec: &ImageSpec, pixels: &[u16]) -> DngResult<()> {
    let width = spec.width as usize;
    let expected = width * spec.height as usize;
    if pixels.len() != expected {
        return Err(DngError::DimensionMismatch {
            expected: expected * 2,
            actual: pixels.len() * 2,
        });
    }

    let mut out = DngOutput::new();
    out.open(path.as_ref(), spec, OpenMode::Create)?;
    let mut row_bytes = Vec::with_capacity(width * 2);
    for y in 0..spec.height {
        row_bytes.clear();
        for &v in &pixels[y as usize * width..(y as usize + 1) * width] {
            row_bytes.extend_from_slice(&v.to_ne_bytes());
        }
        out.write_scanline(y, 0, PixelFormat::U16, &row_bytes, None)?;
    }
    out.close()
}

/// Version string of the built-in container writer.
///
/// Diagnostic only; not used in the data path.
pub fn library_version() -> String {
    format!("dng-out {}", env!("CARGO_PKG_VERSION"))
}
