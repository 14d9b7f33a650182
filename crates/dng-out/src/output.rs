//! Output session trait for scanline-oriented writers.
//!
//! [`ImageOutput`] is the seam between a host framework and a concrete
//! format writer: open a session against a path and spec, push scanlines
//! in order, close. The host owns registration and dispatch; this crate
//! ships one implementation ([`DngOutput`](crate::DngOutput)) and a
//! minimal [`create_output`] factory for resolving it by name or
//! extension.

use std::path::Path;

use crate::error::DngResult;
use crate::spec::{ImageSpec, OpenMode};
use crate::PixelFormat;

/// Trait for scanline-oriented image output sessions.
///
/// Lifecycle: [`open`](Self::open), then [`write_scanline`](Self::write_scanline)
/// once per row in increasing order, then [`close`](Self::close). A session
/// may be reused for another file after close; open on an already-open
/// session closes the previous file first.
///
/// # Example
///
/// ```rust,no_run
/// use std::path::Path;
/// use dng_out::{create_output, ImageSpec, OpenMode, PixelFormat};
///
/// # fn main() -> dng_out::DngResult<()> {
/// let mut out = create_output("dng").expect("dng is built in");
/// let spec = ImageSpec::new(4, 4, PixelFormat::U16);
/// out.open(Path::new("frame.dng"), &spec, OpenMode::Create)?;
/// let row = [0u8; 8];
/// for y in 0..4 {
///     out.write_scanline(y, 0, PixelFormat::U16, &row, None)?;
/// }
/// out.close()?;
/// # Ok(())
/// # }
/// ```
pub trait ImageOutput {
    /// Short lowercase name of the format this writer produces.
    fn format_name(&self) -> &'static str;

    /// File extensions (lowercase, no dot) this writer claims.
    fn extensions(&self) -> &'static [&'static str];

    /// Queries an optional capability by feature name.
    ///
    /// Returns `false` for every feature not explicitly supported.
    fn supports(&self, _feature: &str) -> bool {
        false
    }

    /// Opens an output session for `path`, validating and copying `spec`.
    fn open(&mut self, path: &Path, spec: &ImageSpec, mode: OpenMode) -> DngResult<()>;

    /// The session's working spec, if a file is open.
    ///
    /// This is the writer's normalized copy, not the spec the caller
    /// passed to `open`.
    fn spec(&self) -> Option<&ImageSpec>;

    /// Writes one scanline.
    ///
    /// `y` is the zero-based row index and must arrive in strictly
    /// increasing order starting at 0; `z` is the subimage index; `data`
    /// holds the row's samples in `format` with `xstride` bytes between
    /// samples (`None` for packed).
    fn write_scanline(
        &mut self,
        y: u32,
        z: u32,
        format: PixelFormat,
        data: &[u8],
        xstride: Option<usize>,
    ) -> DngResult<()>;

    /// Finalizes and releases the open file, if any.
    ///
    /// Idempotent: closing an already-closed or never-opened session is a
    /// no-op success.
    fn close(&mut self) -> DngResult<()>;
}

/// Resolves a writer by format name or file extension.
///
/// Matching is case-insensitive and tolerates a leading dot, so "dng",
/// "DNG" and ".dng" all resolve. Returns `None` for unknown names.
pub fn create_output(name: &str) -> Option<Box<dyn ImageOutput>> {
    let name = name.trim_start_matches('.').to_ascii_lowercase();
    let out = crate::dng::DngOutput::new();
    if out.format_name() == name || out.extensions().contains(&name.as_str()) {
        return Some(Box::new(out));
    }
    None
}
