//! Write-only streaming TIFF emitter.
//!
//! Minimal little-endian ("II") classic TIFF output shaped for one
//! purpose: a single uncompressed image whose pixel data streams through
//! one strip at a time while the directory is staged in memory. Layout:
//!
//! ```text
//! header (8 bytes, IFD offset patched at finish)
//! strip 0, strip 1, ... (appended as scanlines arrive)
//! IFD: entry count, 12-byte entries ascending by tag, next-IFD = 0
//! out-of-line values (2-byte aligned)
//! ```
//!
//! Only the six field types the DNG tag set needs are supported. This is
//! not a general TIFF writer: no BigTIFF, no multiple directories, no
//! sub-IFDs.

use std::collections::BTreeMap;
use std::io::{self, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, WriteBytesExt};

/// StripOffsets, synthesized from the recorded strip positions.
const TAG_STRIP_OFFSETS: u16 = 273;
/// StripByteCounts, synthesized alongside StripOffsets.
const TAG_STRIP_BYTE_COUNTS: u16 = 279;

// === Tag values ===

/// A staged directory entry value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TagValue {
    /// BYTE (field type 1).
    Byte(Vec<u8>),
    /// ASCII (field type 2), NUL terminator appended on encode.
    Ascii(String),
    /// SHORT (field type 3).
    Short(Vec<u16>),
    /// LONG (field type 4).
    Long(Vec<u32>),
    /// RATIONAL (field type 5), numerator/denominator pairs.
    Rational(Vec<(u32, u32)>),
    /// SRATIONAL (field type 10), signed numerator/denominator pairs.
    SRational(Vec<(i32, i32)>),
}

impl TagValue {
    fn field_type(&self) -> u16 {
        match self {
            TagValue::Byte(_) => 1,
            TagValue::Ascii(_) => 2,
            TagValue::Short(_) => 3,
            TagValue::Long(_) => 4,
            TagValue::Rational(_) => 5,
            TagValue::SRational(_) => 10,
        }
    }

    fn count(&self) -> u32 {
        match self {
            TagValue::Byte(v) => v.len() as u32,
            // Count includes the NUL terminator.
            TagValue::Ascii(s) => s.len() as u32 + 1,
            TagValue::Short(v) => v.len() as u32,
            TagValue::Long(v) => v.len() as u32,
            TagValue::Rational(v) => v.len() as u32,
            TagValue::SRational(v) => v.len() as u32,
        }
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        match self {
            TagValue::Byte(v) => buf.extend_from_slice(v),
            TagValue::Ascii(s) => {
                buf.extend_from_slice(s.as_bytes());
                buf.push(0);
            }
            TagValue::Short(v) => {
                for x in v {
                    buf.extend_from_slice(&x.to_le_bytes());
                }
            }
            TagValue::Long(v) => {
                for x in v {
                    buf.extend_from_slice(&x.to_le_bytes());
                }
            }
            TagValue::Rational(v) => {
                for (n, d) in v {
                    buf.extend_from_slice(&n.to_le_bytes());
                    buf.extend_from_slice(&d.to_le_bytes());
                }
            }
            TagValue::SRational(v) => {
                for (n, d) in v {
                    buf.extend_from_slice(&n.to_le_bytes());
                    buf.extend_from_slice(&d.to_le_bytes());
                }
            }
        }
    }
}

// === Streaming sink ===

/// Streaming single-image TIFF sink.
///
/// Writes the header immediately, appends strips as they arrive, and
/// holds staged tags until [`finish`](Self::finish) writes the directory
/// and patches the header's IFD offset. Staging is last-write-wins per
/// tag; entries come out sorted ascending because the stage is a
/// `BTreeMap`.
pub(crate) struct TiffSink<W: Write + Seek> {
    w: W,
    /// Bytes written so far; tracked here so strip offsets never need a
    /// flushing seek on a buffered writer.
    pos: u32,
    tags: BTreeMap<u16, TagValue>,
    strips: Vec<(u32, u32)>,
}

impl<W: Write + Seek> TiffSink<W> {
    /// Writes the TIFF header and returns the sink.
    pub(crate) fn new(mut w: W) -> io::Result<Self> {
        w.write_all(b"II")?;
        w.write_u16::<LittleEndian>(42)?;
        // Directory offset, patched by finish().
        w.write_u32::<LittleEndian>(0)?;
        Ok(Self {
            w,
            pos: 8,
            tags: BTreeMap::new(),
            strips: Vec::new(),
        })
    }

    /// Stages a directory entry, replacing any previous value for `tag`.
    pub(crate) fn set(&mut self, tag: u16, value: TagValue) {
        self.tags.insert(tag, value);
    }

    /// Appends one strip of u16 samples, recording its offset and length.
    pub(crate) fn append_strip_u16(&mut self, samples: &[u16]) -> io::Result<()> {
        let offset = self.pos;
        for &s in samples {
            self.w.write_u16::<LittleEndian>(s)?;
        }
        let nbytes = (samples.len() * 2) as u32;
        self.pos += nbytes;
        self.strips.push((offset, nbytes));
        Ok(())
    }

    /// Number of strips appended so far.
    pub(crate) fn strips_written(&self) -> usize {
        self.strips.len()
    }

    /// Writes the directory, patches the header offset, flushes, and
    /// returns the inner writer.
    pub(crate) fn finish(mut self) -> io::Result<W> {
        if !self.strips.is_empty() {
            let offsets = self.strips.iter().map(|&(o, _)| o).collect();
            let counts = self.strips.iter().map(|&(_, n)| n).collect();
            self.tags.insert(TAG_STRIP_OFFSETS, TagValue::Long(offsets));
            self.tags.insert(TAG_STRIP_BYTE_COUNTS, TagValue::Long(counts));
        }

        // Word-align the directory.
        if self.pos % 2 == 1 {
            self.w.write_u8(0)?;
            self.pos += 1;
        }
        let ifd_offset = self.pos;
        let n = self.tags.len() as u16;
        let mut value_offset = ifd_offset + 2 + 12 * u32::from(n) + 4;
        let mut spill: Vec<u8> = Vec::new();

        self.w.write_u16::<LittleEndian>(n)?;
        for (&tag, value) in &self.tags {
            let mut encoded = Vec::new();
            value.encode(&mut encoded);

            self.w.write_u16::<LittleEndian>(tag)?;
            self.w.write_u16::<LittleEndian>(value.field_type())?;
            self.w.write_u32::<LittleEndian>(value.count())?;
            if encoded.len() <= 4 {
                encoded.resize(4, 0);
                self.w.write_all(&encoded)?;
            } else {
                self.w.write_u32::<LittleEndian>(value_offset)?;
                value_offset += encoded.len() as u32;
                // Keep out-of-line values word-aligned.
                if encoded.len() % 2 == 1 {
                    encoded.push(0);
                    value_offset += 1;
                }
                spill.extend_from_slice(&encoded);
            }
        }
        self.w.write_u32::<LittleEndian>(0)?;
        self.w.write_all(&spill)?;

        self.w.seek(SeekFrom::Start(4))?;
        self.w.write_u32::<LittleEndian>(ifd_offset)?;
        self.w.flush()?;
        Ok(self.w)
    }
}
