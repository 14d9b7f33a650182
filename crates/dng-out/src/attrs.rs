//! Typed attribute storage for the image specification.
//!
//! [`Attrs`] maps attribute names to typed [`AttrValue`]s. The DNG writer
//! consumes a small, fixed set of keys (`raw:FilterPattern`,
//! `raw:ColorMatrix1`, `raw:ColorMatrix2`, `raw:asShotNeutral`); everything
//! else is carried but ignored.
//!
//! Lookups are type-filtered: a key holding a value of the wrong type
//! behaves exactly like a missing key, which is what lets absent or
//! mistyped calibration attributes degrade into documented defaults
//! instead of malformed tags.
//!
//! # Example
//!
//! ```rust
//! use dng_out::{AttrValue, Attrs};
//!
//! let mut attrs = Attrs::new();
//! attrs.set("raw:FilterPattern", AttrValue::Str("RGGB".to_string()));
//! attrs.set("raw:asShotNeutral", AttrValue::Float3([0.8, 1.0, 0.9]));
//!
//! assert_eq!(attrs.get_str("raw:FilterPattern"), Some("RGGB"));
//! assert_eq!(attrs.get_float3("raw:asShotNeutral"), Some([0.8, 1.0, 0.9]));
//! // Typed getter against the wrong type: behaves as absent.
//! assert_eq!(attrs.get_matrix33("raw:FilterPattern"), None);
//! ```

use std::collections::HashMap;

/// Typed metadata value.
///
/// The calibration inputs the writer cares about are matrices and color
/// triples; scalar variants are carried so hosts can pass through values
/// the writer does not interpret.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum AttrValue {
    /// UTF-8 string value.
    ///
    /// Used for: `raw:FilterPattern`.
    Str(String),

    /// Signed 32-bit integer.
    Int(i32),

    /// Unsigned 32-bit integer.
    UInt(u32),

    /// 32-bit floating point.
    Float(f32),

    /// Three-component float vector (a color triple).
    ///
    /// Used for: `raw:asShotNeutral`.
    Float3([f32; 3]),

    /// 3x3 float matrix, row-major.
    ///
    /// Used for: `raw:ColorMatrix1`, `raw:ColorMatrix2`.
    Matrix33([f32; 9]),
}

impl AttrValue {
    /// Returns the type name for error messages and debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Str(_) => "string",
            AttrValue::Int(_) => "int32",
            AttrValue::UInt(_) => "uint32",
            AttrValue::Float(_) => "float",
            AttrValue::Float3(_) => "float3",
            AttrValue::Matrix33(_) => "matrix33",
        }
    }

    // === Type-specific accessors ===

    /// Tries to get as string reference.
    ///
    /// Returns `None` if not a `Str` variant.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Tries to get as i32.
    #[inline]
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Tries to get as u32.
    #[inline]
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            AttrValue::UInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Tries to get as f32.
    #[inline]
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            AttrValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Tries to get as a color triple.
    ///
    /// Returns `None` if not a `Float3` variant.
    #[inline]
    pub fn as_float3(&self) -> Option<[f32; 3]> {
        match self {
            AttrValue::Float3(v) => Some(*v),
            _ => None,
        }
    }

    /// Tries to get as a row-major 3x3 matrix.
    ///
    /// Returns `None` if not a `Matrix33` variant.
    #[inline]
    pub fn as_matrix33(&self) -> Option<[f32; 9]> {
        match self {
            AttrValue::Matrix33(v) => Some(*v),
            _ => None,
        }
    }
}

// === Display implementation ===

impl std::fmt::Display for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrValue::Str(v) => write!(f, "{}", v),
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::UInt(v) => write!(f, "{}", v),
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Float3(v) => write!(f, "[{}, {}, {}]", v[0], v[1], v[2]),
            AttrValue::Matrix33(_) => write!(f, "<3x3 matrix>"),
        }
    }
}

// === From implementations for convenience ===

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Int(v)
    }
}

impl From<u32> for AttrValue {
    fn from(v: u32) -> Self {
        AttrValue::UInt(v)
    }
}

impl From<f32> for AttrValue {
    fn from(v: f32) -> Self {
        AttrValue::Float(v)
    }
}

impl From<[f32; 3]> for AttrValue {
    fn from(v: [f32; 3]) -> Self {
        AttrValue::Float3(v)
    }
}

impl From<[f32; 9]> for AttrValue {
    fn from(v: [f32; 9]) -> Self {
        AttrValue::Matrix33(v)
    }
}

/// Attribute container: string key -> typed value.
///
/// # Example
///
/// ```rust
/// use dng_out::{AttrValue, Attrs};
///
/// let mut attrs = Attrs::new();
/// attrs.set("raw:ColorMatrix1", AttrValue::Matrix33([
///     2.005, -0.771, -0.269,
///     -0.752, 1.688, 0.064,
///     -0.149, 0.283, 0.745,
/// ]));
/// assert!(attrs.contains("raw:ColorMatrix1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs {
    map: HashMap<String, AttrValue>,
}

impl Attrs {
    /// Creates an empty attribute container.
    #[inline]
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Sets an attribute value, replacing any previous value for the key.
    #[inline]
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.map.insert(key.into(), value.into());
    }

    /// Gets an attribute value by key.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.map.get(key)
    }

    /// Removes an attribute by key, returning the removed value.
    #[inline]
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.map.remove(key)
    }

    /// Checks if an attribute exists.
    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Returns the number of attributes.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if no attributes are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over all (key, value) pairs. Order is not guaranteed.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.map.iter()
    }

    // === Type-specific getters ===

    /// Gets a string value.
    ///
    /// Returns `None` if the key doesn't exist or is not a string.
    #[inline]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.map.get(key).and_then(|v| v.as_str())
    }

    /// Gets an f32 value.
    #[inline]
    pub fn get_f32(&self, key: &str) -> Option<f32> {
        self.map.get(key).and_then(|v| v.as_f32())
    }

    /// Gets a color triple.
    ///
    /// Returns `None` if the key doesn't exist or is not a `Float3`.
    #[inline]
    pub fn get_float3(&self, key: &str) -> Option<[f32; 3]> {
        self.map.get(key).and_then(|v| v.as_float3())
    }

    /// Gets a row-major 3x3 matrix.
    ///
    /// Returns `None` if the key doesn't exist or is not a `Matrix33`.
    #[inline]
    pub fn get_matrix33(&self, key: &str) -> Option<[f32; 9]> {
        self.map.get(key).and_then(|v| v.as_matrix33())
    }
}
