//! Float values in SJSON documents.
//!
//! A float is either a plain JSON number or, in binary exact documents, a
//! string holding the 8 hex digits of its IEEE-754 bit pattern.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// `f32` that serializes as its exact bit pattern.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SjsonFloat(pub f32);

impl SjsonFloat {
    /// Parse 8 hex digits as float bits.
    pub fn from_hex(text: &str) -> Option<Self> {
        if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(text, 16)
            .ok()
            .map(|bits| Self(f32::from_bits(bits)))
    }

    pub fn to_hex(self) -> String {
        format!("{:08x}", self.0.to_bits())
    }
}

impl From<f32> for SjsonFloat {
    fn from(value: f32) -> Self {
        Self(value)
    }
}

impl From<SjsonFloat> for f32 {
    fn from(value: SjsonFloat) -> Self {
        value.0
    }
}

impl Serialize for SjsonFloat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

struct SjsonFloatVisitor;

impl<'de> Visitor<'de> for SjsonFloatVisitor {
    type Value = SjsonFloat;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or an 8 digit hex float")
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(SjsonFloat(value as f32))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(SjsonFloat(value as f32))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(SjsonFloat(value as f32))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        SjsonFloat::from_hex(value)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Str(value), &self))
    }
}

impl<'de> Deserialize<'de> for SjsonFloat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SjsonFloatVisitor)
    }
}

/// Unwrap a slice of document floats.
pub(crate) fn to_f32s<const N: usize>(values: &[SjsonFloat; N]) -> [f32; N] {
    std::array::from_fn(|i| values[i].0)
}
