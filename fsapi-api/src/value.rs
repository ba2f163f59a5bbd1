//! Typed node values and their wire encoding
//!
//! FSAPI wraps every value in an element named after its type, for example
//! `<u8>3</u8>` or `<c8_array>BBC Radio 4</c8_array>`. This module converts
//! between that tag-plus-text form and [`Value`].

use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;

/// The type of a node value, as named by its wire tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    U8,
    U16,
    U32,
    S8,
    S16,
    S32,
    /// UTF-8 text (`c8_array`)
    Text,
    /// Raw octets, hex encoded on the wire (`array`)
    Bytes,
}

impl ValueKind {
    pub const ALL: [ValueKind; 8] = [
        ValueKind::U8,
        ValueKind::U16,
        ValueKind::U32,
        ValueKind::S8,
        ValueKind::S16,
        ValueKind::S32,
        ValueKind::Text,
        ValueKind::Bytes,
    ];

    /// The element name used for this type on the wire
    pub fn tag(self) -> &'static str {
        match self {
            ValueKind::U8 => "u8",
            ValueKind::U16 => "u16",
            ValueKind::U32 => "u32",
            ValueKind::S8 => "s8",
            ValueKind::S16 => "s16",
            ValueKind::S32 => "s32",
            ValueKind::Text => "c8_array",
            ValueKind::Bytes => "array",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ValueKind {
    type Err = DecodeError;

    /// Accepts wire tags plus the friendlier `text` and `bytes`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ValueKind::Text),
            "bytes" => Ok(ValueKind::Bytes),
            other => {
                ValueKind::from_tag(other).ok_or_else(|| DecodeError::UnknownType(other.to_string()))
            }
        }
    }
}

/// A typed node value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    S8(i8),
    S16(i16),
    S32(i32),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::U8(_) => ValueKind::U8,
            Value::U16(_) => ValueKind::U16,
            Value::U32(_) => ValueKind::U32,
            Value::S8(_) => ValueKind::S8,
            Value::S16(_) => ValueKind::S16,
            Value::S32(_) => ValueKind::S32,
            Value::Text(_) => ValueKind::Text,
            Value::Bytes(_) => ValueKind::Bytes,
        }
    }

    /// Parse user-supplied text as a value of the given kind
    ///
    /// Uses the wire rules, so bytes are given as hex.
    pub fn parse_as(kind: ValueKind, text: &str) -> Result<Self, DecodeError> {
        decode_value(kind.tag(), text)
    }

    /// Widen any unsigned integer value
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::U8(v) => Some(u32::from(*v)),
            Value::U16(v) => Some(u32::from(*v)),
            Value::U32(v) => Some(*v),
            _ => None,
        }
    }

    /// Widen any signed integer value
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::S8(v) => Some(i32::from(*v)),
            Value::S16(v) => Some(i32::from(*v)),
            Value::S32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (_, text) = encode_value(self);
        f.write_str(&text)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::S8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::S16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::S32(v)
    }
}

/// Flags such as power and mute are `u8` nodes holding 0 or 1
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::U8(u8::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

/// Decode the text content of a typed element
///
/// # Errors
/// - `UnknownType` if `tag` is not a known value tag
/// - `Malformed` for non-numeric integer text or bad hex
/// - `NumericOverflow` if an integer does not fit its type
pub fn decode_value(tag: &str, raw: &str) -> Result<Value, DecodeError> {
    let kind = ValueKind::from_tag(tag).ok_or_else(|| DecodeError::UnknownType(tag.to_string()))?;

    match kind {
        ValueKind::U8 => parse_unsigned(kind, raw).map(Value::U8),
        ValueKind::U16 => parse_unsigned(kind, raw).map(Value::U16),
        ValueKind::U32 => parse_unsigned(kind, raw).map(Value::U32),
        ValueKind::S8 => parse_signed(kind, raw).map(Value::S8),
        ValueKind::S16 => parse_signed(kind, raw).map(Value::S16),
        ValueKind::S32 => parse_signed(kind, raw).map(Value::S32),
        ValueKind::Text => Ok(Value::Text(raw.to_string())),
        ValueKind::Bytes => hex::decode(raw.trim())
            .map(Value::Bytes)
            .map_err(|e| DecodeError::malformed(kind, e.to_string())),
    }
}

/// Encode a value into its wire tag and text
pub fn encode_value(value: &Value) -> (ValueKind, String) {
    let text = match value {
        Value::U8(v) => v.to_string(),
        Value::U16(v) => v.to_string(),
        Value::U32(v) => v.to_string(),
        Value::S8(v) => v.to_string(),
        Value::S16(v) => v.to_string(),
        Value::S32(v) => v.to_string(),
        Value::Text(text) => text.clone(),
        Value::Bytes(bytes) => hex::encode(bytes),
    };
    (value.kind(), text)
}

fn parse_unsigned<T: TryFrom<u64>>(kind: ValueKind, raw: &str) -> Result<T, DecodeError> {
    let text = raw.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::malformed(kind, format!("'{}' is not an unsigned integer", text)));
    }

    // Only digits remain, so a parse failure can only mean overflow
    let wide: u64 = text.parse().map_err(|_| overflow(kind, text))?;
    T::try_from(wide).map_err(|_| overflow(kind, text))
}

fn parse_signed<T: TryFrom<i64>>(kind: ValueKind, raw: &str) -> Result<T, DecodeError> {
    let text = raw.trim();
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::malformed(kind, format!("'{}' is not an integer", text)));
    }

    let wide: i64 = text.parse().map_err(|_| overflow(kind, text))?;
    T::try_from(wide).map_err(|_| overflow(kind, text))
}

fn overflow(kind: ValueKind, text: &str) -> DecodeError {
    DecodeError::NumericOverflow {
        kind,
        text: text.to_string(),
    }
}
