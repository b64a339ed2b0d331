//! Wire encoding.
//!
//! [`Encoder`] appends CBOR items onto an owned, growable buffer. Fixed-
//! width scalars always use their declared width; varints, string/byte
//! headers, and array headers use the smallest additional info that fits.
//! Encoding is infallible: every admissible value has exactly one byte
//! sequence.

use half::f16;

// Major types, pre-shifted into the initial-byte position.
const MAJOR_UINT: u8 = 0x00;
const MAJOR_NINT: u8 = 0x20;
const MAJOR_BYTES: u8 = 0x40;
const MAJOR_TEXT: u8 = 0x60;
const MAJOR_ARRAY: u8 = 0x80;
const MAJOR_TAG: u8 = 0xC0;

const SIMPLE_FALSE: u8 = 0xF4;
const SIMPLE_TRUE: u8 = 0xF5;
const SIMPLE_NULL: u8 = 0xF6;
const INDEFINITE_ARRAY: u8 = 0x9F;
const BREAK: u8 = 0xFF;

/// An append-only CBOR writer over a growable buffer.
///
/// One encoder per operation is the expected shape: build it, write the
/// value, take the bytes.
#[derive(Debug, Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    /// Create an empty encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the encoder, returning the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// The bytes encoded so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of bytes encoded so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been encoded yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    // ── Scalars ─────────────────────────────────────────────────────────

    /// `bool`: one byte, `F4` or `F5`.
    pub fn put_bool(&mut self, v: bool) {
        self.buf.push(if v { SIMPLE_TRUE } else { SIMPLE_FALSE });
    }

    /// CBOR null (`F6`): an absent struct field below the maximum written rank.
    pub fn put_null(&mut self) {
        self.buf.push(SIMPLE_NULL);
    }

    /// `u8`: always AI 24 plus one argument byte.
    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(MAJOR_UINT | 24);
        self.buf.push(v);
    }

    /// `u16`: always AI 25 plus two argument bytes.
    pub fn put_u16(&mut self, v: u16) {
        self.buf.push(MAJOR_UINT | 25);
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// `u32`: always AI 26 plus four argument bytes.
    pub fn put_u32(&mut self, v: u32) {
        self.buf.push(MAJOR_UINT | 26);
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// `u64`: always AI 27 plus eight argument bytes.
    pub fn put_u64(&mut self, v: u64) {
        self.buf.push(MAJOR_UINT | 27);
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// `i8`: the unsigned encoding of the same width, major 1 with
    /// argument `-1 - v` when negative.
    pub fn put_i8(&mut self, v: i8) {
        if v >= 0 {
            self.buf.push(MAJOR_UINT | 24);
            self.buf.push(v as u8);
        } else {
            self.buf.push(MAJOR_NINT | 24);
            self.buf.push(!v as u8);
        }
    }

    /// `i16`: fixed two argument bytes.
    pub fn put_i16(&mut self, v: i16) {
        if v >= 0 {
            self.buf.push(MAJOR_UINT | 25);
            self.buf.extend_from_slice(&(v as u16).to_be_bytes());
        } else {
            self.buf.push(MAJOR_NINT | 25);
            self.buf.extend_from_slice(&(!v as u16).to_be_bytes());
        }
    }

    /// `i32`: fixed four argument bytes.
    pub fn put_i32(&mut self, v: i32) {
        if v >= 0 {
            self.buf.push(MAJOR_UINT | 26);
            self.buf.extend_from_slice(&(v as u32).to_be_bytes());
        } else {
            self.buf.push(MAJOR_NINT | 26);
            self.buf.extend_from_slice(&(!v as u32).to_be_bytes());
        }
    }

    /// `i64`: fixed eight argument bytes.
    pub fn put_i64(&mut self, v: i64) {
        if v >= 0 {
            self.buf.push(MAJOR_UINT | 27);
            self.buf.extend_from_slice(&(v as u64).to_be_bytes());
        } else {
            self.buf.push(MAJOR_NINT | 27);
            self.buf.extend_from_slice(&(!v as u64).to_be_bytes());
        }
    }

    /// `uvarint`: major 0 with the smallest AI that fits.
    pub fn put_uvarint(&mut self, v: u64) {
        self.put_minimal(MAJOR_UINT, v);
    }

    /// `ivarint`: minimal major 0 when non-negative, minimal major 1 over
    /// `-1 - v` when negative.
    pub fn put_ivarint(&mut self, v: i64) {
        if v >= 0 {
            self.put_minimal(MAJOR_UINT, v as u64);
        } else {
            // Two's complement: !v == -1 - v for every negative v.
            self.put_minimal(MAJOR_NINT, !v as u64);
        }
    }

    /// `f16`: major 7 AI 25. The value is narrowed from `f32` here at the
    /// encoding boundary; everything upstream works in `f32`.
    pub fn put_f16(&mut self, v: f32) {
        self.buf.push(0xF9);
        self.buf.extend_from_slice(&f16::from_f32(v).to_be_bytes());
    }

    /// `f32`: major 7 AI 26, never downcast to half precision.
    pub fn put_f32(&mut self, v: f32) {
        self.buf.push(0xFA);
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// `f64`: major 7 AI 27, never downcast.
    pub fn put_f64(&mut self, v: f64) {
        self.buf.push(0xFB);
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// `string`: major 3 with a minimal length header, then UTF-8 bytes.
    pub fn put_str(&mut self, s: &str) {
        self.put_minimal(MAJOR_TEXT, s.len() as u64);
        self.buf.extend_from_slice(s.as_bytes());
    }

    /// `[]u8`: major 2 with a minimal length header, then raw bytes.
    pub fn put_bytes(&mut self, b: &[u8]) {
        self.put_minimal(MAJOR_BYTES, b.len() as u64);
        self.buf.extend_from_slice(b);
    }

    // ── Compounds ───────────────────────────────────────────────────────

    /// Definite-length array header (structs, variable and fixed arrays).
    pub fn put_array_header(&mut self, len: u64) {
        self.put_minimal(MAJOR_ARRAY, len);
    }

    /// Indefinite-length array opener (`9F`), used only for externally
    /// counted arrays.
    pub fn put_indefinite_array(&mut self) {
        self.buf.push(INDEFINITE_ARRAY);
    }

    /// The break symbol (`FF`) closing an indefinite-length array.
    pub fn put_break(&mut self) {
        self.buf.push(BREAK);
    }

    /// CBOR tag header (major 6). The tag number space is the schema's
    /// union variant tags; nothing else is ever emitted here.
    pub fn put_tag(&mut self, tag: u64) {
        self.put_minimal(MAJOR_TAG, tag);
    }

    /// A payload-free union variant: the `uvarint` of its tag.
    pub fn put_unit_variant(&mut self, tag: u64) {
        self.put_uvarint(tag);
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// Write `major` with the smallest AI that fits `value`.
    fn put_minimal(&mut self, major: u8, value: u64) {
        if value < 24 {
            self.buf.push(major | value as u8);
        } else if value <= u8::MAX as u64 {
            self.buf.push(major | 24);
            self.buf.push(value as u8);
        } else if value <= u16::MAX as u64 {
            self.buf.push(major | 25);
            self.buf.extend_from_slice(&(value as u16).to_be_bytes());
        } else if value <= u32::MAX as u64 {
            self.buf.push(major | 26);
            self.buf.extend_from_slice(&(value as u32).to_be_bytes());
        } else {
            self.buf.push(major | 27);
            self.buf.extend_from_slice(&value.to_be_bytes());
        }
    }
}
