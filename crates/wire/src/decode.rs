//! Wire decoding.
//!
//! [`Decoder`] reads items from a borrowed byte buffer. Because the caller
//! knows the schema type of every position, reads validate rather than
//! dispatch: fixed-width scalars assert one expected initial byte (signed
//! widths one of two), and variable-length forms check the major type then
//! branch on additional info. Text and byte reads borrow from the input —
//! no allocation happens anywhere on the decode path.

use half::f16;

use crate::error::{Result, WireError};

const SIMPLE_FALSE: u8 = 0xF4;
const SIMPLE_TRUE: u8 = 0xF5;
const SIMPLE_NULL: u8 = 0xF6;
const INDEFINITE_ARRAY: u8 = 0x9F;
const BREAK: u8 = 0xFF;

/// Dispatch result for a union value: which shape the initial byte had,
/// with the variant tag either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionHead {
    /// A `uvarint` — a payload-free variant.
    Unit(u64),
    /// A CBOR tag (major 6) — the payload follows.
    Payload(u64),
}

/// A validating CBOR reader over a borrowed buffer.
#[derive(Debug, Clone)]
pub struct Decoder<'b> {
    buf: &'b [u8],
    pos: usize,
}

impl<'b> Decoder<'b> {
    /// Create a decoder at the start of `buf`.
    pub fn new(buf: &'b [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether the whole buffer has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Current byte offset into the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    // ── Raw reads ───────────────────────────────────────────────────────

    fn peek_byte(&self) -> Result<u8> {
        self.buf
            .get(self.pos)
            .copied()
            .ok_or(WireError::UnexpectedEnd)
    }

    fn take_byte(&mut self) -> Result<u8> {
        let b = self.peek_byte()?;
        self.pos += 1;
        Ok(b)
    }

    fn take_slice(&mut self, n: usize) -> Result<&'b [u8]> {
        if self.remaining() < n {
            return Err(WireError::UnexpectedEnd);
        }
        let s = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(s)
    }

    fn expect_initial(&mut self, expected: u8, what: &'static str) -> Result<()> {
        let found = self.take_byte()?;
        if found != expected {
            return Err(WireError::InitialByte {
                expected: what,
                found,
            });
        }
        Ok(())
    }

    /// Read the argument selected by `ai`. Reserved values (28–30) and the
    /// indefinite marker are malformed where a definite argument is required.
    fn read_arg(&mut self, initial: u8) -> Result<u64> {
        match initial & 0x1F {
            ai @ 0..=23 => Ok(ai as u64),
            24 => Ok(self.take_byte()? as u64),
            25 => Ok(be_uint(self.take_slice(2)?)),
            26 => Ok(be_uint(self.take_slice(4)?)),
            27 => Ok(be_uint(self.take_slice(8)?)),
            _ => Err(WireError::MalformedAdditionalInfo { byte: initial }),
        }
    }

    // ── Scalars ─────────────────────────────────────────────────────────

    /// `bool`: `F4` or `F5`.
    pub fn get_bool(&mut self) -> Result<bool> {
        match self.take_byte()? {
            SIMPLE_FALSE => Ok(false),
            SIMPLE_TRUE => Ok(true),
            found => Err(WireError::InitialByte {
                expected: "bool (initial byte 0xf4 or 0xf5)",
                found,
            }),
        }
    }

    /// Consume an expected null (`F6`).
    pub fn get_null(&mut self) -> Result<()> {
        self.expect_initial(SIMPLE_NULL, "null (initial byte 0xf6)")
    }

    /// Whether the next item is null, without consuming it. False at end
    /// of input (a missing trailing field is absent, not null).
    pub fn is_null(&self) -> bool {
        self.peek_byte() == Ok(SIMPLE_NULL)
    }

    /// `u8`: exactly `18 XX`.
    pub fn get_u8(&mut self) -> Result<u8> {
        self.expect_initial(0x18, "u8 (initial byte 0x18)")?;
        self.take_byte()
    }

    /// `u16`: exactly `19` plus two bytes.
    pub fn get_u16(&mut self) -> Result<u16> {
        self.expect_initial(0x19, "u16 (initial byte 0x19)")?;
        Ok(be_uint(self.take_slice(2)?) as u16)
    }

    /// `u32`: exactly `1A` plus four bytes.
    pub fn get_u32(&mut self) -> Result<u32> {
        self.expect_initial(0x1A, "u32 (initial byte 0x1a)")?;
        Ok(be_uint(self.take_slice(4)?) as u32)
    }

    /// `u64`: exactly `1B` plus eight bytes.
    pub fn get_u64(&mut self) -> Result<u64> {
        self.expect_initial(0x1B, "u64 (initial byte 0x1b)")?;
        Ok(be_uint(self.take_slice(8)?))
    }

    /// `i8`: `18 XX` or `38 XX`.
    pub fn get_i8(&mut self) -> Result<i8> {
        match self.take_byte()? {
            0x18 => narrow_signed(self.take_byte()? as u64, false, "i8", i8::MAX as u64),
            0x38 => narrow_signed(self.take_byte()? as u64, true, "i8", i8::MAX as u64),
            found => Err(WireError::InitialByte {
                expected: "i8 (initial byte 0x18 or 0x38)",
                found,
            }),
        }
        .map(|v| v as i8)
    }

    /// `i16`: `19` or `39` plus two bytes.
    pub fn get_i16(&mut self) -> Result<i16> {
        match self.take_byte()? {
            0x19 => narrow_signed(be_uint(self.take_slice(2)?), false, "i16", i16::MAX as u64),
            0x39 => narrow_signed(be_uint(self.take_slice(2)?), true, "i16", i16::MAX as u64),
            found => Err(WireError::InitialByte {
                expected: "i16 (initial byte 0x19 or 0x39)",
                found,
            }),
        }
        .map(|v| v as i16)
    }

    /// `i32`: `1A` or `3A` plus four bytes.
    pub fn get_i32(&mut self) -> Result<i32> {
        match self.take_byte()? {
            0x1A => narrow_signed(be_uint(self.take_slice(4)?), false, "i32", i32::MAX as u64),
            0x3A => narrow_signed(be_uint(self.take_slice(4)?), true, "i32", i32::MAX as u64),
            found => Err(WireError::InitialByte {
                expected: "i32 (initial byte 0x1a or 0x3a)",
                found,
            }),
        }
        .map(|v| v as i32)
    }

    /// `i64`: `1B` or `3B` plus eight bytes.
    pub fn get_i64(&mut self) -> Result<i64> {
        match self.take_byte()? {
            0x1B => narrow_signed(be_uint(self.take_slice(8)?), false, "i64", i64::MAX as u64),
            0x3B => narrow_signed(be_uint(self.take_slice(8)?), true, "i64", i64::MAX as u64),
            found => Err(WireError::InitialByte {
                expected: "i64 (initial byte 0x1b or 0x3b)",
                found,
            }),
        }
    }

    /// `uvarint`: any major-0 item.
    pub fn get_uvarint(&mut self) -> Result<u64> {
        let initial = self.take_byte()?;
        if initial >> 5 != 0 {
            return Err(WireError::InitialByte {
                expected: "unsigned integer (major type 0)",
                found: initial,
            });
        }
        self.read_arg(initial)
    }

    /// `ivarint`: a major-0 or major-1 item, mapped into `i64`.
    pub fn get_ivarint(&mut self) -> Result<i64> {
        let initial = self.take_byte()?;
        let arg = match initial >> 5 {
            0 | 1 => self.read_arg(initial)?,
            _ => {
                return Err(WireError::InitialByte {
                    expected: "integer (major type 0 or 1)",
                    found: initial,
                });
            }
        };
        if arg > i64::MAX as u64 {
            let value = if initial >> 5 == 0 {
                arg as i128
            } else {
                -1 - arg as i128
            };
            return Err(WireError::OutOfRange {
                ty: "ivarint",
                value,
            });
        }
        if initial >> 5 == 0 {
            Ok(arg as i64)
        } else {
            Ok(-1 - arg as i64)
        }
    }

    /// `f16`: exactly `F9` plus two bytes, widened to `f32`.
    pub fn get_f16(&mut self) -> Result<f32> {
        self.expect_initial(0xF9, "f16 (initial byte 0xf9)")?;
        let bits = be_uint(self.take_slice(2)?) as u16;
        Ok(f16::from_bits(bits).to_f32())
    }

    /// `f32`: exactly `FA` plus four bytes.
    pub fn get_f32(&mut self) -> Result<f32> {
        self.expect_initial(0xFA, "f32 (initial byte 0xfa)")?;
        Ok(f32::from_bits(be_uint(self.take_slice(4)?) as u32))
    }

    /// `f64`: exactly `FB` plus eight bytes.
    pub fn get_f64(&mut self) -> Result<f64> {
        self.expect_initial(0xFB, "f64 (initial byte 0xfb)")?;
        Ok(f64::from_bits(be_uint(self.take_slice(8)?)))
    }

    /// `string`: a definite-length major-3 item, borrowed from the buffer.
    pub fn get_str(&mut self) -> Result<&'b str> {
        let initial = self.take_byte()?;
        if initial >> 5 != 3 {
            return Err(WireError::InitialByte {
                expected: "text string (major type 3)",
                found: initial,
            });
        }
        let len = self.definite_len(initial)?;
        let bytes = self.take_slice(len)?;
        std::str::from_utf8(bytes).map_err(|_| WireError::InvalidUtf8)
    }

    /// `[]u8`: a definite-length major-2 item, borrowed from the buffer.
    pub fn get_bytes(&mut self) -> Result<&'b [u8]> {
        let initial = self.take_byte()?;
        if initial >> 5 != 2 {
            return Err(WireError::InitialByte {
                expected: "byte string (major type 2)",
                found: initial,
            });
        }
        let len = self.definite_len(initial)?;
        self.take_slice(len)
    }

    // ── Compounds ───────────────────────────────────────────────────────

    /// Definite-length array header (structs and variable arrays): the
    /// element count.
    pub fn array_header(&mut self) -> Result<u64> {
        let initial = self.take_byte()?;
        if initial >> 5 != 4 || initial & 0x1F == 31 {
            return Err(WireError::InitialByte {
                expected: "definite-length array (major type 4)",
                found: initial,
            });
        }
        self.read_arg(initial)
    }

    /// Fixed-array header: reads the count and verifies it.
    pub fn fixed_array_header(&mut self, expected: u64) -> Result<()> {
        let found = self.array_header()?;
        if found != expected {
            return Err(WireError::LengthMismatch { expected, found });
        }
        Ok(())
    }

    /// Externally counted array opener: exactly `9F`.
    pub fn external_array_header(&mut self) -> Result<()> {
        self.expect_initial(
            INDEFINITE_ARRAY,
            "indefinite-length array (initial byte 0x9f)",
        )
    }

    /// The break closing an externally counted array. The element count
    /// came from the sibling field, so anything but `FF` here means the
    /// counts disagree.
    pub fn expect_break(&mut self) -> Result<()> {
        match self.take_byte()? {
            BREAK => Ok(()),
            found => Err(WireError::MissingBreak { found }),
        }
    }

    /// Major type of the next item, without consuming it.
    pub fn peek_major(&self) -> Result<u8> {
        Ok(self.peek_byte()? >> 5)
    }

    /// CBOR tag header (major 6): the tag number.
    pub fn get_tag(&mut self) -> Result<u64> {
        let initial = self.take_byte()?;
        if initial >> 5 != 6 {
            return Err(WireError::InitialByte {
                expected: "tag (major type 6)",
                found: initial,
            });
        }
        self.read_arg(initial)
    }

    /// Union dispatch: peek the initial byte, then read either a unit tag
    /// (major 0) or a payload tag (major 6). Validating the tag number
    /// against the schema's variants is the caller's job, so unknown tags
    /// surface with their value intact.
    pub fn union_head(&mut self) -> Result<UnionHead> {
        match self.peek_byte()? >> 5 {
            6 => Ok(UnionHead::Payload(self.get_tag()?)),
            0 => Ok(UnionHead::Unit(self.get_uvarint()?)),
            _ => Err(WireError::InitialByte {
                expected: "union (major type 6 tag or major type 0 unit variant)",
                found: self.peek_byte()?,
            }),
        }
    }

    /// Optional dispatch: `?T` is `union { 0 none, 1 some: T }`. Returns
    /// whether a value follows; any other tag is unknown.
    pub fn optional_head(&mut self) -> Result<bool> {
        match self.union_head()? {
            UnionHead::Unit(0) => Ok(false),
            UnionHead::Payload(1) => Ok(true),
            UnionHead::Unit(tag) | UnionHead::Payload(tag) => {
                Err(WireError::UnknownVariant { tag })
            }
        }
    }

    // ── Skip ────────────────────────────────────────────────────────────

    /// Advance past exactly one item of any form: recursive for arrays and
    /// maps, length-aware for strings, inner-recursive for tags, and
    /// indefinite-aware (items until the break). This is what struct
    /// forward-compatibility and unknown-variant bodies build on.
    pub fn skip(&mut self) -> Result<()> {
        let initial = self.take_byte()?;
        let major = initial >> 5;
        let ai = initial & 0x1F;

        if ai == 31 {
            return match major {
                // Indefinite containers: consume items until the break.
                // Indefinite string chunks are themselves definite items.
                2..=5 => {
                    while self.peek_byte()? != BREAK {
                        self.skip()?;
                    }
                    self.pos += 1;
                    Ok(())
                }
                7 => Err(WireError::UnexpectedBreak),
                _ => Err(WireError::MalformedAdditionalInfo { byte: initial }),
            };
        }

        let arg = self.read_arg(initial)?;
        match major {
            0 | 1 | 7 => Ok(()), // argument bytes already consumed
            2 | 3 => {
                let len = usize::try_from(arg).map_err(|_| WireError::UnexpectedEnd)?;
                self.take_slice(len)?;
                Ok(())
            }
            4 => {
                for _ in 0..arg {
                    self.skip()?;
                }
                Ok(())
            }
            5 => {
                for _ in 0..arg {
                    self.skip()?;
                    self.skip()?;
                }
                Ok(())
            }
            _ => self.skip(), // 6: tag wraps one inner item
        }
    }

    fn definite_len(&mut self, initial: u8) -> Result<usize> {
        if initial & 0x1F == 31 {
            return Err(WireError::MalformedAdditionalInfo { byte: initial });
        }
        let len = self.read_arg(initial)?;
        usize::try_from(len).map_err(|_| WireError::UnexpectedEnd)
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Big-endian unsigned read of 1–8 bytes.
fn be_uint(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64)
}

/// Map an unsigned argument (and its sign) into a signed value, range-
/// checked against the declared width's magnitude limit. The same limit
/// serves both signs: `-1 - limit` is exactly the width's minimum. The
/// widest width is `i64`, so the check runs in `i64` space and callers
/// narrow with `as`.
fn narrow_signed(arg: u64, negative: bool, ty: &'static str, limit: u64) -> Result<i64> {
    if arg > limit {
        let value = if negative {
            -1 - arg as i128
        } else {
            arg as i128
        };
        return Err(WireError::OutOfRange { ty, value });
    }
    if negative {
        Ok(-1 - arg as i64)
    } else {
        Ok(arg as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_reads_validate_the_initial_byte() {
        // A minimally encoded 1 is not a valid u32.
        let mut dec = Decoder::new(&[0x01]);
        assert_eq!(
            dec.get_u32(),
            Err(WireError::InitialByte {
                expected: "u32 (initial byte 0x1a)",
                found: 0x01
            })
        );
    }

    #[test]
    fn signed_reads_accept_either_sign_byte() {
        let mut dec = Decoder::new(&[0x1A, 0, 0, 0, 7]);
        assert_eq!(dec.get_i32(), Ok(7));
        let mut dec = Decoder::new(&[0x3A, 0, 0, 0, 6]);
        assert_eq!(dec.get_i32(), Ok(-7));
    }

    #[test]
    fn signed_narrowing_is_range_checked() {
        // 200 fits the u8 argument but not i8.
        let mut dec = Decoder::new(&[0x18, 200]);
        assert_eq!(
            dec.get_i8(),
            Err(WireError::OutOfRange {
                ty: "i8",
                value: 200
            })
        );
        // -1 - 128 = -129 is below i8::MIN.
        let mut dec = Decoder::new(&[0x38, 128]);
        assert_eq!(
            dec.get_i8(),
            Err(WireError::OutOfRange {
                ty: "i8",
                value: -129
            })
        );
        // -128 itself is fine.
        let mut dec = Decoder::new(&[0x38, 127]);
        assert_eq!(dec.get_i8(), Ok(-128));
    }

    #[test]
    fn uvarint_accepts_every_argument_width() {
        let mut dec = Decoder::new(&[0x17]);
        assert_eq!(dec.get_uvarint(), Ok(23));
        let mut dec = Decoder::new(&[0x19, 0x01, 0x00]);
        assert_eq!(dec.get_uvarint(), Ok(256));
        let mut dec = Decoder::new(&[0x1B, 0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(dec.get_uvarint(), Ok(1));
    }

    #[test]
    fn reserved_additional_info_is_malformed() {
        let mut dec = Decoder::new(&[0x1C]);
        assert_eq!(
            dec.get_uvarint(),
            Err(WireError::MalformedAdditionalInfo { byte: 0x1C })
        );
    }

    #[test]
    fn truncated_argument_is_unexpected_end() {
        let mut dec = Decoder::new(&[0x1A, 0x00]);
        assert_eq!(dec.get_u32(), Err(WireError::UnexpectedEnd));
    }

    #[test]
    fn skip_handles_nested_and_indefinite_items() {
        // [1, "ab", tag(1, [2, 3])] followed by a trailing u8.
        let bytes = [
            0x83, 0x01, 0x62, b'a', b'b', 0xC1, 0x82, 0x02, 0x03, 0x18, 0x07,
        ];
        let mut dec = Decoder::new(&bytes);
        dec.skip().unwrap();
        assert_eq!(dec.get_u8(), Ok(7));

        // Indefinite array with nested definite array, then break.
        let bytes = [0x9F, 0x01, 0x82, 0x02, 0x03, 0xFF, 0x18, 0x09];
        let mut dec = Decoder::new(&bytes);
        dec.skip().unwrap();
        assert_eq!(dec.get_u8(), Ok(9));
    }

    #[test]
    fn skip_consumes_map_pairs() {
        // {1: 2} then u8 5.
        let bytes = [0xA1, 0x01, 0x02, 0x18, 0x05];
        let mut dec = Decoder::new(&bytes);
        dec.skip().unwrap();
        assert_eq!(dec.get_u8(), Ok(5));
    }

    #[test]
    fn lone_break_is_an_error() {
        let mut dec = Decoder::new(&[0xFF]);
        assert_eq!(dec.skip(), Err(WireError::UnexpectedBreak));
    }
}
