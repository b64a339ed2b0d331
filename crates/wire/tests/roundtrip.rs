//! Wire-contract tests.
//!
//! Each scenario hard-codes its expected bytes so the encoding side is
//! pinned exactly, then decodes them back to close the roundtrip. The
//! compositions mirror what generated codecs do: structs as rank-indexed
//! arrays with null gaps, unions through the tag namespace, optionals as
//! the two-variant union, and externally counted arrays as indefinite
//! items.

use cboragen_wire::{Decoder, Encoder, UnionHead, WireError};

// ── Scenario 1: scalar roundtrip ────────────────────────────────────────

#[test]
fn u32_scalar_roundtrip() {
    let mut enc = Encoder::new();
    enc.put_u32(1);
    let bytes = enc.into_bytes();
    assert_eq!(bytes, [0x1A, 0x00, 0x00, 0x00, 0x01]);

    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.get_u32(), Ok(1));
    assert!(dec.is_empty());
}

// ── Scenario 2: struct with gap and trailing omission ───────────────────

// S = struct { 0 x: u32, 2 y: bool }

fn encode_s(x: Option<u32>, y: Option<bool>) -> Vec<u8> {
    let mut enc = Encoder::new();
    // Array length is max written rank + 1; gaps below it are null.
    match (x, y) {
        (Some(x), Some(y)) => {
            enc.put_array_header(3);
            enc.put_u32(x);
            enc.put_null();
            enc.put_bool(y);
        }
        (Some(x), None) => {
            enc.put_array_header(1);
            enc.put_u32(x);
        }
        (None, Some(y)) => {
            enc.put_array_header(3);
            enc.put_null();
            enc.put_null();
            enc.put_bool(y);
        }
        (None, None) => enc.put_array_header(0),
    }
    enc.into_bytes()
}

fn decode_s(bytes: &[u8]) -> Result<(Option<u32>, Option<bool>), WireError> {
    let mut dec = Decoder::new(bytes);
    let len = dec.array_header()?;
    let mut x = None;
    let mut y = None;
    for rank in 0..len {
        match rank {
            0 => {
                // x is not optional: null here would be a decode error.
                x = Some(dec.get_u32()?);
            }
            2 => {
                y = Some(dec.get_bool()?);
            }
            _ => dec.skip()?, // unknown or gapped rank
        }
    }
    Ok((x, y))
}

#[test]
fn struct_with_gap_encodes_null_at_the_gap() {
    let bytes = encode_s(Some(1), Some(true));
    assert_eq!(bytes, [0x83, 0x1A, 0x00, 0x00, 0x00, 0x01, 0xF6, 0xF5]);
    assert_eq!(decode_s(&bytes), Ok((Some(1), Some(true))));
}

#[test]
fn struct_trailing_absent_fields_are_omitted() {
    let bytes = encode_s(Some(1), None);
    assert_eq!(bytes, [0x81, 0x1A, 0x00, 0x00, 0x00, 0x01]);
    assert_eq!(decode_s(&bytes), Ok((Some(1), None)));
}

#[test]
fn struct_decoder_skips_ranks_it_does_not_know() {
    // A "newer" encoder wrote rank 1 (a string) that S never declared.
    let mut enc = Encoder::new();
    enc.put_array_header(3);
    enc.put_u32(9);
    enc.put_str("future");
    enc.put_bool(false);
    let bytes = enc.into_bytes();
    assert_eq!(decode_s(&bytes), Ok((Some(9), Some(false))));
}

#[test]
fn struct_decoder_tolerates_extra_trailing_ranks() {
    // A newer schema appended rank 3; this decoder skips it.
    let mut enc = Encoder::new();
    enc.put_array_header(4);
    enc.put_u32(2);
    enc.put_null();
    enc.put_bool(true);
    enc.put_str("new field");
    let bytes = enc.into_bytes();
    assert_eq!(decode_s(&bytes), Ok((Some(2), Some(true))));
}

#[test]
fn null_at_non_optional_rank_is_an_error() {
    let bytes = [0x83, 0xF6, 0xF6, 0xF5];
    let err = decode_s(&bytes).unwrap_err();
    assert!(matches!(err, WireError::InitialByte { found: 0xF6, .. }));
}

#[test]
fn null_at_optional_rank_decodes_as_absent() {
    // T = struct { 0 a: ?u8, 1 b: bool }: a absent but below max rank.
    let mut enc = Encoder::new();
    enc.put_array_header(2);
    enc.put_null();
    enc.put_bool(true);
    let bytes = enc.into_bytes();

    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.array_header(), Ok(2));
    let a = if dec.is_null() {
        dec.get_null().unwrap();
        None
    } else {
        assert!(dec.optional_head().unwrap());
        Some(dec.get_u8().unwrap())
    };
    assert_eq!(a, None);
    assert_eq!(dec.get_bool(), Ok(true));
}

// ── Scenario 3: optional string ─────────────────────────────────────────

#[test]
fn optional_none_is_one_zero_byte() {
    let mut enc = Encoder::new();
    enc.put_unit_variant(0);
    let bytes = enc.into_bytes();
    assert_eq!(bytes, [0x00]);

    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.optional_head(), Ok(false));
    assert!(dec.is_empty());
}

#[test]
fn optional_some_string_roundtrips() {
    let mut enc = Encoder::new();
    enc.put_tag(1);
    enc.put_str("hi");
    let bytes = enc.into_bytes();
    assert_eq!(bytes, [0xC1, 0x62, 0x68, 0x69]);

    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.optional_head(), Ok(true));
    assert_eq!(dec.get_str(), Ok("hi"));
    assert!(dec.is_empty());
}

#[test]
fn nested_optionals_stack_their_tags() {
    // some(none) -> C1 00; some(some("x")) -> C1 C1 61 78.
    let mut enc = Encoder::new();
    enc.put_tag(1);
    enc.put_unit_variant(0);
    assert_eq!(enc.as_bytes(), [0xC1, 0x00]);

    let mut enc = Encoder::new();
    enc.put_tag(1);
    enc.put_tag(1);
    enc.put_str("x");
    let bytes = enc.into_bytes();
    assert_eq!(bytes, [0xC1, 0xC1, 0x61, 0x78]);

    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.optional_head(), Ok(true));
    assert_eq!(dec.optional_head(), Ok(true));
    assert_eq!(dec.get_str(), Ok("x"));
}

// ── Scenario 4: union variants ──────────────────────────────────────────

// R = union { 0 none, 1 ok: string, 2 err: u32 }

#[test]
fn union_unit_variant_is_a_uvarint() {
    let mut enc = Encoder::new();
    enc.put_unit_variant(0);
    let bytes = enc.into_bytes();
    assert_eq!(bytes, [0x00]);

    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.union_head(), Ok(UnionHead::Unit(0)));
}

#[test]
fn union_payload_variants_wrap_with_their_tag() {
    let mut enc = Encoder::new();
    enc.put_tag(1);
    enc.put_str("hi");
    assert_eq!(enc.as_bytes(), [0xC1, 0x62, 0x68, 0x69]);

    let mut enc = Encoder::new();
    enc.put_tag(2);
    enc.put_u32(42);
    let bytes = enc.into_bytes();
    assert_eq!(bytes, [0xC2, 0x1A, 0x00, 0x00, 0x00, 0x2A]);

    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.union_head(), Ok(UnionHead::Payload(2)));
    assert_eq!(dec.get_u32(), Ok(42));
}

#[test]
fn unknown_union_tag_surfaces_with_its_value() {
    // Tag 7 is not declared by R; the dispatch still reports it and the
    // caller can skip the payload to stay in sync.
    let mut enc = Encoder::new();
    enc.put_tag(7);
    enc.put_str("future");
    let bytes = enc.into_bytes();

    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.union_head(), Ok(UnionHead::Payload(7)));
    dec.skip().unwrap();
    assert!(dec.is_empty());
}

#[test]
fn unknown_enum_value_surfaces_as_the_integer() {
    // Enums are bare uvarints; mapping tags to variants is the caller's
    // job, so an undeclared value decodes as itself.
    let mut enc = Encoder::new();
    enc.put_uvarint(9);
    let bytes = enc.into_bytes();
    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.get_uvarint(), Ok(9));
}

// ── Scenario 5: external-length array ───────────────────────────────────

// T = struct { 0 count: u8, 1 items: [.count]u32 }

#[test]
fn external_length_array_roundtrips() {
    let mut enc = Encoder::new();
    enc.put_array_header(2);
    enc.put_u8(2);
    enc.put_indefinite_array();
    enc.put_u32(1);
    enc.put_u32(2);
    enc.put_break();
    let bytes = enc.into_bytes();
    assert_eq!(
        bytes,
        [0x82, 0x18, 0x02, 0x9F, 0x1A, 0x00, 0x00, 0x00, 0x01, 0x1A, 0x00, 0x00, 0x00, 0x02, 0xFF]
    );

    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.array_header(), Ok(2));
    let count = dec.get_u8().unwrap();
    dec.external_array_header().unwrap();
    let mut items = Vec::new();
    for _ in 0..count {
        items.push(dec.get_u32().unwrap());
    }
    dec.expect_break().unwrap();
    assert!(dec.is_empty());
    assert_eq!(items, [1, 2]);
}

#[test]
fn external_count_disagreement_is_a_missing_break() {
    // The sibling count says 1, but two elements were written: after one
    // element the decoder expects the break and finds an item instead.
    let bytes = [
        0x82, 0x18, 0x01, 0x9F, 0x1A, 0x00, 0x00, 0x00, 0x01, 0x1A, 0x00, 0x00, 0x00, 0x02, 0xFF,
    ];
    let mut dec = Decoder::new(&bytes);
    dec.array_header().unwrap();
    let count = dec.get_u8().unwrap();
    dec.external_array_header().unwrap();
    for _ in 0..count {
        dec.get_u32().unwrap();
    }
    assert_eq!(dec.expect_break(), Err(WireError::MissingBreak { found: 0x1A }));
}

// ── Scenario 6: []u8 byte-string special case ───────────────────────────

#[test]
fn byte_arrays_are_byte_strings_not_arrays() {
    let mut enc = Encoder::new();
    enc.put_bytes(&[0xDE, 0xAD]);
    let bytes = enc.into_bytes();
    assert_eq!(bytes, [0x42, 0xDE, 0xAD]);

    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.get_bytes(), Ok(&[0xDE, 0xAD][..]));
    assert!(dec.is_empty());
}

// ── Fixed arrays ────────────────────────────────────────────────────────

#[test]
fn fixed_array_length_is_verified() {
    let mut enc = Encoder::new();
    enc.put_array_header(2);
    enc.put_u8(1);
    enc.put_u8(2);
    let bytes = enc.into_bytes();

    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.fixed_array_header(2), Ok(()));

    let mut dec = Decoder::new(&bytes);
    assert_eq!(
        dec.fixed_array_header(3),
        Err(WireError::LengthMismatch {
            expected: 3,
            found: 2
        })
    );
}

// ── Wire-size invariants ────────────────────────────────────────────────

#[test]
fn fixed_width_sizes_are_value_independent() {
    for v in [0u64, 1, 23, 24, 255, 65536, u64::MAX] {
        let mut enc = Encoder::new();
        enc.put_u64(v);
        assert_eq!(enc.len(), 9, "u64 {v}");
    }
    for v in [0u16, 255, 65535] {
        let mut enc = Encoder::new();
        enc.put_u16(v);
        assert_eq!(enc.len(), 3, "u16 {v}");
    }
    for v in [i32::MIN, -1, 0, 1, i32::MAX] {
        let mut enc = Encoder::new();
        enc.put_i32(v);
        assert_eq!(enc.len(), 5, "i32 {v}");
    }
    for v in [f64::MIN, 0.0, 1.5, f64::MAX] {
        let mut enc = Encoder::new();
        enc.put_f64(v);
        assert_eq!(enc.len(), 9, "f64 {v}");
    }
}

#[test]
fn variable_width_sizes_are_header_plus_payload() {
    // 23-byte payload: 1-byte header; 24 bytes: 2-byte header.
    let small = vec![0u8; 23];
    let mut enc = Encoder::new();
    enc.put_bytes(&small);
    assert_eq!(enc.len(), 1 + 23);

    let big = vec![0u8; 24];
    let mut enc = Encoder::new();
    enc.put_bytes(&big);
    assert_eq!(enc.len(), 2 + 24);

    let wide = vec![0u8; 256];
    let mut enc = Encoder::new();
    enc.put_bytes(&wide);
    assert_eq!(enc.len(), 3 + 256);
}

// ── Signed and float scalars ────────────────────────────────────────────

#[test]
fn signed_scalars_roundtrip_at_their_extremes() {
    for v in [i64::MIN, -1, 0, 1, i64::MAX] {
        let mut enc = Encoder::new();
        enc.put_i64(v);
        let bytes = enc.into_bytes();
        assert_eq!(bytes.len(), 9);
        let mut dec = Decoder::new(&bytes);
        assert_eq!(dec.get_i64(), Ok(v), "i64 {v}");
    }
    for v in [i8::MIN, -1, 0, i8::MAX] {
        let mut enc = Encoder::new();
        enc.put_i8(v);
        let bytes = enc.into_bytes();
        let mut dec = Decoder::new(&bytes);
        assert_eq!(dec.get_i8(), Ok(v), "i8 {v}");
    }
}

#[test]
fn ivarint_roundtrips_minimally() {
    let cases: [(i64, usize); 5] = [(0, 1), (-1, 1), (23, 1), (-25, 2), (-4000, 3)];
    for (v, size) in cases {
        let mut enc = Encoder::new();
        enc.put_ivarint(v);
        let bytes = enc.into_bytes();
        assert_eq!(bytes.len(), size, "ivarint {v}");
        let mut dec = Decoder::new(&bytes);
        assert_eq!(dec.get_ivarint(), Ok(v));
    }
}

#[test]
fn floats_roundtrip_through_their_declared_width() {
    let mut enc = Encoder::new();
    enc.put_f16(1.5);
    let bytes = enc.into_bytes();
    assert_eq!(bytes, [0xF9, 0x3E, 0x00]);
    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.get_f16(), Ok(1.5));

    let mut enc = Encoder::new();
    enc.put_f32(1.5);
    let bytes = enc.into_bytes();
    assert_eq!(bytes.len(), 5);
    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.get_f32(), Ok(1.5));

    let mut enc = Encoder::new();
    enc.put_f64(-2.25);
    let bytes = enc.into_bytes();
    let mut dec = Decoder::new(&bytes);
    assert_eq!(dec.get_f64(), Ok(-2.25));
}

// ── Determinism and re-encode ───────────────────────────────────────────

#[test]
fn encoding_is_deterministic() {
    let build = || {
        let mut enc = Encoder::new();
        enc.put_array_header(3);
        enc.put_u32(77);
        enc.put_str("abc");
        enc.put_ivarint(-12);
        enc.into_bytes()
    };
    assert_eq!(build(), build());
}

#[test]
fn decode_then_encode_reproduces_the_bytes() {
    // encode(decode(b)) = b for a struct of scalars.
    let mut enc = Encoder::new();
    enc.put_array_header(2);
    enc.put_u16(300);
    enc.put_str("wire");
    let original = enc.into_bytes();

    let mut dec = Decoder::new(&original);
    assert_eq!(dec.array_header(), Ok(2));
    let a = dec.get_u16().unwrap();
    let s = dec.get_str().unwrap();

    let mut enc = Encoder::new();
    enc.put_array_header(2);
    enc.put_u16(a);
    enc.put_str(s);
    assert_eq!(enc.into_bytes(), original);
}

// ── Decode errors ───────────────────────────────────────────────────────

#[test]
fn initial_byte_errors_name_expected_and_found() {
    let mut dec = Decoder::new(&[0x19, 0x00, 0x01]);
    let err = dec.get_u32().unwrap_err();
    let WireError::InitialByte { expected, found } = err else {
        panic!("expected InitialByte, got {err:?}");
    };
    assert!(expected.contains("u32"));
    assert!(expected.contains("0x1a"));
    assert_eq!(found, 0x19);
}

#[test]
fn truncated_input_fails_fast() {
    let mut dec = Decoder::new(&[0x62, b'h']);
    assert_eq!(dec.get_str(), Err(WireError::UnexpectedEnd));

    let mut dec = Decoder::new(&[]);
    assert_eq!(dec.get_bool(), Err(WireError::UnexpectedEnd));
}

#[test]
fn invalid_utf8_in_text_is_rejected() {
    let mut dec = Decoder::new(&[0x61, 0xFF]);
    assert_eq!(dec.get_str(), Err(WireError::InvalidUtf8));
}

#[test]
fn definite_array_reader_rejects_the_indefinite_marker() {
    let mut dec = Decoder::new(&[0x9F, 0xFF]);
    assert!(matches!(
        dec.array_header(),
        Err(WireError::InitialByte { found: 0x9F, .. })
    ));
}
