//! Reference runtime for the cboragen wire format.
//!
//! The wire format is a constrained profile of RFC 8949 CBOR. This crate is
//! the normative statement of that profile: generated encoders and decoders
//! in any target language must produce and accept exactly the byte
//! sequences this crate does. Any change here is a breaking change to data
//! at rest on every wire.
//!
//! # The profile
//!
//! A CBOR initial byte is `(major << 5) | additional_info`. Additional info
//! (AI) 0–23 carries the argument directly; AI 24/25/26/27 mean the
//! argument follows in 1/2/4/8 big-endian bytes; AI 31 marks
//! indefinite-length items and the break symbol `0xFF`. For major type 7,
//! AI 25/26/27 select half/single/double precision floats.
//!
//! ## Scalars
//!
//! Every fixed-width scalar uses its declared width on the wire, never a
//! shorter CBOR form:
//!
//! | Schema type | Major | AI | Total wire size |
//! |-------------|-------|----|-----------------|
//! | `bool`      | 7     | —  | 1 (`F4` false, `F5` true) |
//! | `u8`        | 0     | 24 | 2 |
//! | `u16`       | 0     | 25 | 3 |
//! | `u32`       | 0     | 26 | 5 |
//! | `u64`       | 0     | 27 | 9 |
//! | `iN >= 0`   | 0     | width of N | as `uN` |
//! | `iN < 0`    | 1     | width of N, argument `-1 - v` | as `uN` |
//! | `uvarint`   | 0     | minimal | 1–9 |
//! | `ivarint`   | 0 / 1 | minimal over `v` / `-1 - v` | 1–9 |
//! | `f16`       | 7     | 25 | 3 |
//! | `f32`       | 7     | 26 | 5 |
//! | `f64`       | 7     | 27 | 9 |
//! | `string`    | 3     | minimal over byte length | 1–9 + n |
//! | `[]u8`      | 2     | minimal over byte length | 1–9 + n |
//!
//! Floats never downcast: an `f32` is always written with AI 26 even when
//! the value is representable in half precision.
//!
//! ## Compounds
//!
//! - **struct** — a definite-length array (major 4). The array length is
//!   the maximum field rank actually written plus one; absent fields at
//!   ranks below that encode as null (`F6`); trailing absent fields are
//!   omitted. Fields are emitted in ascending rank order. Decoders skip
//!   one item for every rank they do not know (forward compatibility),
//!   treat missing trailing ranks as absent, and reject null at a
//!   non-optional rank.
//! - **enum** — a `uvarint` of the variant tag. Unknown tags surface to
//!   the caller with the integer value preserved.
//! - **union** — a payload-carrying variant encodes as a CBOR tag item
//!   (major 6) whose tag number is the variant tag, wrapping the payload;
//!   a unit variant encodes as a `uvarint` of the tag. Decoders peek the
//!   initial byte (major 6 vs major 0) to dispatch, then surface unknown
//!   tag numbers.
//! - **optional `?T`** — sugar for `union { 0 none, 1 some: T }`:
//!   `none` is the single byte `00`, `some(v)` is `C1` followed by the
//!   encoding of `v`. Nesting composes: `some(none)` is `C1 00`.
//! - **variable array `[]T`** — a definite-length array with a minimal
//!   header, except `[]u8`, which is a byte string (major 2).
//! - **fixed array `[N]T`** — a definite-length array of exactly `N`;
//!   decoders verify the length.
//! - **external-length array `[.field]T`** — an indefinite-length array
//!   (`9F` … `FF`). The decode count comes from the previously decoded
//!   sibling field; the decoder reads that many elements and asserts the
//!   break.
//!
//! ## Tag namespace
//!
//! The only major-6 tag numbers this format ever emits are union variant
//! tags drawn from the schema (including optional's variant 1). This is a
//! deliberate departure from generic CBOR: no IANA semantic tags (dates,
//! bignums, …) are produced, and decoders need not recognize them.
//!
//! ## Decoding discipline
//!
//! Because the decoder knows the schema type, it validates rather than
//! dispatches: a fixed-width scalar read checks the initial byte against
//! one expected constant (signed widths: one of two), and variable-length
//! reads check the major type then branch on AI for the argument size.
//! [`Decoder::skip`] advances past exactly one item of any form and is
//! what struct forward-compatibility and unknown-variant handling build
//! on.

#![warn(missing_docs)]

/// Decoding: validating reads over a borrowed byte buffer.
pub mod decode;
/// Encoding: appending writes onto a growable byte buffer.
pub mod encode;
/// The wire error type.
pub mod error;

pub use decode::{Decoder, UnionHead};
pub use encode::Encoder;
pub use error::{Result, WireError};
