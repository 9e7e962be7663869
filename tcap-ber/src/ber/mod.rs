//! BER (Basic Encoding Rules) codec for TCAP Information Elements
//!
//! # ASN.1 BER Encoding Overview
//!
//! Each Information Element (IE) is encoded as a TLV (Tag-Length-Value)
//! triplet:
//!
//! ```text
//! [Tag] [Length] [Value]
//! ```
//!
//! ## Tag Encoding
//!
//! The tag is a single byte:
//! - **Class** (2 bits): Universal (00), Application (01), Context-specific (10), Private (11)
//! - **Form** (1 bit): 0 = Primitive, 1 = Constructed
//! - **Code** (5 bits): 0-31
//!
//! ## Length Encoding
//!
//! - **Short form** (1 byte): For lengths 0-127
//! - **Long form** (2-5 bytes): `0x80 | n` followed by `n` big-endian length bytes
//!
//! The indefinite form (`0x80` alone) is not supported.
//!
//! ## Value Encoding
//!
//! - **Primitive elements**: the literal content
//! - **Constructed elements**: the concatenation of the nested elements' TLVs
//!
//! # Implementation Notes
//!
//! 1. **Zero-copy parsing**: parsed values are `bytes::Bytes` views into the
//!    input buffer. The `&[u8]` entry points copy the input once.
//! 2. **Two parse policies**: the flat parser is strict and the recursive
//!    parser is lenient for nested elements, see [`decoder`].
//! 3. **Minimal lengths**: the encoder always writes the shortest length
//!    header; the decoder also accepts non-minimal long forms.

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod ie;
pub mod types;

pub use config::ParseConfig;
pub use decoder::{
    parse_ber, parse_ber_bytes, parse_ber_with, parse_multi, parse_multi_bytes, BerDecoder,
};
pub use encoder::BerEncoder;
pub use ie::Ie;
pub use types::{decode_element_length, BerLength, Tag, TagClass, TagForm};
