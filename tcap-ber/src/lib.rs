//! BER Information Element codec for TCAP
//!
//! This crate converts between byte buffers and trees of Tag-Length-Value
//! Information Elements as used by the Transaction Capabilities
//! Application Part. Tag values and element meaning are left to the
//! caller.
//!
//! # Modules
//!
//! - `ber` - tags, lengths, elements, encoder and decoders

pub mod ber;


pub use ber::{
    parse_ber, parse_ber_bytes, parse_ber_with, parse_multi, parse_multi_bytes, BerDecoder,
    BerEncoder, BerLength, Ie, ParseConfig, Tag, TagClass, TagForm,
};
pub use tcap_core::{TcapError, TcapResult};
