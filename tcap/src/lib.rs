//! tcap - Rust implementation of the TCAP Information Element codec
//!
//! This library parses and encodes the BER Tag-Length-Value Information
//! Elements that carry TCAP messages.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `tcap-core`: Error handling
//! - `tcap-ber`: Tag and length codec, Information Elements, encoder and decoders
//!
//! # Usage
//!
//! ```rust
//! use tcap::{parse_ber, Ie, Tag};
//!
//! let invoke_id = Ie::new(Tag::universal_primitive(2), vec![0x01u8]);
//! let invoke = Ie::with_children(Tag::context_specific_constructed(1), vec![invoke_id]);
//! let bytes = invoke.marshal();
//! assert_eq!(&bytes[..], &[0xA1, 0x03, 0x02, 0x01, 0x01]);
//!
//! let parsed = parse_ber(&bytes)?;
//! assert_eq!(parsed[0], invoke);
//! # Ok::<(), tcap::TcapError>(())
//! ```

pub use tcap_core::{TcapError, TcapResult};

pub mod ber {
    pub use tcap_ber::ber::*;
}

pub use tcap_ber::{
    parse_ber, parse_ber_bytes, parse_ber_with, parse_multi, parse_multi_bytes, BerDecoder,
    BerEncoder, BerLength, Ie, ParseConfig, Tag, TagClass, TagForm,
};
