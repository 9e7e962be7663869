//! BER encoder for TCAP Information Elements
//!
//! # Usage Example
//!
//! ```rust
//! use tcap_ber::ber::{BerEncoder, Ie, Tag};
//!
//! let mut encoder = BerEncoder::new();
//! encoder.encode_tlv(Tag::private_primitive(9), &[0x01, 0x02, 0x03, 0x04]);
//! encoder.encode_ie(&Ie::new(Tag::universal_primitive(4), vec![0xAAu8]));
//! assert_eq!(encoder.len(), 9);
//! ```

use crate::ber::ie::Ie;
use crate::ber::types::{BerLength, Tag};
use bytes::{BufMut, Bytes, BytesMut};
use tcap_core::{TcapError, TcapResult};

/// BER encoder for sequences of TLV elements
///
/// Each encoded value is appended as a TLV (Tag-Length-Value) triplet,
/// so the accumulated bytes are the value of a constructed element or a
/// top-level sequence of elements.
///
/// # Memory Management
///
/// The encoder accumulates into a `BytesMut`. `into_bytes()` freezes it
/// without copying.
pub struct BerEncoder {
    buffer: BytesMut,
}

impl BerEncoder {
    /// Create a new BER encoder
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
        }
    }

    /// Create a new BER encoder with initial capacity
    ///
    /// # Arguments
    /// * `capacity` - Initial buffer capacity in bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Encode a TLV (Tag-Length-Value) triplet
    ///
    /// # Arguments
    /// * `tag` - Element tag
    /// * `value` - Value bytes (already encoded)
    pub fn encode_tlv(&mut self, tag: Tag, value: &[u8]) {
        let length = BerLength::new(value.len());
        self.buffer.reserve(1 + length.encoded_len() + value.len());
        self.buffer.put_u8(tag.as_u8());
        length.encode_into(&mut self.buffer);
        self.buffer.put_slice(value);
    }

    /// Encode an Information Element
    ///
    /// The element's value already holds the encoding of its children, so
    /// this is a single TLV write.
    pub fn encode_ie(&mut self, ie: &Ie) {
        self.encode_tlv(ie.tag(), ie.value());
    }

    /// Number of bytes encoded so far
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get the encoded bytes
    pub fn into_bytes(self) -> Bytes {
        self.buffer.freeze()
    }

    /// Get a reference to the encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Clear the encoder buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for BerEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Ie {
    /// Serial length of the element: tag, length header and value
    ///
    /// Computed from the length alone, without encoding.
    pub fn marshal_len(&self) -> usize {
        1 + BerLength::new(self.length()).encoded_len() + self.length()
    }

    /// Put the encoded element at the start of `b`
    ///
    /// # Returns
    /// The number of bytes written, always [`Ie::marshal_len`].
    ///
    /// # Error Handling
    /// Returns `BufferTooSmall` if `b` cannot hold the whole element; `b`
    /// is left untouched in that case.
    pub fn marshal_to(&self, b: &mut [u8]) -> TcapResult<usize> {
        let needed = self.marshal_len();
        if b.len() < needed {
            return Err(TcapError::too_small(needed, b.len()));
        }

        let mut dst = &mut b[..needed];
        dst.put_u8(self.tag().as_u8());
        BerLength::new(self.length()).encode_into(&mut dst);
        dst.put_slice(self.value());
        Ok(needed)
    }

    /// Encode the element into a newly allocated buffer
    pub fn marshal(&self) -> Bytes {
        let mut encoder = BerEncoder::with_capacity(self.marshal_len());
        encoder.encode_ie(self);
        encoder.into_bytes()
    }

    /// Append the encoded element to `dst`
    pub fn encode_into(&self, dst: &mut BytesMut) {
        dst.reserve(self.marshal_len());
        dst.put_u8(self.tag().as_u8());
        BerLength::new(self.length()).encode_into(dst);
        dst.put_slice(self.value());
    }
}
